//! Fundamental geometric types for plane frame modelling.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Position in the plane of the frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate, upward positive.
    pub y: f64,
}

impl Point {
    /// Point at `(x, y)`.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Position vector from the origin.
    #[must_use]
    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

impl From<Vector2<f64>> for Point {
    fn from(value: Vector2<f64>) -> Self {
        Self::new(value.x, value.y)
    }
}

impl From<Point> for Vector2<f64> {
    fn from(value: Point) -> Self {
        value.to_vector()
    }
}

/// Action applied at a node: two global force components and a moment.
///
/// The moment is anticlockwise positive and acts on the joint.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Force {
    /// Horizontal component, rightward positive.
    pub x: f64,
    /// Vertical component, upward positive.
    pub y: f64,
    /// Couple acting on the joint, anticlockwise positive.
    pub moment: f64,
}

impl Force {
    /// Nodal action from its components.
    #[must_use]
    pub const fn new(x: f64, y: f64, moment: f64) -> Self {
        Self { x, y, moment }
    }

    /// Translational part of the action as an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

impl Default for Force {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl std::ops::Add for Force {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.moment + rhs.moment)
    }
}

impl std::ops::AddAssign for Force {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Translation of a node in the plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Displacement {
    /// Horizontal translation.
    pub x: f64,
    /// Vertical translation; a settling support has a negative value.
    pub y: f64,
}

impl Displacement {
    /// Translation by `(x, y)`.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Translation as a vector.
    #[must_use]
    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

impl Default for Displacement {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl From<Vector2<f64>> for Displacement {
    fn from(value: Vector2<f64>) -> Self {
        Self::new(value.x, value.y)
    }
}

/// z-component of the planar cross product `a × b`.
pub(crate) fn cross(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Shorthand for [`Point::new`].
///
/// # Examples
/// ```
/// use framex::point;
///
/// let top = point(0.0, 4.0);
/// assert_eq!(top.y, 4.0);
/// ```
#[must_use]
pub const fn point(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

/// Shorthand for [`Force::new`].
///
/// # Examples
/// ```
/// use framex::force;
///
/// let load = force(5.0, -20.0, 0.0);
/// assert_eq!(load.y, -20.0);
/// ```
#[must_use]
pub const fn force(x: f64, y: f64, moment: f64) -> Force {
    Force::new(x, y, moment)
}

/// Shorthand for [`Displacement::new`].
///
/// # Examples
/// ```
/// use framex::displacement;
///
/// let delta = displacement(0.0, -0.002);
/// assert_eq!(delta.y, -0.002);
/// ```
#[must_use]
pub const fn displacement(x: f64, y: f64) -> Displacement {
    Displacement::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_convert_to_vectors() {
        let origin = Point::new(1.0, 2.0);
        let vector: Vector2<f64> = origin.into();
        assert_eq!(vector, Vector2::new(1.0, 2.0));
        assert_eq!(Point::from(vector), origin);
    }

    #[test]
    fn forces_accumulate_componentwise() {
        let mut total = Force::default();
        total += force(1.0, -2.0, 0.5);
        total += force(-0.5, -1.0, 0.25);
        assert_eq!(total, Force::new(0.5, -3.0, 0.75));
    }

    #[test]
    fn cross_product_is_anticlockwise_positive() {
        let arm = Vector2::new(2.0, 0.0);
        let upward = Vector2::new(0.0, 3.0);
        assert_eq!(cross(arm, upward), 6.0);
        assert_eq!(cross(upward, arm), -6.0);
    }
}
