//! Loads carried by members.
//!
//! Positions are measured along the member from its start node. Magnitudes act
//! along the member's negative local transverse axis, so a positive load points
//! downward on a beam drawn from left to right.

use serde::{Deserialize, Serialize};

use crate::errors::LoadError;

/// Slack allowed when checking that a load lies on its member.
const EXTENT_TOLERANCE: f64 = 1.0e-9;

/// Concentrated force at a single position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointLoad {
    /// Distance from the member start.
    pub position: f64,
    /// Force magnitude.
    pub magnitude: f64,
}

impl PointLoad {
    /// Create a point load.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::NonFinite`] for NaN or infinite input.
    pub fn new(position: f64, magnitude: f64) -> Result<Self, LoadError> {
        let load = Self {
            position,
            magnitude,
        };
        load.validate()?;
        Ok(load)
    }

    fn validate(&self) -> Result<(), LoadError> {
        if self.position.is_finite() && self.magnitude.is_finite() {
            Ok(())
        } else {
            Err(LoadError::NonFinite)
        }
    }

    /// A point load is its own resultant.
    #[must_use]
    pub fn resultant(&self) -> Self {
        *self
    }
}

/// Constant intensity over `[start, start + span]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UniformLoad {
    /// Distance from the member start to the loaded region.
    pub start: f64,
    /// Loaded length.
    pub span: f64,
    /// Force per unit length.
    pub magnitude: f64,
}

impl UniformLoad {
    /// Create a uniform load.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::NonPositiveSpan`] when `span` is not positive.
    pub fn new(start: f64, span: f64, magnitude: f64) -> Result<Self, LoadError> {
        let load = Self {
            start,
            span,
            magnitude,
        };
        load.validate()?;
        Ok(load)
    }

    fn validate(&self) -> Result<(), LoadError> {
        if !(self.start.is_finite() && self.span.is_finite() && self.magnitude.is_finite()) {
            return Err(LoadError::NonFinite);
        }
        if self.span <= 0.0 {
            return Err(LoadError::NonPositiveSpan { span: self.span });
        }
        Ok(())
    }

    /// Equivalent concentrated load acting at the centre of the loaded length.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the load extents are invalid.
    pub fn resultant(&self) -> Result<PointLoad, LoadError> {
        self.validate()?;
        Ok(PointLoad {
            position: self.start + self.span / 2.0,
            magnitude: self.magnitude * self.span,
        })
    }

    fn density(&self) -> LinearDensity {
        LinearDensity {
            from: self.start,
            to: self.start + self.span,
            intercept: self.magnitude,
            slope: 0.0,
        }
    }
}

/// Linearly varying intensity between two ordinates.
///
/// The ordinates may be given in either order along the member; a zero
/// `low_magnitude` gives a triangular load.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrapezoidalLoad {
    /// Intensity at the high ordinate.
    pub high_magnitude: f64,
    /// Position of the high ordinate.
    pub high_position: f64,
    /// Intensity at the low ordinate.
    pub low_magnitude: f64,
    /// Position of the low ordinate.
    pub low_position: f64,
}

impl TrapezoidalLoad {
    /// Create a trapezoidal load.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::DegenerateTrapezoid`] when both ordinates share a position.
    pub fn new(
        high_magnitude: f64,
        high_position: f64,
        low_magnitude: f64,
        low_position: f64,
    ) -> Result<Self, LoadError> {
        let load = Self {
            high_magnitude,
            high_position,
            low_magnitude,
            low_position,
        };
        load.validate()?;
        Ok(load)
    }

    fn validate(&self) -> Result<(), LoadError> {
        let values = [
            self.high_magnitude,
            self.high_position,
            self.low_magnitude,
            self.low_position,
        ];
        if values.iter().any(|value| !value.is_finite()) {
            return Err(LoadError::NonFinite);
        }
        let scale = self.high_position.abs().max(self.low_position.abs()).max(1.0);
        if (self.high_position - self.low_position).abs() <= EXTENT_TOLERANCE * scale {
            return Err(LoadError::DegenerateTrapezoid {
                position: self.high_position,
            });
        }
        Ok(())
    }

    /// Equivalent concentrated load acting at the centroid of the load diagram.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::DegenerateTrapezoid`] when both ordinates share a position.
    pub fn resultant(&self) -> Result<PointLoad, LoadError> {
        self.validate()?;
        Ok(self.density().resultant())
    }

    /// Split into a uniform block at the low intensity and a triangle rising
    /// towards the high ordinate.
    fn split(&self) -> (LinearDensity, LinearDensity) {
        let (from, to) = self.extent();
        let block = LinearDensity {
            from,
            to,
            intercept: self.low_magnitude,
            slope: 0.0,
        };
        let slope =
            (self.high_magnitude - self.low_magnitude) / (self.high_position - self.low_position);
        let triangle = LinearDensity {
            from,
            to,
            intercept: -slope * self.low_position,
            slope,
        };
        (block, triangle)
    }

    fn density(&self) -> LinearDensity {
        let (block, triangle) = self.split();
        LinearDensity {
            intercept: block.intercept + triangle.intercept,
            ..triangle
        }
    }

    fn extent(&self) -> (f64, f64) {
        (
            self.high_position.min(self.low_position),
            self.high_position.max(self.low_position),
        )
    }
}

/// Any load a member can carry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Load {
    /// Concentrated force.
    Point(PointLoad),
    /// Constant intensity over part of the member.
    Uniform(UniformLoad),
    /// Linearly varying intensity over part of the member.
    Trapezoidal(TrapezoidalLoad),
}

impl Load {
    /// Create a point load.
    ///
    /// # Errors
    ///
    /// See [`PointLoad::new`].
    pub fn point(position: f64, magnitude: f64) -> Result<Self, LoadError> {
        PointLoad::new(position, magnitude).map(Self::Point)
    }

    /// Create a uniform load.
    ///
    /// # Errors
    ///
    /// See [`UniformLoad::new`].
    pub fn uniform(start: f64, span: f64, magnitude: f64) -> Result<Self, LoadError> {
        UniformLoad::new(start, span, magnitude).map(Self::Uniform)
    }

    /// Create a trapezoidal load.
    ///
    /// # Errors
    ///
    /// See [`TrapezoidalLoad::new`].
    pub fn trapezoidal(
        high_magnitude: f64,
        high_position: f64,
        low_magnitude: f64,
        low_position: f64,
    ) -> Result<Self, LoadError> {
        TrapezoidalLoad::new(high_magnitude, high_position, low_magnitude, low_position)
            .map(Self::Trapezoidal)
    }

    /// Equivalent concentrated load (total magnitude acting at the centroid).
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the load extents are invalid.
    ///
    /// # Examples
    /// ```
    /// use framex::Load;
    ///
    /// let triangle = Load::trapezoidal(6.0, 3.0, 0.0, 0.0).unwrap();
    /// let resultant = triangle.resultant().unwrap();
    /// assert!((resultant.magnitude - 9.0).abs() < 1.0e-12);
    /// assert!((resultant.position - 2.0).abs() < 1.0e-12);
    /// ```
    pub fn resultant(&self) -> Result<PointLoad, LoadError> {
        match self {
            Self::Point(load) => {
                load.validate()?;
                Ok(load.resultant())
            }
            Self::Uniform(load) => load.resultant(),
            Self::Trapezoidal(load) => load.resultant(),
        }
    }

    /// Check the load is well formed and lies on a member of `length`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] for malformed loads or loads beyond the member ends.
    pub fn validate_on(&self, length: f64) -> Result<(), LoadError> {
        let (from, to) = match self {
            Self::Point(load) => {
                load.validate()?;
                (load.position, load.position)
            }
            Self::Uniform(load) => {
                load.validate()?;
                (load.start, load.start + load.span)
            }
            Self::Trapezoidal(load) => {
                load.validate()?;
                load.extent()
            }
        };
        let slack = EXTENT_TOLERANCE * length.max(1.0);
        if from < -slack || to > length + slack {
            return Err(LoadError::OutsideMember { from, to, length });
        }
        Ok(())
    }

    /// Total transverse force carried by the load.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the load extents are invalid.
    pub fn total(&self) -> Result<f64, LoadError> {
        Ok(self.resultant()?.magnitude)
    }

    /// First moment of the load about a station `origin` on the member,
    /// `∫ w(x)·(x − origin) dx`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the load extents are invalid.
    pub fn moment_about(&self, origin: f64) -> Result<f64, LoadError> {
        Ok(match self.shape()? {
            LoadShape::Concentrated(load) => load.magnitude * (load.position - origin),
            LoadShape::Distributed(parts) => parts
                .iter()
                .map(|part| part.first_moment(part.from, part.to) - origin * part.total(part.from, part.to))
                .sum(),
        })
    }

    /// Decompose into concentrated or linearly distributed parts.
    pub(crate) fn shape(&self) -> Result<LoadShape, LoadError> {
        match self {
            Self::Point(load) => {
                load.validate()?;
                Ok(LoadShape::Concentrated(*load))
            }
            Self::Uniform(load) => {
                load.validate()?;
                Ok(LoadShape::Distributed(vec![load.density()]))
            }
            Self::Trapezoidal(load) => {
                load.validate()?;
                let (block, triangle) = load.split();
                Ok(LoadShape::Distributed(vec![block, triangle]))
            }
        }
    }
}

impl From<PointLoad> for Load {
    fn from(value: PointLoad) -> Self {
        Self::Point(value)
    }
}

impl From<UniformLoad> for Load {
    fn from(value: UniformLoad) -> Self {
        Self::Uniform(value)
    }
}

impl From<TrapezoidalLoad> for Load {
    fn from(value: TrapezoidalLoad) -> Self {
        Self::Trapezoidal(value)
    }
}

/// Internal decomposition of a [`Load`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum LoadShape {
    Concentrated(PointLoad),
    Distributed(Vec<LinearDensity>),
}

impl LoadShape {
    /// Force and moment arm sum of the part of the load left of `cut`.
    ///
    /// Returns `(Σ w, Σ w·(cut − x))`. A point load sitting exactly on the cut
    /// is counted only when `inclusive` is set.
    pub(crate) fn left_of(&self, cut: f64, inclusive: bool) -> (f64, f64) {
        match self {
            Self::Concentrated(load) => {
                let included = if inclusive {
                    load.position <= cut
                } else {
                    load.position < cut
                };
                if included {
                    (load.magnitude, load.magnitude * (cut - load.position))
                } else {
                    (0.0, 0.0)
                }
            }
            Self::Distributed(parts) => parts
                .iter()
                .filter(|part| cut > part.from)
                .map(|part| {
                    let to = part.to.min(cut);
                    let total = part.total(part.from, to);
                    (total, cut * total - part.first_moment(part.from, to))
                })
                .fold((0.0, 0.0), |(force, moment), (f, m)| (force + f, moment + m)),
        }
    }
}

/// Intensity `w(x) = intercept + slope·x` over `[from, to]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct LinearDensity {
    pub(crate) from: f64,
    pub(crate) to: f64,
    pub(crate) intercept: f64,
    pub(crate) slope: f64,
}

impl LinearDensity {
    /// `∫ x^n (intercept + slope·x) dx` over `[a, b]`.
    pub(crate) fn weighted(&self, n: i32, a: f64, b: f64) -> f64 {
        self.intercept * power_integral(n, a, b) + self.slope * power_integral(n + 1, a, b)
    }

    fn total(&self, a: f64, b: f64) -> f64 {
        self.weighted(0, a, b)
    }

    fn first_moment(&self, a: f64, b: f64) -> f64 {
        self.weighted(1, a, b)
    }

    fn resultant(&self) -> PointLoad {
        let magnitude = self.total(self.from, self.to);
        let position = if magnitude.abs() > f64::EPSILON * self.intercept.abs().max(1.0) {
            self.first_moment(self.from, self.to) / magnitude
        } else {
            (self.from + self.to) / 2.0
        };
        PointLoad {
            position,
            magnitude,
        }
    }
}

/// `∫ x^n dx` over `[a, b]`.
pub(crate) fn power_integral(n: i32, a: f64, b: f64) -> f64 {
    let k = n + 1;
    (b.powi(k) - a.powi(k)) / f64::from(k)
}
