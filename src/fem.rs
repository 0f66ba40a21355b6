//! Fixed-end moments.
//!
//! The moments a member would carry at its ends if both were rigidly clamped,
//! caused by that member's own loads. Both values use the global anticlockwise
//! positive convention, so a downward load on a beam drawn left to right gives
//! a positive start moment and a negative end moment.

use serde::{Deserialize, Serialize};

use crate::errors::LoadError;
use crate::loads::{LinearDensity, Load, LoadShape, PointLoad};
use crate::numeric::CompensatedSum;

/// Selects one end of a member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MemberEnd {
    /// The end at the member's start node.
    Start,
    /// The end at the member's end node.
    End,
}

impl MemberEnd {
    /// The opposite end of the same member.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Start => Self::End,
            Self::End => Self::Start,
        }
    }

    /// Local coordinate of this end on a member of `length`.
    #[must_use]
    pub fn station(self, length: f64) -> f64 {
        match self {
            Self::Start => 0.0,
            Self::End => length,
        }
    }
}

/// Fixed-end moment pair for one member.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FixedEndMoments {
    /// Moment at the start end.
    pub start: f64,
    /// Moment at the end end.
    pub end: f64,
}

impl FixedEndMoments {
    /// Value at the selected end.
    #[must_use]
    pub const fn at(&self, end: MemberEnd) -> f64 {
        match end {
            MemberEnd::Start => self.start,
            MemberEnd::End => self.end,
        }
    }
}

/// Fixed-end moment at one end of a member of `length` carrying `loads`.
///
/// # Errors
///
/// Returns [`LoadError`] when any load is malformed, for example a trapezoid
/// whose ordinates coincide.
///
/// # Examples
/// ```
/// use framex::{fixed_end_moment, Load, MemberEnd};
///
/// let loads = [Load::point(2.0, 10.0).unwrap()];
/// let start = fixed_end_moment(6.0, &loads, MemberEnd::Start).unwrap();
/// assert!((start - 10.0 * 2.0 * 16.0 / 36.0).abs() < 1.0e-12);
/// ```
pub fn fixed_end_moment(length: f64, loads: &[Load], end: MemberEnd) -> Result<f64, LoadError> {
    Ok(fixed_end_moments(length, loads)?.at(end))
}

/// Fixed-end moments at both ends of a member of `length` carrying `loads`.
///
/// # Errors
///
/// Returns [`LoadError`] when any load is malformed.
pub fn fixed_end_moments(length: f64, loads: &[Load]) -> Result<FixedEndMoments, LoadError> {
    let mut start = CompensatedSum::new();
    let mut end = CompensatedSum::new();
    for load in loads {
        match load.shape()? {
            LoadShape::Concentrated(point) => {
                let (s, e) = point_load_moments(length, &point);
                start.add(s);
                end.add(e);
            }
            LoadShape::Distributed(parts) => {
                for part in parts {
                    let (s, e) = distributed_moments(length, &part);
                    start.add(s);
                    end.add(e);
                }
            }
        }
    }
    Ok(FixedEndMoments {
        start: start.value(),
        end: end.value(),
    })
}

/// `P·a·b²/L²` and `−P·a²·b/L²`.
fn point_load_moments(length: f64, load: &PointLoad) -> (f64, f64) {
    let a = load.position;
    let b = length - a;
    let l2 = length * length;
    (
        load.magnitude * a * b * b / l2,
        -load.magnitude * a * a * b / l2,
    )
}

/// The point load formula integrated over a linearly varying intensity.
///
/// Start: `∫ w(x)·x·(L − x)² dx / L²`, end: `−∫ w(x)·x²·(L − x) dx / L²`, both
/// expanded into powers of `x` and integrated in closed form.
fn distributed_moments(length: f64, part: &LinearDensity) -> (f64, f64) {
    let (a, b) = (part.from, part.to);
    let l = length;
    let l2 = l * l;
    let start = l2 * part.weighted(1, a, b) - 2.0 * l * part.weighted(2, a, b)
        + part.weighted(3, a, b);
    let end = l * part.weighted(2, a, b) - part.weighted(3, a, b);
    (start / l2, -end / l2)
}
