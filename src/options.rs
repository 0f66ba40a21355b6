//! Analysis configuration.

use serde::{Deserialize, Serialize};

/// Options controlling a frame analysis.
///
/// # Examples
/// ```
/// use framex::AnalysisOptions;
///
/// let options = AnalysisOptions::default().with_least_squares(false);
/// assert!(!options.least_squares);
/// assert_eq!(options.tolerance, 1.0e-9);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Allow the regularised least-squares solve for non-square or singular systems.
    pub least_squares: bool,
    /// Relative ridge factor used when a least-squares system is rank deficient.
    pub ridge: f64,
    /// Threshold below which residuals and translations count as zero.
    pub tolerance: f64,
    /// Default marching step for internal force sampling.
    pub sample_step: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            least_squares: true,
            ridge: 1.0e-10,
            tolerance: 1.0e-9,
            sample_step: 0.1,
        }
    }
}

impl AnalysisOptions {
    /// Options requiring a square, non-singular system.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            least_squares: false,
            ..Self::default()
        }
    }

    /// Permit or forbid the least-squares solve.
    #[must_use]
    pub fn with_least_squares(mut self, enabled: bool) -> Self {
        self.least_squares = enabled;
        self
    }

    /// Set the ridge factor.
    #[must_use]
    pub fn with_ridge(mut self, ridge: f64) -> Self {
        self.ridge = ridge;
        self
    }

    /// Set the zero tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the sampling step.
    #[must_use]
    pub fn with_sample_step(mut self, step: f64) -> Self {
        self.sample_step = step;
        self
    }
}
