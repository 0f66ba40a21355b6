//! Floating point helpers shared by the assembly and recovery stages.

/// Running sum that tracks the rounding error lost by each addition.
///
/// Uses Neumaier's variant of Kahan summation, which stays accurate when an
/// addend is larger in magnitude than the running total. Fixed-end moments and
/// collected equation coefficients are accumulated with it.
///
/// # Examples
/// ```
/// use framex::CompensatedSum;
///
/// let sum: CompensatedSum = [1.0, 1.0e100, 1.0, -1.0e100].into_iter().collect();
/// assert_eq!(sum.value(), 2.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    /// Start an empty sum.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sum: 0.0,
            compensation: 0.0,
        }
    }

    /// Add one value to the sum.
    pub fn add(&mut self, value: f64) {
        let total = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - total) + value;
        } else {
            self.compensation += (value - total) + self.sum;
        }
        self.sum = total;
    }

    /// Current value of the sum including the tracked error.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.sum + self.compensation
    }
}

impl Extend<f64> for CompensatedSum {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl FromIterator<f64> for CompensatedSum {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut sum = Self::new();
        sum.extend(iter);
        sum
    }
}

/// Sum a sequence of values with error compensation.
pub fn compensated_sum<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    values.into_iter().collect::<CompensatedSum>().value()
}

/// Relative threshold below which a collected coefficient counts as cancelled.
pub(crate) const CANCELLATION_RATIO: f64 = 1.0e-12;

/// Whether `value` is zero for practical purposes relative to `scale`.
pub(crate) fn is_negligible(value: f64, tolerance: f64, scale: f64) -> bool {
    value.abs() <= tolerance * scale.abs().max(1.0)
}
