//! Extraction confidence

use serde::{Deserialize, Serialize};

/// How sure the extraction service was about an item, in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Confidence(f64);

impl Confidence {
    /// Full confidence, used when the extraction service omits a value.
    pub const CERTAIN: Self = Self(1.0);

    /// Creates a confidence, clamping into `[0, 1]`. `NaN` is treated as zero.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }

        Self(value.clamp(0.0, 1.0))
    }

    /// Returns the raw value.
    pub fn value(self) -> f64 {
        self.0
    }

    /// Whether this confidence falls strictly below `threshold`.
    pub fn needs_review(self, threshold: ReviewThreshold) -> bool {
        self.0 < threshold.value()
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self::CERTAIN
    }
}

impl From<f64> for Confidence {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Confidence> for f64 {
    fn from(confidence: Confidence) -> Self {
        confidence.0
    }
}

/// Confidence below which an item is flagged for a manual check.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ReviewThreshold(f64);

impl ReviewThreshold {
    /// Creates a threshold, clamping into `[0, 1]`.
    pub fn new(value: f64) -> Self {
        Self(Confidence::new(value).value())
    }

    /// Returns the raw value.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for ReviewThreshold {
    fn default() -> Self {
        Self(0.75)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_values() {
        assert!((Confidence::new(1.5).value() - 1.0).abs() < f64::EPSILON);
        assert!(Confidence::new(-0.2).value().abs() < f64::EPSILON);
        assert!(Confidence::new(f64::NAN).value().abs() < f64::EPSILON);
    }

    #[test]
    fn flags_values_strictly_below_threshold() {
        let threshold = ReviewThreshold::default();

        assert!(Confidence::new(0.5).needs_review(threshold));
        assert!(!Confidence::new(0.75).needs_review(threshold));
        assert!(!Confidence::CERTAIN.needs_review(threshold));
    }

    #[test]
    fn threshold_is_configurable() {
        let strict = ReviewThreshold::new(0.95);

        assert!(Confidence::new(0.9).needs_review(strict));
    }
}
