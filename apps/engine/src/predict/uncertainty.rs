//! Uncertainty gate: a pure function of the final confidence.

/// Confidences strictly below this are flagged as uncertain.
pub const UNCERTAINTY_THRESHOLD: f64 = 0.65;

pub const UNCERTAINTY_MESSAGE: &str =
    "Prediction is uncertain. Please improve your resume with more specific skills and achievements.";

/// `Some(advisory)` when the confidence falls below the threshold, `None`
/// otherwise. The threshold is exclusive on the low side: exactly 0.65 is
/// not uncertain.
pub fn advisory(confidence: f64) -> Option<&'static str> {
    (confidence < UNCERTAINTY_THRESHOLD).then_some(UNCERTAINTY_MESSAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_threshold_is_uncertain() {
        assert_eq!(advisory(0.6499), Some(UNCERTAINTY_MESSAGE));
        assert_eq!(advisory(0.0), Some(UNCERTAINTY_MESSAGE));
    }

    #[test]
    fn test_at_threshold_is_certain() {
        assert_eq!(advisory(0.65), None);
        assert_eq!(advisory(0.99), None);
    }
}
