//! Verdicts and Confidence Calibration
//!
//! The models emit one phishing probability. Calibration folds it around
//! the decision threshold so the reported confidence always refers to the
//! verdict actually returned: a 0.15 phishing probability is a Legitimate
//! verdict with 0.85 confidence, not a Phishing verdict with 0.15.

use serde::{Deserialize, Serialize};

use crate::constants::PHISHING_THRESHOLD;

// ============================================================================
// VERDICT
// ============================================================================

/// Binary classification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Phishing,
    Legitimate,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Phishing => "Phishing",
            Verdict::Legitimate => "Legitimate",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// PREDICTION
// ============================================================================

/// Final classification result for one input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub verdict: Verdict,
    /// Confidence in the verdict, in [0.5, 1.0] (1.0 for trusted domains)
    pub confidence: f64,
}

impl Prediction {
    /// The fixed result for whitelisted domains
    pub const fn trusted() -> Self {
        Self {
            verdict: Verdict::Legitimate,
            confidence: 1.0,
        }
    }
}

/// Map a raw phishing probability onto a verdict and calibrated confidence.
///
/// Probabilities at or above the threshold classify as Phishing with the
/// probability itself as confidence; below it, Legitimate with the
/// complement. Confidence is rounded to three decimals.
pub fn calibrate(probability: f32) -> Prediction {
    let p = f64::from(probability).clamp(0.0, 1.0);
    if p >= f64::from(PHISHING_THRESHOLD) {
        Prediction {
            verdict: Verdict::Phishing,
            confidence: round3(p),
        }
    } else {
        Prediction {
            verdict: Verdict::Legitimate,
            confidence: round3(1.0 - p),
        }
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_probability_is_phishing() {
        let prediction = calibrate(0.92);
        assert_eq!(prediction.verdict, Verdict::Phishing);
        assert_eq!(prediction.confidence, 0.92);
    }

    #[test]
    fn test_low_probability_is_legitimate_with_complement() {
        let prediction = calibrate(0.15);
        assert_eq!(prediction.verdict, Verdict::Legitimate);
        assert_eq!(prediction.confidence, 0.85);
    }

    #[test]
    fn test_threshold_is_phishing() {
        let prediction = calibrate(0.5);
        assert_eq!(prediction.verdict, Verdict::Phishing);
        assert_eq!(prediction.confidence, 0.5);
    }

    #[test]
    fn test_rounding_to_three_decimals() {
        let prediction = calibrate(0.123_456);
        assert_eq!(prediction.confidence, 0.877);
    }

    #[test]
    fn test_out_of_range_probability_is_clamped() {
        assert_eq!(calibrate(1.5).confidence, 1.0);
        assert_eq!(calibrate(-0.5).confidence, 1.0);
        assert_eq!(calibrate(-0.5).verdict, Verdict::Legitimate);
    }

    #[test]
    fn test_confidence_bounds() {
        for i in 0..=1000 {
            let prediction = calibrate(i as f32 / 1000.0);
            assert!(prediction.confidence >= 0.5);
            assert!(prediction.confidence <= 1.0);
        }
    }

    #[test]
    fn test_verdict_matches_threshold_side() {
        for i in 0..=1000 {
            let p = i as f32 / 1000.0;
            let expected = if p >= PHISHING_THRESHOLD {
                Verdict::Phishing
            } else {
                Verdict::Legitimate
            };
            assert_eq!(calibrate(p).verdict, expected);
        }
    }

    #[test]
    fn test_verdict_serializes_to_display_string() {
        assert_eq!(
            serde_json::to_string(&Verdict::Phishing).unwrap(),
            "\"Phishing\""
        );
        assert_eq!(Verdict::Legitimate.to_string(), "Legitimate");
    }
}
