//! Prediction and assessment result types.
//!
//! Represents the output of the diabetes risk classifier.

use serde::{Deserialize, Serialize};

use super::attribution::AttributionVector;
use super::features::{BmiStatus, FeatureSchema, FeatureVector};

/// Probability at which the classifier's binary decision flips.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Risk level classification for diabetes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Low risk of diabetes
    Low,
    /// Moderate risk, screening recommended
    Moderate,
    /// High risk, consultation recommended
    High,
}

impl RiskLevel {
    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Low risk - Keep up healthy habits",
            Self::Moderate => "Moderate risk - Consider a blood glucose screening",
            Self::High => "High risk - Consult a healthcare professional",
        }
    }

    /// Get the associated color for TUI display (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Low => (16, 185, 129),      // Emerald (#10B981)
            Self::Moderate => (251, 191, 36), // Amber (#FBBF24)
            Self::High => (244, 63, 94),      // Rose (#F43F5E)
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Probability cut-offs for the risk banner.
///
/// Anything below `moderate` is `Low`; `moderate` is the classifier's
/// decision threshold, so the banner never reads "low" for a positive call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub moderate: f64,
    pub high: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            moderate: DECISION_THRESHOLD,
            high: 0.7,
        }
    }
}

impl RiskThresholds {
    #[must_use]
    pub fn classify(&self, probability: f64) -> RiskLevel {
        if probability < self.moderate {
            RiskLevel::Low
        } else if probability < self.high {
            RiskLevel::Moderate
        } else {
            RiskLevel::High
        }
    }
}

/// Result of the classifier (before interpretation).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Probability of the positive (at-risk) class, 0.0 to 1.0
    pub probability: f64,

    /// Binary prediction (0 = not at risk, 1 = at risk)
    pub label: u8,

    /// Confidence in the binary prediction (0.5 to 1.0)
    pub confidence: f64,
}

impl Prediction {
    #[must_use]
    pub fn new(probability: f64) -> Self {
        let positive = probability >= DECISION_THRESHOLD;
        Self {
            probability,
            label: u8::from(positive),
            confidence: if positive {
                probability
            } else {
                1.0 - probability
            },
        }
    }

    /// Probability formatted as a percentage with two decimals, e.g. "12.34%".
    #[must_use]
    pub fn percent(&self) -> String {
        format!("{:.2}%", self.probability * 100.0)
    }
}

/// Complete outcome of one prediction request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    /// Schema the features were derived for
    pub schema: FeatureSchema,

    /// Model-ready features
    pub features: FeatureVector,

    pub bmi: f64,

    pub bmi_status: BmiStatus,

    pub prediction: Prediction,

    pub risk_level: RiskLevel,

    /// Per-feature contributions, when explanation was requested
    pub attribution: Option<AttributionVector>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_from_probability() {
        let thresholds = RiskThresholds::default();
        assert_eq!(thresholds.classify(0.1), RiskLevel::Low);
        assert_eq!(thresholds.classify(0.4999), RiskLevel::Low);
        assert_eq!(thresholds.classify(0.5), RiskLevel::Moderate);
        assert_eq!(thresholds.classify(0.69), RiskLevel::Moderate);
        assert_eq!(thresholds.classify(0.9), RiskLevel::High);
    }

    #[test]
    fn test_prediction_label_and_confidence() {
        let low = Prediction::new(0.2);
        assert_eq!(low.label, 0);
        assert!((low.confidence - 0.8).abs() < f64::EPSILON);

        let high = Prediction::new(0.75);
        assert_eq!(high.label, 1);
        assert!((high.confidence - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_percent_format() {
        assert_eq!(Prediction::new(0.1234).percent(), "12.34%");
        assert_eq!(Prediction::new(1.0).percent(), "100.00%");
    }
}
