pub mod banking;
pub mod derived;
pub mod linear;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use banking::{assess, FactorContribution, ScoreBreakdown, ScoreResult};
pub use derived::{CustomerSegment, Impact, ImprovementAction};
pub use linear::{classify, score, Prediction};

/// Logistic transform. No clamping: very large |logit| saturates to exactly
/// 0.0 or 1.0.
pub fn sigmoid(logit: f64) -> f64 {
    1.0 / (1.0 + (-logit).exp())
}

/// Probability bucket reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const LOW_UPPER: f64 = 0.3;
    pub const MEDIUM_UPPER: f64 = 0.7;

    pub fn from_probability(probability: f64) -> Self {
        if probability < Self::LOW_UPPER {
            RiskLevel::Low
        } else if probability < Self::MEDIUM_UPPER {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
