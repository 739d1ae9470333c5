use serde::Serialize;

use crate::features::FeatureRecord;
use crate::scoring::ScoreResult;

/// DTI above which a loan may fall outside the Qualified Mortgage rule.
pub const QM_DTI_LIMIT: f64 = 0.43;
pub const MIN_UNVERIFIED_AGE: f64 = 21.0;
pub const CONFIDENCE_HALF_WIDTH: f64 = 0.1;

pub const FLAG_HIGH_DTI: &str = "High DTI - QM rule consideration";
pub const FLAG_YOUNG_BORROWER: &str = "Young borrower - additional verification required";

/// Heuristic score plus the identifiers and compliance annotations
/// returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComprehensiveAssessment {
    pub assessment_id: String,
    pub customer_id: String,
    #[serde(flatten)]
    pub result: ScoreResult,
    pub regulatory_flags: Vec<String>,
    pub confidence_interval: [f64; 2],
}

pub fn regulatory_flags(features: &FeatureRecord) -> Vec<String> {
    let mut flags = Vec::new();
    if features.debt_to_income > QM_DTI_LIMIT {
        flags.push(FLAG_HIGH_DTI.to_string());
    }
    if features.age < MIN_UNVERIFIED_AGE {
        flags.push(FLAG_YOUNG_BORROWER.to_string());
    }
    flags
}

/// Fixed-width band around the probability, clamped to [0, 1].
pub fn confidence_interval(probability: f64) -> [f64; 2] {
    [
        (probability - CONFIDENCE_HALF_WIDTH).max(0.0),
        (probability + CONFIDENCE_HALF_WIDTH).min(1.0),
    ]
}
