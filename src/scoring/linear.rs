use serde::{Deserialize, Serialize};
use std::fmt;

use super::sigmoid;
use crate::error::RiskError;
use crate::features::FeatureRecord;
use crate::model::CoefficientTable;

/// Probability above which an applicant is classified high risk.
pub const DECISION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prediction {
    HighRisk,
    LowRisk,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Prediction::HighRisk => "high_risk",
            Prediction::LowRisk => "low_risk",
        })
    }
}

/// Intercept plus the weighted sum of every feature present in the record
/// that also appears in the table. Table entries naming no feature are
/// ignored.
pub fn linear_logit(features: &FeatureRecord, coefficients: &CoefficientTable) -> f64 {
    features
        .present_values()
        .filter_map(|(feature, value)| {
            coefficients
                .get(feature.name())
                .map(|weight| weight * value)
        })
        .fold(coefficients.intercept(), |logit, term| logit + term)
}

/// Default-risk probability under a coefficient model.
pub fn score(features: &FeatureRecord, coefficients: &CoefficientTable) -> Result<f64, RiskError> {
    if coefficients.is_empty() {
        return Err(RiskError::NotReady);
    }
    let logit = linear_logit(features, coefficients);
    if logit.is_nan() {
        return Err(RiskError::validation(
            "feature values overflow the coefficient model",
        ));
    }
    Ok(sigmoid(logit))
}

pub fn classify(probability: f64) -> Prediction {
    if probability > DECISION_THRESHOLD {
        Prediction::HighRisk
    } else {
        Prediction::LowRisk
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn table(entries: &[(&str, f64)]) -> CoefficientTable {
        entries
            .iter()
            .map(|(name, weight)| (name.to_string(), *weight))
            .collect()
    }

    fn demo_table() -> CoefficientTable {
        table(&[
            ("Intercept", -1.2),
            ("Income", -0.00001),
            ("Age", -0.01),
            ("LoanAmount", 0.000002),
            ("CreditScore", -0.003),
            ("DebtToIncome", 4.5),
            ("EmploymentYears", -0.05),
            ("LoanTerm", 0.01),
        ])
    }

    fn standard_applicant() -> FeatureRecord {
        FeatureRecord::new(75000.0, 35.0, 200000.0, 750.0, 0.25, 8.0, 30.0)
    }

    #[test]
    fn test_fallback_table_scores_exactly_half() {
        let p = score(&standard_applicant(), &CoefficientTable::fallback()).unwrap();
        assert_eq!(p, 0.5);
        assert_eq!(classify(p), Prediction::LowRisk);
    }

    #[test]
    fn test_standard_applicant_is_low_risk() {
        let p = score(&standard_applicant(), &demo_table()).unwrap();
        // logit = -1.2 - 0.75 - 0.35 + 0.4 - 2.25 + 1.125 - 0.4 + 0.3
        assert_relative_eq!(p, sigmoid(-3.125), epsilon = 1e-12);
        assert!(p < 0.3);
        assert_eq!(classify(p), Prediction::LowRisk);
    }

    #[test]
    fn test_weak_applicant_is_high_risk() {
        let applicant = FeatureRecord::new(25000.0, 22.0, 300000.0, 500.0, 0.8, 1.0, 15.0);
        let p = score(&applicant, &demo_table()).unwrap();
        assert_relative_eq!(p, sigmoid(1.13), epsilon = 1e-12);
        assert_eq!(classify(p), Prediction::HighRisk);
    }

    #[test]
    fn test_unknown_table_entries_are_ignored() {
        let coefficients = table(&[("Intercept", 0.25), ("Fallback", 1.0), ("ZipCode", 9.0)]);
        let p = score(&standard_applicant(), &coefficients).unwrap();
        assert_eq!(p, sigmoid(0.25));
    }

    #[test]
    fn test_optional_features_contribute_when_present() {
        let coefficients = table(&[("HasInvestmentAccount", -1.0), ("LatePayments", 0.5)]);
        let mut applicant = standard_applicant();
        assert_eq!(linear_logit(&applicant, &coefficients), 0.0);

        applicant.has_investment_account = Some(true);
        applicant.late_payments = Some(3.0);
        assert_relative_eq!(linear_logit(&applicant, &coefficients), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_table_is_not_ready() {
        let result = score(&standard_applicant(), &CoefficientTable::default());
        assert!(matches!(result, Err(RiskError::NotReady)));
    }

    #[test]
    fn test_extreme_values_saturate() {
        let coefficients = table(&[("Income", 1.0)]);
        let mut applicant = standard_applicant();
        applicant.income = 1.0e6;
        assert_eq!(score(&applicant, &coefficients).unwrap(), 1.0);
        applicant.income = -1.0e6;
        assert_eq!(score(&applicant, &coefficients).unwrap(), 0.0);
    }

    #[test]
    fn test_opposing_overflow_is_rejected() {
        let coefficients = table(&[("Income", 1.0), ("LoanAmount", 1.0)]);
        let mut applicant = standard_applicant();
        applicant.income = 1.0e308;
        applicant.loan_amount = -1.0e308;
        assert!(score(&applicant, &coefficients).is_ok());

        let coefficients = table(&[("Income", 10.0), ("LoanAmount", 10.0)]);
        assert!(matches!(
            score(&applicant, &coefficients),
            Err(RiskError::Validation(_))
        ));
    }

    #[test]
    fn test_threshold_is_strict() {
        assert_eq!(classify(0.5), Prediction::LowRisk);
        assert_eq!(classify(0.5000001), Prediction::HighRisk);
    }

    #[test]
    fn test_deterministic() {
        let applicant = standard_applicant();
        let coefficients = demo_table();
        let first = score(&applicant, &coefficients).unwrap();
        for _ in 0..10 {
            assert_eq!(score(&applicant, &coefficients).unwrap(), first);
        }
    }
}
