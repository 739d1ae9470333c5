use super::record::{Feature, FeatureRecord};
use crate::error::RiskError;

/// Validate a feature record before scoring.
/// Returns all validation errors at once (not just the first).
pub fn validate_features(record: &FeatureRecord) -> Result<(), Vec<String>> {
    let errors: Vec<String> = record
        .present_values()
        .filter(|(_, value)| !value.is_finite())
        .map(|(feature, value)| format!("{}: must be a finite number, got {}", feature, value))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Decode and validate a record from an arbitrary JSON value.
///
/// Missing required fields, wrong value types and unknown feature names are
/// all reported as [`RiskError::Validation`].
pub fn parse_record(value: serde_json::Value) -> Result<FeatureRecord, RiskError> {
    let record: FeatureRecord =
        serde_json::from_value(value).map_err(|e| RiskError::validation(e.to_string()))?;
    validate_features(&record).map_err(RiskError::Validation)?;
    Ok(record)
}

/// Required features absent from a JSON object, in canonical order.
///
/// Used to give a complete report instead of serde's first-missing-field
/// message.
pub fn missing_required(value: &serde_json::Value) -> Vec<Feature> {
    let Some(object) = value.as_object() else {
        return Feature::ALL.iter().copied().filter(|f| f.is_required()).collect();
    };
    Feature::ALL
        .iter()
        .copied()
        .filter(|feature| feature.is_required() && !object.contains_key(feature.name()))
        .collect()
}

/// Like [`parse_record`], but reports every missing required feature at once.
pub fn parse_record_strict(value: serde_json::Value) -> Result<FeatureRecord, RiskError> {
    let missing = missing_required(&value);
    if !missing.is_empty() {
        return Err(RiskError::Validation(
            missing
                .into_iter()
                .map(|feature| format!("{}: required field is missing", feature))
                .collect(),
        ));
    }
    parse_record(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_json() -> serde_json::Value {
        json!({
            "Income": 75000, "Age": 35, "LoanAmount": 200000, "CreditScore": 750,
            "DebtToIncome": 0.25, "EmploymentYears": 8, "LoanTerm": 30
        })
    }

    #[test]
    fn test_valid_record() {
        let record = parse_record(valid_json()).unwrap();
        assert!(validate_features(&record).is_ok());
    }

    #[test]
    fn test_non_finite_values_collected() {
        let mut record = parse_record(valid_json()).unwrap();
        record.income = f64::NAN;
        record.late_payments = Some(f64::INFINITY);

        let errors = validate_features(&record).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("Income"));
        assert!(errors[1].starts_with("LatePayments"));
    }

    #[test]
    fn test_wrong_type_is_validation_error() {
        let mut value = valid_json();
        value["CreditScore"] = json!("excellent");
        match parse_record(value) {
            Err(RiskError::Validation(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_reports_every_missing_field() {
        let value = json!({"Income": 50000, "Age": 40});
        match parse_record_strict(value) {
            Err(RiskError::Validation(errors)) => {
                assert_eq!(errors.len(), 5);
                assert!(errors[0].starts_with("LoanAmount"));
                assert!(errors[4].starts_with("LoanTerm"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_required_on_non_object() {
        assert_eq!(missing_required(&json!([1, 2, 3])).len(), 7);
    }
}
