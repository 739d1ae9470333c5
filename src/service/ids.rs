use std::sync::atomic::{AtomicU64, Ordering};
use xxhash_rust::xxh3::xxh3_64;

use crate::features::FeatureRecord;

const ID_MODULUS: u64 = 100_000;

/// Stable customer identifier: `CUST_` plus five digits taken from the
/// xxh3 hash of the record's canonical JSON. The same applicant maps to the
/// same ID on every platform and every run.
pub fn customer_id(features: &FeatureRecord) -> String {
    let canonical = serde_json::to_vec(features).unwrap_or_default();
    format!("CUST_{:05}", xxh3_64(&canonical) % ID_MODULUS)
}

/// Monotonic assessment numbering, `ASM_00001` onwards.
#[derive(Debug, Default)]
pub struct AssessmentSequence {
    next: AtomicU64,
}

impl AssessmentSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        format!("ASM_{:05}", n % ID_MODULUS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn applicant() -> FeatureRecord {
        FeatureRecord::new(75000.0, 35.0, 200000.0, 750.0, 0.25, 8.0, 30.0)
    }

    #[test]
    fn test_customer_id_format() {
        let id = customer_id(&applicant());
        assert!(id.starts_with("CUST_"));
        assert_eq!(id.len(), 10);
        assert!(id[5..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_customer_id_is_stable() {
        assert_eq!(customer_id(&applicant()), customer_id(&applicant()));
    }

    #[test]
    fn test_customer_id_golden_value() {
        let canonical = serde_json::to_string(&applicant()).unwrap();
        assert_eq!(
            canonical,
            r#"{"Income":75000.0,"Age":35.0,"LoanAmount":200000.0,"CreditScore":750.0,"DebtToIncome":0.25,"EmploymentYears":8.0,"LoanTerm":30.0}"#
        );
        assert_eq!(xxh3_64(canonical.as_bytes()), 0xc217_4887_9c26_683e);
        assert_eq!(customer_id(&applicant()), "CUST_12254");
    }

    #[test]
    fn test_sequence_starts_at_one() {
        let seq = AssessmentSequence::new();
        assert_eq!(seq.next_id(), "ASM_00001");
        assert_eq!(seq.next_id(), "ASM_00002");
    }
}
