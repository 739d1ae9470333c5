use chrono::{Months, NaiveDate};
use serde::Serialize;

use crate::scoring::derived::format_months;
use crate::scoring::{ImprovementAction, RiskLevel, ScoreResult};

/// Cap on the probability reduction promised by a plan.
pub const MAX_EXPECTED_IMPROVEMENT: f64 = 0.60;

/// Customer-facing remediation plan built from a heuristic assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisoryPlan {
    pub customer_id: String,
    pub current_risk_level: RiskLevel,
    pub risk_probability: f64,
    pub improvement_plan: Vec<ImprovementAction>,
    pub target_timeline: String,
    pub expected_improvement: f64,
    pub reapplication_date: NaiveDate,
}

/// Build the advisory for an assessed applicant.
///
/// The timeline is that of the slowest action; the applicant may reapply
/// once it has elapsed from `as_of`. Without actions the reapplication
/// date is `as_of` itself.
pub fn build_advisory(customer_id: String, result: &ScoreResult, as_of: NaiveDate) -> AdvisoryPlan {
    let plan = result.improvement_plan.clone();
    let longest = plan.iter().map(|a| a.timeline_months).max().unwrap_or(0);

    let expected_improvement = plan
        .iter()
        .map(|a| a.impact.weight())
        .sum::<f64>()
        .min(MAX_EXPECTED_IMPROVEMENT);

    let target_timeline = if longest == 0 {
        "no action required".to_string()
    } else {
        format_months(longest)
    };

    AdvisoryPlan {
        customer_id,
        current_risk_level: result.risk_level,
        risk_probability: result.risk_probability,
        improvement_plan: plan,
        target_timeline,
        expected_improvement,
        reapplication_date: as_of
            .checked_add_months(Months::new(longest))
            .unwrap_or(as_of),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureRecord;
    use crate::scoring::assess;
    use approx::assert_relative_eq;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
    }

    #[test]
    fn test_advisory_for_high_risk_applicant() {
        let mut f = FeatureRecord::new(35000.0, 24.0, 250000.0, 580.0, 0.65, 2.0, 30.0);
        f.social_media_risk_score = Some(4.0);
        f.late_payments = Some(4.0);
        f.overdraft_events = Some(6.0);

        let advisory = build_advisory("CUST_00042".to_string(), &assess(&f), as_of());
        assert_eq!(advisory.current_risk_level, RiskLevel::High);
        assert_eq!(advisory.improvement_plan.len(), 4);
        assert_eq!(advisory.target_timeline, "12 months");
        assert_relative_eq!(advisory.expected_improvement, 0.6, epsilon = 1e-12);
        assert_eq!(
            advisory.reapplication_date,
            NaiveDate::from_ymd_opt(2027, 1, 15).unwrap()
        );
    }

    #[test]
    fn test_partial_plan_improvement() {
        // Only DTI (high) and credit score (medium) trigger
        let f = FeatureRecord::new(35000.0, 35.0, 250000.0, 600.0, 0.65, 2.0, 30.0);
        let advisory = build_advisory("CUST_00001".to_string(), &assess(&f), as_of());
        assert_eq!(advisory.improvement_plan.len(), 2);
        assert_eq!(advisory.target_timeline, "9 months");
        assert_relative_eq!(advisory.expected_improvement, 0.35, epsilon = 1e-12);
        assert_eq!(
            advisory.reapplication_date,
            NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
        );
    }

    #[test]
    fn test_no_actions_for_low_risk() {
        let mut f = FeatureRecord::new(120000.0, 40.0, 20000.0, 800.0, 0.1, 10.0, 15.0);
        f.has_investment_account = Some(true);
        let advisory = build_advisory("CUST_00002".to_string(), &assess(&f), as_of());
        assert_eq!(advisory.current_risk_level, RiskLevel::Low);
        assert!(advisory.improvement_plan.is_empty());
        assert_eq!(advisory.target_timeline, "no action required");
        assert_eq!(advisory.expected_improvement, 0.0);
        assert_eq!(advisory.reapplication_date, as_of());
    }
}
