use serde::Serialize;

use super::derived::{self, CustomerSegment, ImprovementAction};
use super::{sigmoid, RiskLevel};
use crate::features::FeatureRecord;

pub const BASE_LOGIT: f64 = -2.8;
pub const LOGIT_BOUND: f64 = 4.5;
pub const MIN_PROBABILITY: f64 = 0.005;
pub const MAX_PROBABILITY: f64 = 0.85;

/// Months of tenure beyond which loyalty earns no further credit.
pub const TENURE_CAP_MONTHS: f64 = 60.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorContribution {
    pub label: String,       // e.g. "Credit score", "Late payments"
    pub description: String, // e.g. "(850 - 720) x 0.0045"
    pub before: f64,         // Logit before this factor
    pub after: f64,          // Logit after this factor
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub base_logit: f64,
    pub factors: Vec<FactorContribution>,
}

/// Full heuristic assessment of one applicant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub risk_probability: f64,
    pub risk_level: RiskLevel,
    /// Logit after clamping to +/- 4.5
    pub logit: f64,
    pub alt_data_impact: f64,
    pub customer_segment: CustomerSegment,
    pub lifetime_value_estimate: f64,
    pub risk_adjusted_rate: f64,
    pub upsell_products: Vec<String>,
    pub investment_readiness_score: f64,
    pub improvement_plan: Vec<ImprovementAction>,
    pub breakdown: ScoreBreakdown,
}

struct LogitTrace {
    logit: f64,
    factors: Vec<FactorContribution>,
}

impl LogitTrace {
    fn add(&mut self, label: &str, delta: f64, description: String) {
        let before = self.logit;
        self.logit += delta;
        self.factors.push(FactorContribution {
            label: label.to_string(),
            description,
            before,
            after: self.logit,
        });
    }
}

/// Heuristic default-risk logit over traditional and alternative data.
///
/// Terms are additive and recorded in a fixed order. The returned logit is
/// not yet clamped.
fn heuristic_logit(f: &FeatureRecord) -> LogitTrace {
    let mut trace = LogitTrace {
        logit: BASE_LOGIT,
        factors: Vec::new(),
    };

    let social = f.social_media_risk_score();
    let device = f.device_usage_score();
    let products = f.number_of_products();
    let invested = f.has_investment_account();
    let late = f.late_payments();
    let overdrafts = f.overdraft_events();
    let tenure = f.account_tenure();

    trace.add(
        "Credit score",
        (850.0 - f.credit_score) * 0.0045,
        format!("(850 - {}) x 0.0045", f.credit_score),
    );
    trace.add(
        "Income",
        -(f.income - 50000.0) * 0.000012,
        format!("-({} - 50000) x 0.000012", f.income),
    );
    trace.add(
        "Debt-to-income",
        f.debt_to_income * 4.2,
        format!("{} x 4.2", f.debt_to_income),
    );
    trace.add(
        "Employment",
        -f.employment_years * 0.08,
        format!("-{} years x 0.08", f.employment_years),
    );

    if f.age < 25.0 || f.age > 65.0 {
        trace.add("Age band", 0.6, format!("age {} outside 25-65", f.age));
    } else if f.age < 30.0 || f.age > 55.0 {
        trace.add("Age band", 0.2, format!("age {} outside 30-55", f.age));
    }

    let loan_to_income = f.loan_amount / f.income.max(1.0);
    trace.add(
        "Loan-to-income",
        loan_to_income * 1.8,
        format!("{:.3} x 1.8", loan_to_income),
    );
    trace.add(
        "Social media",
        (social - 1.0) * 0.35,
        format!("({} - 1) x 0.35", social),
    );
    trace.add(
        "Device usage",
        (50.0 - device) * 0.008,
        format!("(50 - {}) x 0.008", device),
    );
    trace.add(
        "Product holdings",
        -(products - 1.0) * 0.25,
        format!("-({} - 1) x 0.25", products),
    );
    if invested {
        trace.add("Investment account", -0.45, "holds investment account".to_string());
    }
    trace.add("Late payments", late * 0.4, format!("{} x 0.4", late));
    trace.add("Overdrafts", overdrafts * 0.25, format!("{} x 0.25", overdrafts));

    let credited_tenure = tenure.min(TENURE_CAP_MONTHS);
    trace.add(
        "Account tenure",
        -credited_tenure * 0.008,
        format!("-min({}, 60) months x 0.008", tenure),
    );

    if f.debt_to_income > 0.4 && f.credit_score < 650.0 {
        trace.add(
            "High DTI with weak credit",
            0.8,
            "DTI > 0.4 and credit score < 650".to_string(),
        );
    }
    if f.income > 100000.0 && invested && f.credit_score > 750.0 {
        trace.add(
            "Affluent investor",
            -0.6,
            "income > 100000, investment account, credit score > 750".to_string(),
        );
    }
    if f.age < 30.0 && social >= 4.0 {
        trace.add(
            "Young with high social risk",
            0.4,
            "age < 30 and social score >= 4".to_string(),
        );
    }

    trace
}

/// Clamp a raw logit to +/- [`LOGIT_BOUND`]. Finite inputs can still push
/// two terms to opposite infinities; the resulting NaN is scored at the
/// upper bound.
pub fn bound_logit(raw: f64) -> f64 {
    if raw.is_nan() {
        LOGIT_BOUND
    } else {
        raw.clamp(-LOGIT_BOUND, LOGIT_BOUND)
    }
}

/// Score an applicant with the fixed banking heuristic and derive the
/// business attributes that follow from the risk tier.
///
/// The probability always lies in [0.005, 0.85]. The record is assumed to
/// have passed [`crate::features::validate_features`].
pub fn assess(features: &FeatureRecord) -> ScoreResult {
    let trace = heuristic_logit(features);
    let logit = bound_logit(trace.logit);
    let risk_probability = sigmoid(logit).clamp(MIN_PROBABILITY, MAX_PROBABILITY);
    let risk_level = RiskLevel::from_probability(risk_probability);

    let customer_segment = derived::customer_segment(features, risk_level);

    ScoreResult {
        risk_probability,
        risk_level,
        logit,
        alt_data_impact: derived::alt_data_impact(features),
        customer_segment,
        lifetime_value_estimate: derived::lifetime_value(features, customer_segment),
        risk_adjusted_rate: derived::risk_adjusted_rate(risk_level),
        upsell_products: derived::upsell_products(features, risk_level, customer_segment),
        investment_readiness_score: derived::investment_readiness(features),
        improvement_plan: derived::improvement_plan(features, risk_level),
        breakdown: ScoreBreakdown {
            base_logit: BASE_LOGIT,
            factors: trace.factors,
        },
    }
}
