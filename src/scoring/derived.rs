//! Business attributes derived from a heuristic risk assessment: customer
//! segment, lifetime value, pricing, cross-sell offers, investment readiness
//! and the remediation plan for high-risk applicants.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::RiskLevel;
use crate::features::{Feature, FeatureRecord};

/// Base lending rate before the risk premium.
pub const BASE_RATE: f64 = 0.045;

/// Share of annual income counted toward lifetime value.
pub const LIFETIME_VALUE_INCOME_SHARE: f64 = 0.15;

pub const PREMIUM_INCOME: f64 = 100000.0;
pub const PREMIUM_CREDIT_SCORE: f64 = 750.0;
pub const EMERGING_INCOME: f64 = 40000.0;
pub const EMERGING_CREDIT_SCORE: f64 = 650.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerSegment {
    Premium,
    Standard,
    Emerging,
    HighRisk,
}

impl CustomerSegment {
    pub const ALL: [CustomerSegment; 4] = [
        CustomerSegment::Premium,
        CustomerSegment::Standard,
        CustomerSegment::Emerging,
        CustomerSegment::HighRisk,
    ];

    pub fn value_multiplier(self) -> f64 {
        match self {
            CustomerSegment::Premium => 2.5,
            CustomerSegment::Standard => 1.5,
            CustomerSegment::Emerging => 1.0,
            CustomerSegment::HighRisk => 0.5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CustomerSegment::Premium => "premium",
            CustomerSegment::Standard => "standard",
            CustomerSegment::Emerging => "emerging",
            CustomerSegment::HighRisk => "high_risk",
        }
    }
}

impl fmt::Display for CustomerSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rules are checked in order; the first match wins.
pub fn customer_segment(features: &FeatureRecord, risk_level: RiskLevel) -> CustomerSegment {
    if features.income > PREMIUM_INCOME
        && features.credit_score > PREMIUM_CREDIT_SCORE
        && features.has_investment_account()
    {
        CustomerSegment::Premium
    } else if risk_level == RiskLevel::High {
        CustomerSegment::HighRisk
    } else if features.income < EMERGING_INCOME || features.credit_score < EMERGING_CREDIT_SCORE {
        CustomerSegment::Emerging
    } else {
        CustomerSegment::Standard
    }
}

pub fn lifetime_value(features: &FeatureRecord, segment: CustomerSegment) -> f64 {
    features.income * LIFETIME_VALUE_INCOME_SHARE * segment.value_multiplier()
}

pub fn risk_premium(risk_level: RiskLevel) -> f64 {
    match risk_level {
        RiskLevel::Low => 0.0,
        RiskLevel::Medium => 0.015,
        RiskLevel::High => 0.035,
    }
}

pub fn risk_adjusted_rate(risk_level: RiskLevel) -> f64 {
    BASE_RATE + risk_premium(risk_level)
}

/// Size of the alternative-data signal. Reported only; it does not feed
/// back into the probability.
pub fn alt_data_impact(features: &FeatureRecord) -> f64 {
    (features.social_media_risk_score() - 3.0).abs() * 0.35
        + (50.0 - features.device_usage_score()).abs() * 0.008
        + features.late_payments() * 0.4
        + features.overdraft_events() * 0.25
}

pub fn upsell_products(
    features: &FeatureRecord,
    risk_level: RiskLevel,
    segment: CustomerSegment,
) -> Vec<String> {
    let mut products = Vec::new();
    let invested = features.has_investment_account();

    if risk_level == RiskLevel::Low {
        if !invested && features.income > 60000.0 {
            products.push("Investment Portfolio Management");
        }
        if features.income > 80000.0 {
            products.push("Premium Credit Card");
        }
        if features.number_of_products() < 3.0 {
            products.push("Mortgage Pre-approval");
        }
    }

    if segment == CustomerSegment::Premium {
        products.push("Private Banking Services");
        products.push("Wealth Management");
    }

    if features.age > 45.0 && !invested {
        products.push("Retirement Planning");
    }

    products.into_iter().map(String::from).collect()
}

/// Bucketed readiness for investment products, in [0, 1].
pub fn investment_readiness(features: &FeatureRecord) -> f64 {
    let mut score = 0.0;

    if features.income > 100000.0 {
        score += 0.4;
    } else if features.income > 60000.0 {
        score += 0.2;
    }

    if (30.0..=55.0).contains(&features.age) {
        score += 0.3;
    } else if (25.0..=65.0).contains(&features.age) {
        score += 0.2;
    }

    if features.credit_score > 750.0 {
        score += 0.2;
    } else if features.credit_score > 650.0 {
        score += 0.1;
    }

    if features.employment_years > 5.0 {
        score += 0.1;
    }

    f64::min(score, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

impl Impact {
    /// Expected probability reduction credited to one action
    pub fn weight(self) -> f64 {
        match self {
            Impact::High => 0.20,
            Impact::Medium => 0.15,
            Impact::Low => 0.05,
        }
    }
}

/// One remediation step for a high-risk applicant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImprovementAction {
    pub action: String,
    pub factor: String,
    pub current_value: f64,
    pub target_value: f64,
    pub timeline_months: u32,
    pub timeline: String,
    pub impact: Impact,
}

enum Trigger {
    Above(f64),
    Below(f64),
}

impl Trigger {
    fn fires(&self, value: f64) -> bool {
        match *self {
            Trigger::Above(limit) => value > limit,
            Trigger::Below(limit) => value < limit,
        }
    }
}

struct ActionRule {
    feature: Feature,
    trigger: Trigger,
    action: &'static str,
    target: f64,
    months: u32,
    impact: Impact,
}

const IMPROVEMENT_RULES: [ActionRule; 4] = [
    ActionRule {
        feature: Feature::DebtToIncome,
        trigger: Trigger::Above(0.4),
        action: "Reduce debt-to-income ratio by consolidating or paying down revolving balances",
        target: 0.35,
        months: 6,
        impact: Impact::High,
    },
    ActionRule {
        feature: Feature::LatePayments,
        trigger: Trigger::Above(2.0),
        action: "Set up automatic payments to build an on-time payment history",
        target: 0.0,
        months: 12,
        impact: Impact::High,
    },
    ActionRule {
        feature: Feature::CreditScore,
        trigger: Trigger::Below(650.0),
        action: "Lower credit utilization below 30% to lift the credit score",
        target: 680.0,
        months: 9,
        impact: Impact::Medium,
    },
    ActionRule {
        feature: Feature::SocialMediaRiskScore,
        trigger: Trigger::Above(0.6),
        action: "Reduce alternative-data risk signals by keeping contact and account details consistent",
        target: 0.4,
        months: 3,
        impact: Impact::Low,
    },
];

/// Remediation steps, generated only for high-risk applicants.
pub fn improvement_plan(features: &FeatureRecord, risk_level: RiskLevel) -> Vec<ImprovementAction> {
    if risk_level != RiskLevel::High {
        return Vec::new();
    }

    IMPROVEMENT_RULES
        .iter()
        .filter_map(|rule| {
            let current = features.resolved(rule.feature);
            rule.trigger.fires(current).then(|| ImprovementAction {
                action: rule.action.to_string(),
                factor: rule.feature.name().to_string(),
                current_value: current,
                target_value: rule.target,
                timeline_months: rule.months,
                timeline: format_months(rule.months),
                impact: rule.impact,
            })
        })
        .collect()
}

pub fn format_months(months: u32) -> String {
    if months == 1 {
        "1 month".to_string()
    } else {
        format!("{} months", months)
    }
}
