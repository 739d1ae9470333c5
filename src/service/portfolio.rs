use indexmap::IndexMap;
use serde::Serialize;

use crate::scoring::{CustomerSegment, RiskLevel, ScoreResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RiskDistribution {
    pub low_risk: f64,
    pub medium_risk: f64,
    pub high_risk: f64,
}

/// Aggregate view over a batch of heuristic assessments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub total_customers: usize,
    pub risk_distribution: RiskDistribution,
    pub segment_counts: IndexMap<CustomerSegment, usize>,
    pub total_portfolio_value: f64,
    pub average_risk_probability: f64,
    pub average_alt_data_impact: f64,
    pub average_investment_readiness: f64,
}

/// Summarize assessments. An empty batch yields zeros rather than NaN.
pub fn summarize<'a, I>(results: I) -> PortfolioSummary
where
    I: IntoIterator<Item = &'a ScoreResult>,
{
    let mut segment_counts: IndexMap<CustomerSegment, usize> =
        CustomerSegment::ALL.iter().map(|&s| (s, 0)).collect();
    let mut levels = [0usize; 3];
    let mut total = 0usize;
    let mut value = 0.0;
    let mut probability = 0.0;
    let mut alt_data = 0.0;
    let mut readiness = 0.0;

    for result in results {
        total += 1;
        levels[match result.risk_level {
            RiskLevel::Low => 0,
            RiskLevel::Medium => 1,
            RiskLevel::High => 2,
        }] += 1;
        *segment_counts.entry(result.customer_segment).or_insert(0) += 1;
        value += result.lifetime_value_estimate;
        probability += result.risk_probability;
        alt_data += result.alt_data_impact;
        readiness += result.investment_readiness_score;
    }

    let share = |count: f64| if total == 0 { 0.0 } else { count / total as f64 };

    PortfolioSummary {
        total_customers: total,
        risk_distribution: RiskDistribution {
            low_risk: share(levels[0] as f64),
            medium_risk: share(levels[1] as f64),
            high_risk: share(levels[2] as f64),
        },
        segment_counts,
        total_portfolio_value: value,
        average_risk_probability: share(probability),
        average_alt_data_impact: share(alt_data),
        average_investment_readiness: share(readiness),
    }
}
