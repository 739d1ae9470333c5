use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::config::ColorMode;
use crate::model::ModelSource;
use crate::scoring::{Prediction, RiskLevel, ScoreBreakdown};
use crate::service::{
    AdvisoryPlan, ComprehensiveAssessment, HealthReport, ModelInfo, PortfolioSummary,
    PredictionResponse, ServiceStatus,
};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

pub fn resolve_colors(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Auto => should_use_colors(),
        ColorMode::Always => true,
        ColorMode::Never => false,
    }
}

/// Format a probability as a percentage with one decimal ("12.3%")
pub fn format_probability(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}

/// Format a rate as a percentage with two decimals ("4.50%")
pub fn format_rate(rate: f64) -> String {
    format!("{:.2}%", rate * 100.0)
}

/// Format a currency amount with thousands separators, no cents ("$56,250")
pub fn format_currency(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0.0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

fn paint_level(level: RiskLevel, use_colors: bool) -> String {
    let label = level.as_str().to_uppercase();
    if !use_colors {
        return label;
    }
    match level {
        RiskLevel::Low => label.green().bold().to_string(),
        RiskLevel::Medium => label.yellow().bold().to_string(),
        RiskLevel::High => label.red().bold().to_string(),
    }
}

fn paint_prediction(prediction: Prediction, use_colors: bool) -> String {
    let label = prediction.to_string();
    match (prediction, use_colors) {
        (_, false) => label,
        (Prediction::LowRisk, true) => label.green().bold().to_string(),
        (Prediction::HighRisk, true) => label.red().bold().to_string(),
    }
}

/// Format a single coefficient-model prediction
pub fn format_prediction(response: &PredictionResponse, use_colors: bool) -> String {
    let model = format!("{} v{}", response.model_name, response.model_version);
    format!(
        "Prediction: {}\n  Probability: {}\n  Risk score: {:.2}\n  Model: {}",
        paint_prediction(response.prediction, use_colors),
        format_probability(response.probability),
        response.risk_score,
        if use_colors {
            model.cyan().to_string()
        } else {
            model
        }
    )
}

/// Format a comprehensive assessment. `detailed` adds the logit breakdown.
pub fn format_assessment(
    assessment: &ComprehensiveAssessment,
    use_colors: bool,
    detailed: bool,
) -> String {
    let r = &assessment.result;
    let mut lines = vec![
        format!(
            "Assessment {} for {}",
            assessment.assessment_id, assessment.customer_id
        ),
        format!("  Risk level: {}", paint_level(r.risk_level, use_colors)),
        format!(
            "  Risk probability: {} (interval {} - {})",
            format_probability(r.risk_probability),
            format_probability(assessment.confidence_interval[0]),
            format_probability(assessment.confidence_interval[1])
        ),
        format!("  Customer segment: {}", r.customer_segment.as_str().to_uppercase()),
        format!("  Lifetime value: {}", format_currency(r.lifetime_value_estimate)),
        format!("  Risk-adjusted rate: {}", format_rate(r.risk_adjusted_rate)),
        format!("  Investment readiness: {:.0}%", r.investment_readiness_score * 100.0),
        format!("  Alternative data impact: {:.3}", r.alt_data_impact),
    ];

    if r.upsell_products.is_empty() {
        lines.push("  Upsell products: none".to_string());
    } else {
        lines.push(format!("  Upsell products: {}", r.upsell_products.join(", ")));
    }

    for flag in &assessment.regulatory_flags {
        let line = format!("  ! {}", flag);
        lines.push(if use_colors {
            line.yellow().to_string()
        } else {
            line
        });
    }

    if !r.improvement_plan.is_empty() {
        lines.push(format!("  Improvement plan: {} actions", r.improvement_plan.len()));
    }

    if detailed {
        lines.push(format_breakdown(&r.breakdown, use_colors));
    }

    lines.join("\n")
}

/// Format the per-factor logit trace
pub fn format_breakdown(breakdown: &ScoreBreakdown, use_colors: bool) -> String {
    let mut lines = vec![format!("  Logit breakdown (base {:+.4}):", breakdown.base_logit)];
    for factor in &breakdown.factors {
        let delta = format!("{:+.4}", factor.after - factor.before);
        let delta = if !use_colors {
            delta
        } else if factor.after > factor.before {
            delta.red().to_string()
        } else {
            delta.green().to_string()
        };
        lines.push(format!(
            "    {:<28} {:>9}  {:>8.4}  {}",
            factor.label,
            delta,
            factor.after,
            if use_colors {
                factor.description.dimmed().to_string()
            } else {
                factor.description.clone()
            }
        ));
    }
    lines.join("\n")
}

/// Format an advisory plan with one block per action
pub fn format_advisory(plan: &AdvisoryPlan, use_colors: bool) -> String {
    let mut lines = vec![
        format!("Advisory plan for {}", plan.customer_id),
        format!(
            "  Current risk: {} ({})",
            paint_level(plan.current_risk_level, use_colors),
            format_probability(plan.risk_probability)
        ),
        format!("  Timeline: {}", plan.target_timeline),
        format!(
            "  Expected improvement: {:.0}%",
            plan.expected_improvement * 100.0
        ),
        format!("  Reapplication date: {}", plan.reapplication_date),
    ];

    for (idx, action) in plan.improvement_plan.iter().enumerate() {
        let heading = format!("{:>3}. {}", idx + 1, action.action);
        lines.push(if use_colors {
            heading.bold().to_string()
        } else {
            heading
        });
        lines.push(format!(
            "       {}: {} -> {} within {} (impact: {})",
            action.factor,
            action.current_value,
            action.target_value,
            action.timeline,
            format!("{:?}", action.impact).to_lowercase()
        ));
    }

    lines.join("\n")
}

pub fn format_health(report: &HealthReport, use_colors: bool) -> String {
    let status = format!("{:?}", report.status).to_lowercase();
    let status = match (report.status, use_colors) {
        (_, false) => status,
        (ServiceStatus::Healthy, true) => status.green().to_string(),
        (ServiceStatus::Degraded, true) => status.yellow().to_string(),
        (ServiceStatus::Unavailable, true) => status.red().to_string(),
    };
    format!(
        "Status: {}\n  Model ready: {}\n  Degraded: {}\n  Model source: {}\n  Checked at: {}",
        status,
        report.model_ready,
        report.degraded,
        report.model_source,
        report.timestamp.to_rfc3339()
    )
}

pub fn format_model_info(info: &ModelInfo, use_colors: bool) -> String {
    let name = if use_colors {
        info.metadata.model_name.bold().to_string()
    } else {
        info.metadata.model_name.clone()
    };
    let mut lines = vec![
        format!("{} v{}", name, info.metadata.model_version),
        match &info.source {
            ModelSource::Artifact { coefficients } => {
                format!("  Source: {}", coefficients.display())
            }
            ModelSource::Fallback { reason } => {
                let line = format!("  Source: fallback ({})", reason);
                if use_colors {
                    line.yellow().to_string()
                } else {
                    line
                }
            }
        },
        format!("  Coefficients: {}", info.coefficients.count),
    ];
    for coefficient in &info.coefficients.names {
        lines.push(format!("    {}", coefficient));
    }
    for (key, value) in &info.metadata.extra {
        lines.push(format!("  {}: {}", key, value));
    }
    lines.join("\n")
}

pub fn format_portfolio(summary: &PortfolioSummary, use_colors: bool) -> String {
    let dist = &summary.risk_distribution;
    let share = |fraction: f64, level: RiskLevel| {
        let text = format!("{:.0}% {}", fraction * 100.0, level);
        match (level, use_colors) {
            (_, false) => text,
            (RiskLevel::Low, true) => text.green().to_string(),
            (RiskLevel::Medium, true) => text.yellow().to_string(),
            (RiskLevel::High, true) => text.red().to_string(),
        }
    };
    let value = format_currency(summary.total_portfolio_value);

    let mut lines = vec![
        format!("Customers: {}", summary.total_customers),
        format!(
            "  Risk distribution: {}, {}, {}",
            share(dist.low_risk, RiskLevel::Low),
            share(dist.medium_risk, RiskLevel::Medium),
            share(dist.high_risk, RiskLevel::High)
        ),
        format!(
            "  Portfolio value: {}",
            if use_colors {
                value.bold().to_string()
            } else {
                value
            }
        ),
        format!(
            "  Average risk probability: {}",
            format_probability(summary.average_risk_probability)
        ),
        format!(
            "  Average investment readiness: {:.0}%",
            summary.average_investment_readiness * 100.0
        ),
    ];
    for (segment, count) in &summary.segment_counts {
        lines.push(format!("  {:<10} {}", segment.as_str(), count));
    }
    lines.join("\n")
}

/// A batch prediction with the label it is listed under
pub struct LabeledPrediction<'a> {
    pub label: String,
    pub response: &'a PredictionResponse,
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a label to fit available width, accounting for Unicode
fn truncate_label(label: &str, max_width: usize) -> String {
    let chars: Vec<char> = label.chars().collect();
    if chars.len() <= max_width {
        label.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format batch predictions as a table with columns: Index, Probability,
/// Prediction, Label
/// Index column: 3 chars (fits "99."), right-aligned
/// Probability column is right-aligned, 6 chars wide (fits "100.0%")
pub fn format_batch_table(rows: &[LabeledPrediction], use_colors: bool) -> String {
    if rows.is_empty() {
        return "No applicants scored.".to_string();
    }

    let term_width = get_terminal_width();
    let probability_width = 6;
    let prediction_width = 9;
    let separator = "  ";

    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            let index_str = format!("{:>2}.", idx + 1);
            let probability = format!(
                "{:>width$}",
                format_probability(row.response.probability),
                width = probability_width
            );
            let prediction = format!(
                "{:<width$}",
                row.response.prediction.to_string(),
                width = prediction_width
            );

            let fixed_width = 3 + 1 + probability_width + prediction_width + separator.len() * 2;
            let label = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate_label(&row.label, width - fixed_width)
                }
                Some(_) => truncate_label(&row.label, 20),
                None => row.label.clone(),
            };

            if use_colors {
                let prediction = match row.response.prediction {
                    Prediction::LowRisk => prediction.green().to_string(),
                    Prediction::HighRisk => prediction.red().to_string(),
                };
                format!(
                    "{} {}{}{}{}{}",
                    index_str.dimmed(),
                    probability.bold(),
                    separator,
                    prediction,
                    separator,
                    label
                )
            } else {
                format!(
                    "{} {}{}{}{}{}",
                    index_str, probability, separator, prediction, separator, label
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format batch predictions as tab-separated values for scripting
/// Columns: label, prediction, probability (no headers, no colors)
pub fn format_tsv(rows: &[LabeledPrediction]) -> String {
    rows.iter()
        .map(|row| {
            format!(
                "{}\t{}\t{}",
                row.label, row.response.prediction, row.response.probability
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn response(probability: f64) -> PredictionResponse {
        PredictionResponse {
            prediction: crate::scoring::classify(probability),
            probability,
            risk_score: probability * 100.0,
            model_version: "1.0.0".to_string(),
            model_name: "credit_risk_lr".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_format_probability() {
        assert_eq!(format_probability(0.5), "50.0%");
        assert_eq!(format_probability(0.01234), "1.2%");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(0.045), "4.50%");
        assert_eq!(format_rate(0.08), "8.00%");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(999.4), "$999");
        assert_eq!(format_currency(56250.0), "$56,250");
        assert_eq!(format_currency(1234567.0), "$1,234,567");
        assert_eq!(format_currency(-2500.0), "-$2,500");
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("short", 10), "short");
        assert_eq!(truncate_label("applicants/batch-2026.json", 10), "applica...");
    }

    #[test]
    fn test_format_prediction_plain() {
        let text = format_prediction(&response(0.25), false);
        assert!(text.starts_with("Prediction: low_risk"));
        assert!(text.contains("Probability: 25.0%"));
        assert!(text.contains("credit_risk_lr v1.0.0"));
    }

    #[test]
    fn test_batch_table_plain() {
        let low = response(0.2);
        let high = response(0.9);
        let rows = vec![
            LabeledPrediction {
                label: "alice.json".to_string(),
                response: &low,
            },
            LabeledPrediction {
                label: "bob.json".to_string(),
                response: &high,
            },
        ];
        let table = format_batch_table(&rows, false);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(" 1.  20.0%  low_risk"));
        assert!(lines[1].contains("high_risk"));
        assert!(lines[1].ends_with("bob.json"));
    }

    #[test]
    fn test_batch_table_empty() {
        assert_eq!(format_batch_table(&[], false), "No applicants scored.");
    }

    #[test]
    fn test_tsv() {
        let low = response(0.2);
        let rows = vec![LabeledPrediction {
            label: "alice.json".to_string(),
            response: &low,
        }];
        assert_eq!(format_tsv(&rows), "alice.json\tlow_risk\t0.2");
    }

    #[test]
    fn test_format_portfolio_honors_colors() {
        let empty: Vec<crate::scoring::ScoreResult> = Vec::new();
        let summary = crate::service::summarize(&empty);

        let plain = format_portfolio(&summary, false);
        assert!(!plain.contains('\u{1b}'));
        assert!(plain.contains("Risk distribution: 0% low, 0% medium, 0% high"));
        assert!(plain.contains("Portfolio value: $0"));

        let colored = format_portfolio(&summary, true);
        assert!(colored.contains('\u{1b}'));
    }
}
