pub mod formatter;

pub use formatter::{
    format_advisory, format_assessment, format_batch_table, format_breakdown, format_currency,
    format_health, format_model_info, format_portfolio, format_prediction, format_probability,
    format_rate, format_tsv, resolve_colors, should_use_colors, LabeledPrediction,
};
