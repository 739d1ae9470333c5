use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use credit_risk::features::{expand_patterns, parse_record_strict, read_applicants};
use credit_risk::model::{write_coefficients_as, ArtifactError, ExportFormat, ModelPaths};
use credit_risk::{output, FeatureRecord, RiskError, RiskService};
use log::{debug, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

const EXIT_SUCCESS: i32 = 0;
const EXIT_VALIDATION: i32 = 1;
const EXIT_INPUT: i32 = 2;
const EXIT_NOT_READY: i32 = 3;
const EXIT_CONFIG: i32 = 4;
const EXIT_OUTPUT: i32 = 5;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score one applicant with the coefficient model
    Predict {
        /// Applicant JSON file (`-` reads stdin)
        input: PathBuf,
    },
    /// Score every applicant in the files matching the given patterns
    Batch {
        /// File paths or glob patterns (e.g. "applicants/*.json")
        #[arg(required = true)]
        patterns: Vec<String>,

        /// Tab-separated output for scripting
        #[arg(long)]
        tsv: bool,
    },
    /// Full heuristic assessment with segment, pricing and improvement plan
    Assess {
        /// Applicant JSON file (`-` reads stdin)
        input: PathBuf,

        /// Show the per-factor logit breakdown
        #[arg(short, long)]
        detailed: bool,
    },
    /// Remediation advice with a reapplication date
    Advise {
        /// Applicant JSON file (`-` reads stdin)
        input: PathBuf,

        /// Date the plan starts from (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Aggregate heuristic assessments over a set of applicants
    Portfolio {
        /// File paths or glob patterns
        #[arg(required = true)]
        patterns: Vec<String>,
    },
    /// Report whether a model is loaded and whether it is the fallback
    Health,
    /// Show the loaded model's metadata and coefficient names
    ModelInfo,
    /// Write the loaded coefficient table to a file
    Export {
        /// Destination file, replaced atomically
        destination: PathBuf,

        #[arg(long, value_enum, default_value_t = ExportArg::Text)]
        format: ExportArg,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ExportArg {
    Text,
    Json,
}

impl From<ExportArg> for ExportFormat {
    fn from(arg: ExportArg) -> Self {
        match arg {
            ExportArg::Text => ExportFormat::Text,
            ExportArg::Json => ExportFormat::Json,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "credit-risk")]
#[command(about = "Credit-risk scoring CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/credit-risk/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Directory holding model_coefficients.txt and model_metadata.json
    /// (overrides the config file)
    #[arg(long, global = true)]
    model_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// `--verbose` lowers the default filter to debug; RUST_LOG still wins.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn risk_exit_code(err: &RiskError) -> i32 {
    match err {
        RiskError::Validation(_) => EXIT_VALIDATION,
        RiskError::NotReady => EXIT_NOT_READY,
        RiskError::Configuration(_) => EXIT_CONFIG,
    }
}

/// Exporting only fails while rendering or writing the destination file.
fn export_exit_code(err: &ArtifactError) -> i32 {
    match err {
        ArtifactError::Io { .. } | ArtifactError::Json(_) => EXIT_OUTPUT,
        _ => EXIT_CONFIG,
    }
}

fn exit_with_risk_error(err: RiskError) -> ! {
    let code = risk_exit_code(&err);
    match err {
        RiskError::Validation(errors) => {
            eprintln!("Invalid applicant data:");
            for error in errors {
                eprintln!("  - {}", error);
            }
        }
        RiskError::NotReady => eprintln!("{}", RiskError::NotReady),
        RiskError::Configuration(e) => eprintln!("Model configuration error: {}", e),
    }
    std::process::exit(code);
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Output error: failed to serialize JSON: {}", e);
            std::process::exit(EXIT_OUTPUT);
        }
    }
}

/// Read and validate every applicant in one file.
fn load_records(path: &Path) -> Vec<FeatureRecord> {
    let values = match read_applicants(path) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Input error: {:#}", e);
            std::process::exit(EXIT_INPUT);
        }
    };

    values
        .into_iter()
        .map(|value| parse_record_strict(value).unwrap_or_else(|e| exit_with_risk_error(e)))
        .collect()
}

/// Read a file that must hold exactly one applicant.
fn load_single(path: &Path) -> FeatureRecord {
    let mut records = load_records(path);
    if records.len() != 1 {
        exit_with_risk_error(RiskError::validation(format!(
            "expected a single applicant in {}, found {} (use `batch` for several)",
            path.display(),
            records.len()
        )));
    }
    records.remove(0)
}

/// Expand patterns and load every applicant, labelled by file (and position
/// when a file holds several).
fn load_labeled(patterns: &[String]) -> Vec<(String, FeatureRecord)> {
    let paths = match expand_patterns(patterns) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Input error: {:#}", e);
            std::process::exit(EXIT_INPUT);
        }
    };

    let mut labeled = Vec::new();
    for path in paths {
        let records = load_records(&path);
        let multiple = records.len() > 1;
        debug!("Read {} applicants from {}", records.len(), path.display());
        for (idx, record) in records.into_iter().enumerate() {
            let label = if multiple {
                format!("{}#{}", path.display(), idx + 1)
            } else {
                path.display().to_string()
            };
            labeled.push((label, record));
        }
    }
    labeled
}

#[derive(Serialize)]
struct LabeledResponse<'a, T> {
    source: &'a str,
    #[serde(flatten)]
    result: &'a T,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let start_time = Instant::now();

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match credit_risk::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate config at startup
    if let Err(errors) = credit_risk::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let paths = match &cli.model_dir {
        Some(dir) => ModelPaths::in_dir(dir),
        None => config.model.paths(),
    };
    debug!(
        "Model artifacts: {} / {}",
        paths.coefficients.display(),
        paths.metadata.display()
    );

    let service = RiskService::start(&paths);
    let use_colors = output::resolve_colors(config.output.color);

    match cli.command {
        Commands::Predict { input } => {
            let record = load_single(&input);
            let response = service
                .predict(&record)
                .unwrap_or_else(|e| exit_with_risk_error(e));
            if cli.json {
                print_json(&response);
            } else {
                println!("{}", output::format_prediction(&response, use_colors));
            }
        }
        Commands::Batch { patterns, tsv } => {
            let labeled = load_labeled(&patterns);
            let (labels, records): (Vec<String>, Vec<FeatureRecord>) =
                labeled.into_iter().unzip();
            let responses = service
                .predict_batch(&records)
                .unwrap_or_else(|e| exit_with_risk_error(e));

            if cli.json {
                let rows: Vec<_> = labels
                    .iter()
                    .zip(&responses)
                    .map(|(label, response)| LabeledResponse {
                        source: label,
                        result: response,
                    })
                    .collect();
                print_json(&rows);
            } else {
                let rows: Vec<output::LabeledPrediction> = labels
                    .into_iter()
                    .zip(&responses)
                    .map(|(label, response)| output::LabeledPrediction { label, response })
                    .collect();
                if tsv {
                    println!("{}", output::format_tsv(&rows));
                } else {
                    println!("{}", output::format_batch_table(&rows, use_colors));
                }
            }
            debug!(
                "Scored {} applicants in {:?}",
                responses.len(),
                start_time.elapsed()
            );
        }
        Commands::Assess { input, detailed } => {
            let record = load_single(&input);
            let assessment = service
                .assess_comprehensive(&record)
                .unwrap_or_else(|e| exit_with_risk_error(e));
            if cli.json {
                print_json(&assessment);
            } else {
                println!(
                    "{}",
                    output::format_assessment(&assessment, use_colors, detailed || cli.verbose)
                );
            }
        }
        Commands::Advise { input, as_of } => {
            let record = load_single(&input);
            let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
            let plan = service
                .advise(&record, as_of)
                .unwrap_or_else(|e| exit_with_risk_error(e));
            if cli.json {
                print_json(&plan);
            } else {
                println!("{}", output::format_advisory(&plan, use_colors));
            }
        }
        Commands::Portfolio { patterns } => {
            let records: Vec<FeatureRecord> = load_labeled(&patterns)
                .into_iter()
                .map(|(_, record)| record)
                .collect();
            let summary = service
                .portfolio(&records)
                .unwrap_or_else(|e| exit_with_risk_error(e));
            if cli.json {
                print_json(&summary);
            } else {
                println!("{}", output::format_portfolio(&summary, use_colors));
            }
        }
        Commands::Health => {
            let report = service.health();
            if cli.json {
                print_json(&report);
            } else {
                println!("{}", output::format_health(&report, use_colors));
            }
            if !report.model_ready {
                std::process::exit(EXIT_NOT_READY);
            }
        }
        Commands::ModelInfo => {
            let model_info = service
                .model_info()
                .unwrap_or_else(|e| exit_with_risk_error(e));
            if cli.json {
                print_json(&model_info);
            } else {
                println!("{}", output::format_model_info(&model_info, use_colors));
            }
        }
        Commands::Export {
            destination,
            format,
        } => {
            let model = service
                .model()
                .get()
                .unwrap_or_else(|e| exit_with_risk_error(e));
            if model.is_degraded() {
                warn!("Exporting the fallback coefficient table");
            }
            if let Err(e) = write_coefficients_as(&destination, &model.table, format.into()) {
                eprintln!("Output error: {}", e);
                std::process::exit(export_exit_code(&e));
            }
            info!("Wrote {} coefficients", model.table.len());
            println!(
                "Exported {} coefficients to {}",
                model.table.len(),
                destination.display()
            );
        }
    }

    std::process::exit(EXIT_SUCCESS);
}
