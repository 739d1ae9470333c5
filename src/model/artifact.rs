use atomic_write_file::AtomicWriteFile;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::table::{CoefficientTable, INTERCEPT};

/// Errors raised while reading or writing model artifacts.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Model artifact not found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read or write model artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed coefficient on line {line}: expected 'name,value', got '{content}'")]
    MalformedLine { line: usize, content: String },

    #[error("Invalid coefficient value for '{name}' on line {line}: '{value}'")]
    InvalidValue {
        line: usize,
        name: String,
        value: String,
    },

    #[error("Failed to parse JSON artifact: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Coefficient '{0}' is not a finite number")]
    NonFinite(String),

    #[error("Coefficient table is empty")]
    Empty,
}

/// Model metadata as exported alongside the coefficients.
///
/// Only `model_name` is mandatory; any additional keys (training date,
/// performance figures, SLA notes) are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_name: String,

    #[serde(default = "unknown_version")]
    pub model_version: String,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn unknown_version() -> String {
    "N/A".to_string()
}

impl ModelMetadata {
    pub fn new(model_name: impl Into<String>, model_version: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            model_version: model_version.into(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn fallback() -> Self {
        Self::new("Fallback Model", unknown_version())
    }
}

/// JSON coefficient export: `{"coefficients": {...}, "intercept": ...}`.
/// Extra keys such as `model_type` or `performance` are ignored.
#[derive(Debug, Serialize, Deserialize)]
struct JsonCoefficients {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    intercept: Option<f64>,
    coefficients: IndexMap<String, f64>,
}

/// Parse a coefficient artifact, detecting the format from its content.
///
/// A document starting with `{` is read as JSON; anything else as
/// newline-delimited `name,value` pairs where blank lines and `#` comments
/// are skipped.
pub fn parse_coefficients(content: &str) -> Result<CoefficientTable, ArtifactError> {
    let table = if content.trim_start().starts_with('{') {
        parse_json_coefficients(content)?
    } else {
        parse_text_coefficients(content)?
    };

    if table.is_empty() {
        return Err(ArtifactError::Empty);
    }
    if let Some((name, _)) = table.iter().find(|(_, weight)| !weight.is_finite()) {
        return Err(ArtifactError::NonFinite(name.to_string()));
    }
    Ok(table)
}

fn parse_text_coefficients(content: &str) -> Result<CoefficientTable, ArtifactError> {
    let mut entries = Vec::new();
    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (name, value) = line
            .split_once(',')
            .filter(|(name, _)| !name.trim().is_empty())
            .ok_or_else(|| ArtifactError::MalformedLine {
                line: idx + 1,
                content: line.to_string(),
            })?;
        let name = name.trim();
        let value = value.trim();
        let weight: f64 = value.parse().map_err(|_| ArtifactError::InvalidValue {
            line: idx + 1,
            name: name.to_string(),
            value: value.to_string(),
        })?;
        entries.push((name.to_string(), weight));
    }
    Ok(entries.into_iter().collect())
}

fn parse_json_coefficients(content: &str) -> Result<CoefficientTable, ArtifactError> {
    let parsed: JsonCoefficients = serde_json::from_str(content)?;
    // A top-level intercept takes precedence over one inside the map
    Ok(match parsed.intercept {
        Some(intercept) => std::iter::once((INTERCEPT.to_string(), intercept))
            .chain(
                parsed
                    .coefficients
                    .into_iter()
                    .filter(|(name, _)| name != INTERCEPT),
            )
            .collect(),
        None => parsed.coefficients.into_iter().collect(),
    })
}

/// Serialize a table as `name,value` lines, one entry per line.
pub fn to_text(table: &CoefficientTable) -> String {
    table
        .iter()
        .map(|(name, weight)| format!("{},{}\n", name, weight))
        .collect()
}

/// Serialize a table in the JSON export layout.
pub fn to_json(table: &CoefficientTable) -> Result<String, ArtifactError> {
    let export = JsonCoefficients {
        intercept: table.get(INTERCEPT),
        coefficients: table
            .weights()
            .map(|(name, weight)| (name.to_string(), weight))
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

fn read_artifact(path: &Path) -> Result<String, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a coefficient table from disk
pub fn load_coefficients(path: &Path) -> Result<CoefficientTable, ArtifactError> {
    parse_coefficients(&read_artifact(path)?)
}

/// Load model metadata JSON from disk
pub fn load_metadata(path: &Path) -> Result<ModelMetadata, ArtifactError> {
    Ok(serde_json::from_str(&read_artifact(path)?)?)
}

/// On-disk layout for exported coefficient tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Text,
    Json,
}

/// Write a coefficient table atomically in text (`name,value`) format.
///
/// The destination is never left half-written: the content goes to a
/// temporary file that replaces the target on commit.
pub fn write_coefficients(path: &Path, table: &CoefficientTable) -> Result<(), ArtifactError> {
    write_coefficients_as(path, table, ExportFormat::Text)
}

pub fn write_coefficients_as(
    path: &Path,
    table: &CoefficientTable,
    format: ExportFormat,
) -> Result<(), ArtifactError> {
    let content = match format {
        ExportFormat::Text => to_text(table),
        ExportFormat::Json => to_json(table)?,
    };

    let io_err = |source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = AtomicWriteFile::open(path).map_err(io_err)?;
    file.write_all(content.as_bytes()).map_err(io_err)?;
    file.commit().map_err(io_err)?;
    Ok(())
}
