mod schema;

pub use schema::{ColorMode, Config, ModelConfig, OutputConfig};

use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::PathBuf;

/// Get the config directory path (~/.config/credit-risk/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("credit-risk"))
}

/// Get the default config file path (~/.config/credit-risk/config.yaml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.yaml"))
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses the default path
///   (~/.config/credit-risk/config.yaml), and a missing default file yields
///   the built-in defaults.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let (config_path, explicit) = match path {
        Some(p) => (p, true),
        None => (get_config_path()?, false),
    };

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        debug!(
            "No config at {}; using built-in defaults",
            config_path.display()
        );
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!(
            "Failed to parse config: invalid YAML in {}",
            config_path.display()
        )
    })?;

    Ok(config)
}

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.model.coefficients_path.as_os_str().is_empty() {
        errors.push("model.coefficients_path: must not be empty".to_string());
    }
    if config.model.metadata_path.as_os_str().is_empty() {
        errors.push("model.metadata_path: must not be empty".to_string());
    }
    if !config.model.coefficients_path.as_os_str().is_empty()
        && config.model.coefficients_path == config.model.metadata_path
    {
        errors.push(format!(
            "model.metadata_path: must differ from model.coefficients_path ({})",
            config.model.metadata_path.display()
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
