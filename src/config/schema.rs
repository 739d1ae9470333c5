use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::model::ModelPaths;

/// Application configuration.
///
/// Example YAML:
/// ```yaml
/// model:
///   coefficients_path: model_artifact/model_coefficients.txt
///   metadata_path: model_artifact/model_metadata.json
/// output:
///   color: auto
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Model artifact locations. Relative paths resolve against the working
/// directory.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    #[serde(default = "default_coefficients_path")]
    pub coefficients_path: PathBuf,

    #[serde(default = "default_metadata_path")]
    pub metadata_path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            coefficients_path: default_coefficients_path(),
            metadata_path: default_metadata_path(),
        }
    }
}

impl ModelConfig {
    pub fn paths(&self) -> ModelPaths {
        ModelPaths {
            coefficients: self.coefficients_path.clone(),
            metadata: self.metadata_path.clone(),
        }
    }
}

fn default_coefficients_path() -> PathBuf {
    ModelPaths::default().coefficients
}

fn default_metadata_path() -> PathBuf {
    ModelPaths::default().metadata
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub color: ColorMode,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(
            config.model.coefficients_path,
            PathBuf::from("model_artifact/model_coefficients.txt")
        );
        assert_eq!(config.output.color, ColorMode::Auto);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config::default();
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_config_parse() {
        let yaml = r#"
model:
  coefficients_path: /srv/models/coefficients.json
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(
            config.model.coefficients_path,
            PathBuf::from("/srv/models/coefficients.json")
        );
        assert_eq!(
            config.model.metadata_path,
            PathBuf::from("model_artifact/model_metadata.json")
        );
        assert_eq!(config.output.color, ColorMode::Auto);
    }

    #[test]
    fn test_color_mode_parse() {
        let yaml = r#"
output:
  color: never
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.output.color, ColorMode::Never);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let yaml = r#"
model:
  coefficient_path: typo.txt
"#;
        assert!(serde_saphyr::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn test_empty_config_parse() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }
}
