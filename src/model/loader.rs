use log::{info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use super::artifact::{load_coefficients, load_metadata, ArtifactError, ModelMetadata};
use super::table::CoefficientTable;
use crate::error::RiskError;

pub const DEFAULT_ARTIFACT_DIR: &str = "model_artifact";
pub const DEFAULT_COEFFICIENTS_FILE: &str = "model_coefficients.txt";
pub const DEFAULT_METADATA_FILE: &str = "model_metadata.json";

/// Where the coefficient and metadata artifacts live
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPaths {
    pub coefficients: PathBuf,
    pub metadata: PathBuf,
}

impl ModelPaths {
    /// Standard file names inside an artifact directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            coefficients: dir.join(DEFAULT_COEFFICIENTS_FILE),
            metadata: dir.join(DEFAULT_METADATA_FILE),
        }
    }
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self::in_dir(Path::new(DEFAULT_ARTIFACT_DIR))
    }
}

/// Where the active coefficient table came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSource {
    Artifact { coefficients: PathBuf },
    Fallback { reason: String },
}

/// A coefficient table together with its metadata and provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedModel {
    pub table: CoefficientTable,
    pub metadata: ModelMetadata,
    pub source: ModelSource,
}

impl LoadedModel {
    pub fn fallback(reason: impl Into<String>) -> Self {
        Self {
            table: CoefficientTable::fallback(),
            metadata: ModelMetadata::fallback(),
            source: ModelSource::Fallback {
                reason: reason.into(),
            },
        }
    }

    /// True when serving the fallback table instead of a real model
    pub fn is_degraded(&self) -> bool {
        matches!(self.source, ModelSource::Fallback { .. })
    }
}

/// Load both artifacts, failing on the first problem.
pub fn load_model_strict(paths: &ModelPaths) -> Result<LoadedModel, ArtifactError> {
    let table = load_coefficients(&paths.coefficients)?;
    let metadata = load_metadata(&paths.metadata)?;
    Ok(LoadedModel {
        table,
        metadata,
        source: ModelSource::Artifact {
            coefficients: paths.coefficients.clone(),
        },
    })
}

/// Load the model, substituting the fallback table when the artifacts are
/// missing or malformed. Never fails; check [`LoadedModel::is_degraded`].
pub fn load_model(paths: &ModelPaths) -> LoadedModel {
    match load_model_strict(paths) {
        Ok(model) => {
            info!(
                "Model '{}' v{} loaded with {} coefficients from {}",
                model.metadata.model_name,
                model.metadata.model_version,
                model.table.len(),
                paths.coefficients.display()
            );
            model
        }
        Err(e) => {
            warn!("Model artifacts unusable ({}); serving fallback model", e);
            LoadedModel::fallback(e.to_string())
        }
    }
}

/// Read-only handle to the process's model, initialized at most once.
///
/// Concurrent callers of [`ModelHandle::initialize`] race to a single load;
/// every caller observes the same table afterwards. Reloading means
/// building a new handle.
#[derive(Debug, Default)]
pub struct ModelHandle {
    cell: OnceLock<Arc<LoadedModel>>,
}

impl ModelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle that is already initialized with `model`.
    pub fn with_model(model: LoadedModel) -> Self {
        let handle = Self::new();
        handle.initialize_with(|| model);
        handle
    }

    /// Load from `paths` unless a model is already present.
    pub fn initialize(&self, paths: &ModelPaths) -> Arc<LoadedModel> {
        self.initialize_with(|| load_model(paths))
    }

    pub fn initialize_with<F>(&self, load: F) -> Arc<LoadedModel>
    where
        F: FnOnce() -> LoadedModel,
    {
        Arc::clone(self.cell.get_or_init(|| Arc::new(load())))
    }

    pub fn is_ready(&self) -> bool {
        self.cell.get().is_some()
    }

    /// The loaded model, or [`RiskError::NotReady`] before initialization.
    pub fn get(&self) -> Result<Arc<LoadedModel>, RiskError> {
        self.cell.get().cloned().ok_or(RiskError::NotReady)
    }
}
