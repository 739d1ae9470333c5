pub mod artifact;
pub mod loader;
pub mod table;

pub use artifact::{
    load_coefficients, load_metadata, parse_coefficients, to_json, to_text, write_coefficients,
    write_coefficients_as, ArtifactError, ExportFormat, ModelMetadata,
};
pub use loader::{load_model, load_model_strict, LoadedModel, ModelHandle, ModelPaths, ModelSource};
pub use table::{CoefficientTable, INTERCEPT};
