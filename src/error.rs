use thiserror::Error;

/// Errors surfaced by the scoring service.
#[derive(Error, Debug)]
pub enum RiskError {
    /// A coefficient or metadata source is missing or malformed.
    #[error("Model configuration error: {0}")]
    Configuration(#[from] crate::model::ArtifactError),

    /// The feature record is incomplete or carries invalid values.
    #[error("Validation error: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Scoring was attempted before a coefficient table was available.
    #[error("Model not ready for predictions")]
    NotReady,
}

impl RiskError {
    pub fn validation(message: impl Into<String>) -> Self {
        RiskError::Validation(vec![message.into()])
    }
}
