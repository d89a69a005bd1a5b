use thiserror::Error;

/// Engine-level error type.
///
/// Only `InvalidInput` and the artifact errors for the vectorizer ever reach
/// the caller of the inference entry points; every per-model failure is
/// recovered locally and surfaces as a degraded ensemble method tag instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Artifact missing: {0}")]
    ArtifactMissing(String),

    #[error("Artifact unreadable: {name}: {detail}")]
    ArtifactUnreadable { name: String, detail: String },

    #[error("Label codec mismatch: expected the {expected} required roles, found {found:?}")]
    LabelSetMismatch { expected: usize, found: Vec<String> },

    #[error("Training error: {0}")]
    Training(String),

    #[error("Dataset error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
