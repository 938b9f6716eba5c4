//! Error types for artifact loading, input validation and prediction

use std::path::PathBuf;
use thiserror::Error;

/// Errors while establishing the artifact set
///
/// Cloneable so every caller waiting on one load attempt receives its outcome.
#[derive(Debug, Clone, Error)]
pub enum ArtifactError {
    #[error("Failed to read artifact '{key}' from {path:?}: {message}")]
    Io {
        key: &'static str,
        path: PathBuf,
        message: String,
    },
    #[error("Failed to parse artifact '{key}' from {path:?}: {message}")]
    Parse {
        key: &'static str,
        path: PathBuf,
        message: String,
    },
    #[error("Invalid scaler '{key}': {message}")]
    InvalidScaler { key: &'static str, message: String },
    #[error("Unsupported format for artifact '{key}': {path:?}")]
    UnsupportedFormat { key: &'static str, path: PathBuf },
    #[error("Checksum mismatch for artifact '{key}': expected {expected}, got {actual}")]
    ChecksumMismatch {
        key: &'static str,
        expected: String,
        actual: String,
    },
    #[error("Failed to load model '{key}': {message}")]
    Model { key: &'static str, message: String },
    #[error("Artifact loading unavailable: {0}")]
    Unavailable(String),
}

impl ArtifactError {
    /// Artifact key that failed, if the error is tied to one
    pub fn key(&self) -> Option<&'static str> {
        match self {
            ArtifactError::Io { key, .. }
            | ArtifactError::Parse { key, .. }
            | ArtifactError::InvalidScaler { key, .. }
            | ArtifactError::UnsupportedFormat { key, .. }
            | ArtifactError::ChecksumMismatch { key, .. }
            | ArtifactError::Model { key, .. } => Some(*key),
            ArtifactError::Unavailable(_) => None,
        }
    }
}

/// Numeric inputs outside what the form allows
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("Age {0} is outside the accepted range 18-65")]
    AgeOutOfRange(u32),
    #[error("Experience {0} is outside the accepted range 0.0-40.0 years")]
    ExperienceOutOfRange(f64),
    #[error("Experience {0} is not a multiple of 0.5 years")]
    ExperienceStep(f64),
    #[error(transparent)]
    UnknownModel(#[from] crate::catalog::UnknownModel),
}

/// Errors surfaced for a single prediction request
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("Artifacts unavailable: {0}")]
    ArtifactsUnavailable(#[from] ArtifactError),
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InputError),
    #[error("{model} failed: {message}")]
    ModelInvocation { model: String, message: String },
}

impl PredictionError {
    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            PredictionError::ArtifactsUnavailable(_) => "artifacts_unavailable",
            PredictionError::InvalidInput(_) => "invalid_input",
            PredictionError::ModelInvocation { .. } => "model_invocation",
        }
    }
}
