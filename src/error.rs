//! Error handling
//!
//! One error type for the whole pipeline. Load-time problems (missing or
//! malformed artifacts) are fatal and abort pipeline construction;
//! per-request problems (unparseable envelope, empty URL) fail only the
//! call that carried them. Decoding anomalies inside the e-mail normalizer
//! are not errors at all and degrade to partial text.

use std::path::PathBuf;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug)]
pub enum PipelineError {
    // Load-time errors (fatal)
    MissingArtifact { path: PathBuf },
    InvalidArtifact { path: PathBuf, reason: String },

    // Per-request errors
    InvalidInput(String),

    // Model invocation errors
    ModelUnavailable(String),
    Inference(String),
}

impl PipelineError {
    /// True for errors that should abort startup rather than fail one call
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PipelineError::MissingArtifact { .. } | PipelineError::InvalidArtifact { .. }
        )
    }

    pub(crate) fn invalid_artifact(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        PipelineError::InvalidArtifact {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::MissingArtifact { path } => {
                write!(f, "Missing model artifact: {}", path.display())
            }
            PipelineError::InvalidArtifact { path, reason } => {
                write!(f, "Invalid model artifact {}: {}", path.display(), reason)
            }
            PipelineError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            PipelineError::ModelUnavailable(msg) => write!(f, "Model unavailable: {}", msg),
            PipelineError::Inference(msg) => write!(f, "Inference error: {}", msg),
        }
    }
}

impl std::error::Error for PipelineError {}
