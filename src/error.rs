//! Error types for the packaging pipeline

use crate::process::ProcessError;
use std::path::PathBuf;
use thiserror::Error;

/// A fatal error raised by a stage, or a configuration problem before any stage runs
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("failed to {op} {}: {source}", path.display())]
    Staging {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed build artifact {}: {source}", path.display())]
    Artifact {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

impl BuildError {
    pub(crate) fn staging(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Staging {
            op,
            path: path.into(),
            source,
        }
    }
}

/// The stage that aborted a run, and why
#[derive(Debug, Error)]
#[error("{stage}: {error}")]
pub struct StageFailure {
    /// Description of the failed stage
    pub stage: String,
    #[source]
    pub error: BuildError,
}

impl StageFailure {
    pub fn new(stage: impl Into<String>, error: BuildError) -> Self {
        Self {
            stage: stage.into(),
            error,
        }
    }

    /// Process exit code for this failure; never zero
    pub fn exit_code(&self) -> i32 {
        1
    }
}
