//! Error types for the training backend.

use std::path::PathBuf;

use thiserror::Error;
use vocalbank_spec::{ModelError, StageError};

/// Result type for training operations.
pub type TrainResult<T> = Result<T, TrainError>;

/// Errors that stop a training run.
///
/// Problems with a single utterance are not errors; they exclude the
/// utterance and are reported as diagnostics.
#[derive(Debug, Error)]
pub enum TrainError {
    /// The feature cache directory does not exist.
    #[error("feature directory not found: {path}")]
    MissingFeatureDir {
        /// Expected directory.
        path: PathBuf,
    },

    /// A feature file could not be read.
    #[error("failed to read {path}: {message}")]
    ReadFeature {
        /// The file that failed.
        path: PathBuf,
        /// Underlying error.
        message: String,
    },

    /// A feature file could not be written.
    #[error("failed to write {path}: {message}")]
    WriteFeature {
        /// The file that failed.
        path: PathBuf,
        /// Underlying error.
        message: String,
    },

    /// Model persistence failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrainError {
    pub(crate) fn read(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::ReadFeature {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::WriteFeature {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

impl StageError for TrainError {
    fn code(&self) -> &'static str {
        match self {
            TrainError::MissingFeatureDir { .. } => "TRAIN_001",
            TrainError::ReadFeature { .. } => "TRAIN_002",
            TrainError::WriteFeature { .. } => "TRAIN_003",
            TrainError::Model(e) => e.code(),
            TrainError::Io(_) => "TRAIN_004",
        }
    }
}
