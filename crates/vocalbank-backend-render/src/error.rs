//! Error types for the synthesis backend.

use std::path::PathBuf;

use thiserror::Error;
use vocalbank_spec::{ModelError, ScoreError, StageError};

use crate::vocoder::VocoderError;

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that stop a render before any frame is produced.
///
/// Unknown phonemes are not errors; they fall back to silence and are
/// reported as diagnostics.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The model was built on a different frame grid.
    #[error("model was built with a {model} ms frame period, render requested {requested} ms")]
    FramePeriodMismatch {
        /// Period recorded in the model.
        model: f64,
        /// Period requested for rendering.
        requested: f64,
    },

    /// The model is missing or invalid.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The score is invalid.
    #[error(transparent)]
    Score(#[from] ScoreError),

    /// A timeline violates the vocoder contract.
    #[error("malformed timeline: {message}")]
    MalformedTimeline {
        /// What is wrong.
        message: String,
    },

    /// The vocoder failed or returned unusable samples.
    #[error(transparent)]
    Vocoder(#[from] VocoderError),

    /// A parameter array could not be written or read.
    #[error("failed to access {path}: {message}")]
    Array {
        /// The file that failed.
        path: PathBuf,
        /// Underlying error.
        message: String,
    },

    /// WAV encoding error.
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// Creates a malformed timeline error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedTimeline {
            message: message.into(),
        }
    }

    pub(crate) fn array(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Array {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

impl StageError for RenderError {
    fn code(&self) -> &'static str {
        match self {
            RenderError::FramePeriodMismatch { .. } => "RENDER_001",
            RenderError::Model(e) => e.code(),
            RenderError::Score(e) => e.code(),
            RenderError::MalformedTimeline { .. } => "RENDER_002",
            RenderError::Vocoder(_) => "RENDER_003",
            RenderError::Array { .. } => "RENDER_004",
            RenderError::Wav(_) => "RENDER_005",
            RenderError::Io(_) => "RENDER_006",
        }
    }
}
