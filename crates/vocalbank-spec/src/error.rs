//! Error and diagnostic types shared by every vocalbank stage.
//!
//! Recoverable conditions never abort a run. They are recorded as
//! [`Diagnostic`] values (and emitted as `tracing` warnings) while the stage
//! carries on with a sane default. Only conditions that make the requested
//! output impossible are returned as errors.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Warning codes for recoverable conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCode {
    /// W001: label line without exactly three tokens or with bad tick fields
    MalformedLabelLine,
    /// W002: segment shorter than one frame period, no frames written
    SegmentTooShort,
    /// W003: utterance frame counts disagree, utterance excluded
    UtteranceLengthMismatch,
    /// W004: phoneme absent from the model, silence vectors used
    UnknownPhoneme,
    /// W005: no silence/breath frames in the corpus, fallback vectors used
    EmptyTrainingCorpus,
    /// W006: a sibling feature file is missing or unreadable
    MissingFeatureFile,
    /// W007: spectral bin count differs from the rest of the corpus
    BinCountMismatch,
    /// W008: NaN or infinite spectral or aperiodicity value, utterance excluded
    NonFiniteFeature,
}

impl WarningCode {
    /// Returns the warning code string (e.g., "W001").
    pub fn code(&self) -> &'static str {
        match self {
            WarningCode::MalformedLabelLine => "W001",
            WarningCode::SegmentTooShort => "W002",
            WarningCode::UtteranceLengthMismatch => "W003",
            WarningCode::UnknownPhoneme => "W004",
            WarningCode::EmptyTrainingCorpus => "W005",
            WarningCode::MissingFeatureFile => "W006",
            WarningCode::BinCountMismatch => "W007",
            WarningCode::NonFiniteFeature => "W008",
        }
    }
}

impl std::fmt::Display for WarningCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A recoverable condition with code, message, and optional context
/// (file name, utterance name, score index).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The warning code.
    pub code: WarningCode,
    /// Human-readable message.
    pub message: String,
    /// Where the condition was observed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Diagnostic {
    /// Creates a new diagnostic and emits it as a `tracing` warning.
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        let diag = Self {
            code,
            message: message.into(),
            context: None,
        };
        diag.emit();
        diag
    }

    /// Creates a new diagnostic with context and emits it as a `tracing` warning.
    pub fn with_context(
        code: WarningCode,
        message: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        let diag = Self {
            code,
            message: message.into(),
            context: Some(context.into()),
        };
        diag.emit();
        diag
    }

    fn emit(&self) {
        match self.context {
            Some(ref ctx) => tracing::warn!(code = %self.code, context = %ctx, "{}", self.message),
            None => tracing::warn!(code = %self.code, "{}", self.message),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref ctx) = self.context {
            write!(f, "{}: {} (at {})", self.code, self.message, ctx)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

/// Errors raised while reading label files.
#[derive(Debug, Error)]
pub enum LabelError {
    /// I/O error.
    #[error("failed to read label file {path}: {source}")]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by score validation and parsing.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// A duration or pitch is negative or not finite.
    #[error("score entry {index} ('{phoneme}'): {message}")]
    InvalidEntry {
        /// Position in the score.
        index: usize,
        /// Phoneme of the offending entry.
        phoneme: String,
        /// What is wrong with it.
        message: String,
    },

    /// JSON parsing error.
    #[error("score JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while persisting or loading the acoustic model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// No model at the given path. Rendering cannot proceed.
    #[error("acoustic model not found at {path}; build a model first")]
    MissingArtifact {
        /// Expected model location.
        path: PathBuf,
    },

    /// The model violates its invariants.
    #[error("invalid acoustic model: {message}")]
    Invalid {
        /// What is wrong.
        message: String,
    },

    /// The model was written by an incompatible version.
    #[error("unsupported model version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version this library reads.
        expected: u32,
        /// Version found in the artifact.
        found: u32,
    },

    /// JSON (de)serialization error.
    #[error("model JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ModelError {
    /// Creates an invalid model error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field has an unusable value.
    #[error("invalid config field '{field}': {message}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// What is wrong.
        message: String,
    },

    /// JSON parsing error.
    #[error("config JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait implemented by every hard error so callers can report stable codes.
pub trait StageError: std::error::Error {
    /// Returns the stable error code (e.g., "MODEL_001").
    fn code(&self) -> &'static str;
}

impl StageError for LabelError {
    fn code(&self) -> &'static str {
        match self {
            LabelError::Io { .. } => "LABEL_001",
        }
    }
}

impl StageError for ScoreError {
    fn code(&self) -> &'static str {
        match self {
            ScoreError::InvalidEntry { .. } => "SCORE_001",
            ScoreError::JsonParse(_) => "SCORE_002",
            ScoreError::Io(_) => "SCORE_003",
        }
    }
}

impl StageError for ModelError {
    fn code(&self) -> &'static str {
        match self {
            ModelError::MissingArtifact { .. } => "MODEL_001",
            ModelError::Invalid { .. } => "MODEL_002",
            ModelError::UnsupportedVersion { .. } => "MODEL_003",
            ModelError::Json(_) => "MODEL_004",
            ModelError::Io(_) => "MODEL_005",
        }
    }
}

impl StageError for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            ConfigError::InvalidField { .. } => "CONFIG_001",
            ConfigError::JsonParse(_) => "CONFIG_002",
            ConfigError::Io(_) => "CONFIG_003",
        }
    }
}
