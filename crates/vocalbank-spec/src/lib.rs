//! vocalbank shared types
//!
//! This crate holds everything the training and synthesis backends agree on:
//! the frame grid, phoneme normalization, the label file format, label-to-frame
//! alignment, synthesis scores, the acoustic model artifact, and configuration.
//!
//! # Example
//!
//! ```
//! use vocalbank_spec::{align, parse_label_text, TickUnit, FRAME_PERIOD_MS};
//!
//! let parsed = parse_label_text("0 100000 SP\n100000 300000 a\n", TickUnit::HundredNanos);
//! let alignment = align(&parsed.segments, 6, FRAME_PERIOD_MS);
//! let frames: Vec<&str> = alignment.frames.iter().collect();
//! assert_eq!(frames, vec!["SP", "SP", "a", "a", "a", "a"]);
//! ```
//!
//! # Modules
//!
//! - [`align`]: label segments to per-frame labels
//! - [`config`]: pipeline configuration
//! - [`error`]: diagnostics and error types
//! - [`label`]: label file parsing, writing, and normalization
//! - [`model`]: the acoustic model artifact
//! - [`phoneme`]: silence/breath normalization
//! - [`score`]: synthesis scores
//! - [`timing`]: frame-grid constants and conversions

pub mod align;
pub mod config;
pub mod error;
pub mod label;
pub mod model;
pub mod phoneme;
pub mod score;
pub mod timing;

// Re-export commonly used types at the crate root
pub use align::{align, Alignment, FrameLabels};
pub use config::PipelineConfig;
pub use error::{
    ConfigError, Diagnostic, LabelError, ModelError, ScoreError, StageError, WarningCode,
};
pub use label::{
    load_label_file, normalize_label_text, parse_label_text, write_label_text, LabelParse,
    NormalizedText, PhonemeSegment,
};
pub use model::{AcousticModel, PhonemeStats, Resolution, MODEL_VERSION};
pub use phoneme::{is_silence_or_breath, normalize, PhonemeClass, BREATH, SILENCE};
pub use score::{Score, ScoreEntry};
pub use timing::{
    ms_to_frame, seconds_to_frame, TickUnit, DEFAULT_BIN_COUNT, DEFAULT_PITCH_HZ,
    DEFAULT_SAMPLE_RATE, FFT_SIZE, FRAME_PERIOD_MS, GUARD_FRAMES, LAB_TICKS_PER_SECOND,
    LEGACY_SCORE_TICKS_PER_SECOND,
};
