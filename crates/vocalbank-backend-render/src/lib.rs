//! vocalbank synthesis backend.
//!
//! Turns a [`Score`](vocalbank_spec::Score) or a label file into frame-level
//! vocoder parameters using a trained
//! [`AcousticModel`](vocalbank_spec::AcousticModel).
//!
//! # Rendering
//!
//! [`render_score`] walks score entries with a millisecond cursor and
//! [`render_labels`] walks label segments with a constant pitch. Both produce a
//! [`SynthesisTimeline`] on the model's frame grid, padded with unvoiced guard
//! frames, plus diagnostics for phonemes the model does not know.
//!
//! # Output
//!
//! A timeline can be handed to any [`Vocoder`] through [`vocode_to_wav`], or
//! exported as `.npy` arrays with [`write_timeline_npy`] for an external one.
//!
//! # Example
//!
//! ```
//! use vocalbank_backend_render::{render_score, RenderOptions};
//! use vocalbank_spec::{AcousticModel, Score, ScoreEntry};
//!
//! let model = AcousticModel::silence_fallback(4);
//! let score = Score::new(vec![ScoreEntry::new("SP", 50.0, 0.0)]);
//! let out = render_score(&score, &model, &RenderOptions::default()).unwrap();
//! assert_eq!(out.timeline.frame_count(), 20);
//! ```

pub mod error;
pub mod export;
pub mod render;
pub mod timeline;
pub mod vocoder;

pub use error::{RenderError, RenderResult};
pub use export::{read_timeline_npy, write_timeline_npy, TimelineFiles};
pub use render::{render_labels, render_score, LabelRenderOptions, RenderOptions, RenderOutcome};
pub use timeline::SynthesisTimeline;
pub use vocoder::{sample_to_pcm16, vocode_to_wav, Vocoder, VocoderError, WavSummary};
