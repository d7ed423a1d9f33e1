//! vocalbank Training Backend
//!
//! Builds the per-phoneme acoustic model from frame-aligned analysis data.
//!
//! # Overview
//!
//! Every admitted utterance contributes its spectral envelope and aperiodicity
//! rows to the class named by its per-frame label. The model stores the
//! elementwise mean of each class. Silence and breath frames go to one pooled
//! bucket by default, or to two buckets when
//! [`BuildOptions::merge_silence_and_breath`] is off.
//!
//! Nothing in a build is fatal except an unreadable cache directory: bad
//! utterances are excluded whole and reported, and a corpus without silence
//! falls back to near-silent constant vectors.
//!
//! # Example
//!
//! ```ignore
//! use vocalbank_backend_train::{build_from_feature_dir, BuildOptions};
//!
//! let outcome = build_from_feature_dir(Path::new("data/features"), &BuildOptions::default(), true)?;
//! outcome.model.save(Path::new("models/bank.json"))?;
//! ```
//!
//! # Crate Structure
//!
//! - [`accumulator`] - running sums, admission, merge
//! - [`build`] - sequential and parallel build entry points
//! - [`cache`] - feature cache directory layout
//! - [`features`] - per-utterance feature arrays
//! - [`report`] - build reports

pub mod accumulator;
pub mod build;
pub mod cache;
pub mod error;
pub mod features;
pub mod report;

// Re-export main types at crate root
pub use accumulator::{BuildOptions, ModelAccumulator};
pub use build::{build_from_feature_dir, build_model, build_model_parallel, BuildOutcome};
pub use cache::{load_feature_dir, load_utterance, write_utterance, CacheLoad};
pub use error::{TrainError, TrainResult};
pub use features::{FeatureSet, LabeledUtterance};
pub use report::BuildReport;
