//! vocalbank End-to-End Test Infrastructure
//!
//! This crate exercises the pipeline across crate boundaries:
//!
//! - Labels: raw `.lab` files -> normalized labels -> per-frame labels
//! - Training: feature cache -> acoustic model on disk
//! - Synthesis: score or labels -> vocoder parameter arrays
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p vocalbank-tests
//! ```

pub mod fixtures;

pub use fixtures::{phoneme_level, write_features, Corpus, CorpusTake};
