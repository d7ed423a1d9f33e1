//! Build reports.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use vocalbank_spec::{Diagnostic, WarningCode};

/// Summary of a model build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildReport {
    /// Bin count of the model.
    pub bins: usize,
    /// Utterances that contributed frames, sorted by name.
    pub admitted: Vec<String>,
    /// Utterances that were excluded, sorted by name.
    pub excluded: Vec<String>,
    /// Frames averaged per phoneme.
    pub phoneme_frames: BTreeMap<String, usize>,
    /// Frames in the silence statistics (breath included when pooled).
    pub silence_frames: usize,
    /// Frames in separate breath statistics.
    pub breath_frames: usize,
    /// Whether the silence vectors are the fallback constants.
    pub silence_is_fallback: bool,
    /// Every diagnostic raised while loading and building.
    pub warnings: Vec<Diagnostic>,
}

impl BuildReport {
    /// Number of diagnostics with the given code.
    pub fn count(&self, code: WarningCode) -> usize {
        self.warnings.iter().filter(|w| w.code == code).count()
    }

    /// True if no diagnostics were raised.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}
