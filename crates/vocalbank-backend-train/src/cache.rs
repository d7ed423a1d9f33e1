//! Feature cache directories.
//!
//! The analysis stage leaves one group of sibling files per utterance, sharing
//! a base name:
//!
//! - `<base>_f0.npy`: 1-D f64 F0 track
//! - `<base>_sp.npy`: 2-D f64 spectral envelope, `[frames, bins]`
//! - `<base>_ap.npy`: 2-D f64 aperiodicity, `[frames, bins]`
//! - `<base>_ph.json`: JSON array of per-frame phoneme labels
//!
//! Utterances are discovered through their label file. A missing or unreadable
//! sibling skips that utterance with a [`WarningCode::MissingFeatureFile`]
//! diagnostic; it never fails the whole run.

use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2};
use ndarray_npy::{read_npy, write_npy};
use vocalbank_spec::{Diagnostic, FrameLabels, WarningCode};
use walkdir::WalkDir;

use crate::error::{TrainError, TrainResult};
use crate::features::{FeatureSet, LabeledUtterance};

/// Suffix of per-frame label files.
pub const LABELS_SUFFIX: &str = "_ph.json";
/// Suffix of F0 arrays.
pub const F0_SUFFIX: &str = "_f0.npy";
/// Suffix of spectral envelope arrays.
pub const SP_SUFFIX: &str = "_sp.npy";
/// Suffix of aperiodicity arrays.
pub const AP_SUFFIX: &str = "_ap.npy";

/// Path of one sibling file.
pub fn sibling_path(dir: &Path, base: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{}{}", base, suffix))
}

/// Utterances loaded from a cache directory.
#[derive(Debug, Clone, Default)]
pub struct CacheLoad {
    /// Fully loaded utterances, sorted by name.
    pub utterances: Vec<LabeledUtterance>,
    /// Base names that could not be loaded.
    pub skipped: Vec<String>,
    /// One diagnostic per skipped utterance.
    pub warnings: Vec<Diagnostic>,
}

/// Lists utterance base names (those with a label file), sorted.
pub fn list_utterances(dir: &Path) -> TrainResult<Vec<String>> {
    if !dir.is_dir() {
        return Err(TrainError::MissingFeatureDir {
            path: dir.to_path_buf(),
        });
    }

    let mut bases = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| TrainError::read(dir, e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if let Some(base) = name.strip_suffix(LABELS_SUFFIX) {
            if !base.is_empty() {
                bases.push(base.to_string());
            }
        }
    }
    bases.sort();
    Ok(bases)
}

/// Reads per-frame labels.
pub fn read_frame_labels(path: &Path) -> TrainResult<FrameLabels> {
    let text = std::fs::read_to_string(path).map_err(|e| TrainError::read(path, e))?;
    serde_json::from_str(&text).map_err(|e| TrainError::read(path, e))
}

/// Writes per-frame labels.
pub fn write_frame_labels(path: &Path, labels: &FrameLabels) -> TrainResult<()> {
    let json = serde_json::to_string(labels).map_err(|e| TrainError::write(path, e))?;
    std::fs::write(path, json).map_err(|e| TrainError::write(path, e))
}

fn read_array1(path: &Path) -> TrainResult<Array1<f64>> {
    read_npy(path).map_err(|e| TrainError::read(path, e))
}

fn read_array2(path: &Path) -> TrainResult<Array2<f64>> {
    read_npy(path).map_err(|e| TrainError::read(path, e))
}

/// Loads one utterance. Any missing or unreadable sibling is an error.
pub fn load_utterance(dir: &Path, base: &str) -> TrainResult<LabeledUtterance> {
    let labels = read_frame_labels(&sibling_path(dir, base, LABELS_SUFFIX))?;
    let f0 = read_array1(&sibling_path(dir, base, F0_SUFFIX))?;
    let sp = read_array2(&sibling_path(dir, base, SP_SUFFIX))?;
    let ap = read_array2(&sibling_path(dir, base, AP_SUFFIX))?;
    Ok(LabeledUtterance::new(FeatureSet::new(base, f0, sp, ap), labels))
}

/// Loads every utterance in a cache directory.
///
/// Fails only when the directory itself is missing or unreadable.
pub fn load_feature_dir(dir: &Path) -> TrainResult<CacheLoad> {
    let mut out = CacheLoad::default();
    for base in list_utterances(dir)? {
        match load_utterance(dir, &base) {
            Ok(utterance) => {
                tracing::debug!(utterance = %base, frames = utterance.features.frame_count(), "loaded");
                out.utterances.push(utterance);
            }
            Err(err) => {
                out.warnings.push(Diagnostic::with_context(
                    WarningCode::MissingFeatureFile,
                    err.to_string(),
                    base.clone(),
                ));
                out.skipped.push(base);
            }
        }
    }
    Ok(out)
}

/// Writes an utterance in cache layout under `dir`.
pub fn write_utterance(dir: &Path, utterance: &LabeledUtterance) -> TrainResult<()> {
    std::fs::create_dir_all(dir).map_err(|e| TrainError::write(dir, e))?;
    let base = utterance.name();
    let features = &utterance.features;

    let f0_path = sibling_path(dir, base, F0_SUFFIX);
    write_npy(&f0_path, &features.f0).map_err(|e| TrainError::write(&f0_path, e))?;
    let sp_path = sibling_path(dir, base, SP_SUFFIX);
    write_npy(&sp_path, &features.sp).map_err(|e| TrainError::write(&sp_path, e))?;
    let ap_path = sibling_path(dir, base, AP_SUFFIX);
    write_npy(&ap_path, &features.ap).map_err(|e| TrainError::write(&ap_path, e))?;
    write_frame_labels(&sibling_path(dir, base, LABELS_SUFFIX), &utterance.labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use pretty_assertions::assert_eq;

    fn sample(name: &str) -> LabeledUtterance {
        LabeledUtterance::new(
            FeatureSet::new(
                name,
                array![0.0, 220.0],
                array![[1.0, 2.0], [3.0, 4.0]],
                array![[0.5, 0.5], [0.25, 0.75]],
            ),
            FrameLabels::from(vec!["SP".to_string(), "a".to_string()]),
        )
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let utterance = sample("take1");
        write_utterance(dir.path(), &utterance).unwrap();
        let loaded = load_utterance(dir.path(), "take1").unwrap();
        assert_eq!(loaded, utterance);
    }

    #[test]
    fn test_list_is_sorted_and_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        write_utterance(dir.path(), &sample("b")).unwrap();
        write_utterance(dir.path(), &sample("a")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        assert_eq!(list_utterances(dir.path()).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_missing_sibling_skips_utterance() {
        let dir = tempfile::tempdir().unwrap();
        write_utterance(dir.path(), &sample("good")).unwrap();
        write_utterance(dir.path(), &sample("broken")).unwrap();
        std::fs::remove_file(sibling_path(dir.path(), "broken", AP_SUFFIX)).unwrap();

        let loaded = load_feature_dir(dir.path()).unwrap();
        assert_eq!(loaded.utterances.len(), 1);
        assert_eq!(loaded.utterances[0].name(), "good");
        assert_eq!(loaded.skipped, vec!["broken".to_string()]);
        assert_eq!(loaded.warnings[0].code, WarningCode::MissingFeatureFile);
    }

    #[test]
    fn test_missing_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_feature_dir(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, TrainError::MissingFeatureDir { .. }));
    }
}
