//! Synthetic corpora.
//!
//! Every phoneme gets a constant spectral level, so the means a model build
//! should produce are known exactly.

use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2};
use ndarray_npy::write_npy;
use vocalbank_spec::{normalize, FrameLabels};

/// Spectral level written for frames carrying `label` (after normalization).
pub fn phoneme_level(label: &str) -> f64 {
    match normalize(label) {
        "SP" => 0.01,
        "AP" => 0.02,
        "a" => 1.0,
        "e" => 2.0,
        "o" => 3.0,
        _ => 0.5,
    }
}

/// One recorded take: its raw label file and frame count.
#[derive(Debug, Clone)]
pub struct CorpusTake {
    /// Base name.
    pub name: &'static str,
    /// Label text in 100 ns ticks, with unnormalized spellings.
    pub lab: &'static str,
    /// Analysis frames.
    pub frames: usize,
}

/// A small corpus on disk: raw labels under `labs/`, features under `cache/`.
#[derive(Debug)]
pub struct Corpus {
    /// Root directory.
    pub root: PathBuf,
    /// Takes in the corpus.
    pub takes: Vec<CorpusTake>,
}

impl Corpus {
    /// Default takes: silence, breath, and three vowels.
    pub fn takes() -> Vec<CorpusTake> {
        vec![
            CorpusTake {
                name: "take1",
                lab: "0 1000000 sil\n1000000 3000000 a\n3000000 4000000 pau\n",
                frames: 80,
            },
            CorpusTake {
                name: "take2",
                lab: "0 500000 br\n500000 2500000 e\n2500000 4000000 o\n",
                frames: 80,
            },
        ]
    }

    /// Writes the raw label files under `root/labs`.
    pub fn write_labs(root: &Path) -> Corpus {
        let takes = Self::takes();
        let labs = root.join("labs");
        std::fs::create_dir_all(&labs).expect("create labs dir");
        for take in &takes {
            std::fs::write(labs.join(format!("{}.lab", take.name)), take.lab).expect("write lab");
        }
        Corpus {
            root: root.to_path_buf(),
            takes,
        }
    }

    /// Label directory.
    pub fn labs(&self) -> PathBuf {
        self.root.join("labs")
    }

    /// Feature cache directory.
    pub fn cache(&self) -> PathBuf {
        self.root.join("cache")
    }
}

/// Writes `<name>_f0/_sp/_ap.npy` whose frames follow the per-frame labels.
///
/// Unlabeled frames get level 0.
pub fn write_features(dir: &Path, name: &str, labels: &FrameLabels, bins: usize) {
    let frames = labels.len();
    let level = |i: usize| labels.get(i).map_or(0.0, phoneme_level);
    let f0 = Array1::from_shape_fn(frames, |i| if level(i) >= 1.0 { 200.0 } else { 0.0 });
    let sp = Array2::from_shape_fn((frames, bins), |(i, _)| level(i));
    let ap = Array2::from_shape_fn((frames, bins), |(i, _)| level(i) / 10.0);

    std::fs::create_dir_all(dir).expect("create cache dir");
    write_npy(dir.join(format!("{}_f0.npy", name)), &f0).expect("write f0");
    write_npy(dir.join(format!("{}_sp.npy", name)), &sp).expect("write sp");
    write_npy(dir.join(format!("{}_ap.npy", name)), &ap).expect("write ap");
}
