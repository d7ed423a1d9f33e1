//! The acoustic model artifact.
//!
//! A model maps every phoneme seen in training to its mean spectral envelope
//! and mean aperiodicity, and carries pooled statistics for silence (and, when
//! built unmerged, breath). It is built once, persisted as a single JSON
//! document, and read-only afterwards.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::phoneme::PhonemeClass;
use crate::timing::{FRAME_PERIOD_MS, SILENCE_FALLBACK_AP, SILENCE_FALLBACK_SP};

/// Current model artifact version.
pub const MODEL_VERSION: u32 = 1;

/// Mean vectors for one phoneme class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhonemeStats {
    /// Elementwise mean spectral envelope.
    pub sp_mean: Vec<f64>,
    /// Elementwise mean aperiodicity.
    pub ap_mean: Vec<f64>,
    /// Number of frames averaged.
    pub frames: usize,
}

impl PhonemeStats {
    /// Creates stats from mean vectors.
    pub fn new(sp_mean: Vec<f64>, ap_mean: Vec<f64>, frames: usize) -> Self {
        Self {
            sp_mean,
            ap_mean,
            frames,
        }
    }

    /// Near-silent constant vectors used when training saw no silence.
    pub fn silence_fallback(bins: usize) -> Self {
        Self {
            sp_mean: vec![SILENCE_FALLBACK_SP; bins],
            ap_mean: vec![SILENCE_FALLBACK_AP; bins],
            frames: 0,
        }
    }

    fn check(&self, name: &str, bins: usize) -> Result<(), ModelError> {
        for (kind, vector) in [("sp_mean", &self.sp_mean), ("ap_mean", &self.ap_mean)] {
            if vector.len() != bins {
                return Err(ModelError::invalid(format!(
                    "'{}' {} has {} bins, model has {}",
                    name,
                    kind,
                    vector.len(),
                    bins
                )));
            }
            if let Some(pos) = vector.iter().position(|v| !v.is_finite()) {
                return Err(ModelError::invalid(format!(
                    "'{}' {} has a non-finite value at bin {}",
                    name, kind, pos
                )));
            }
        }
        Ok(())
    }
}

/// How a score or label phoneme maps onto model vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution<'a> {
    /// A trained phoneme.
    Phoneme(&'a PhonemeStats),
    /// Silence (or an empty label).
    Silence(&'a PhonemeStats),
    /// Breath. Uses the silence vectors when breath was pooled with silence.
    Breath(&'a PhonemeStats),
    /// A phoneme the model has never seen; carries the silence vectors.
    Unknown(&'a PhonemeStats),
}

impl<'a> Resolution<'a> {
    /// The vectors to render.
    pub fn stats(&self) -> &'a PhonemeStats {
        match *self {
            Resolution::Phoneme(s)
            | Resolution::Silence(s)
            | Resolution::Breath(s)
            | Resolution::Unknown(s) => s,
        }
    }

    /// True only for trained phonemes; everything else is rendered unvoiced.
    pub fn is_voiced(&self) -> bool {
        matches!(self, Resolution::Phoneme(_))
    }
}

/// Per-phoneme acoustic model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcousticModel {
    /// Artifact version.
    pub version: u32,
    /// Spectral bin count shared by every vector.
    pub bins: usize,
    /// Frame period the training data was aligned with.
    pub frame_period_ms: f64,
    /// Whether breath frames were pooled into the silence statistics.
    pub merge_silence_and_breath: bool,
    /// Trained phonemes.
    pub phonemes: BTreeMap<String, PhonemeStats>,
    /// Pooled silence statistics.
    pub silence: PhonemeStats,
    /// Separate breath statistics (unmerged builds that saw breath only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breath: Option<PhonemeStats>,
    /// True when `silence` holds fallback constants rather than trained means.
    #[serde(default)]
    pub silence_is_fallback: bool,
}

impl AcousticModel {
    /// Creates an empty model whose silence vectors are the fallback constants.
    pub fn silence_fallback(bins: usize) -> Self {
        Self {
            version: MODEL_VERSION,
            bins,
            frame_period_ms: FRAME_PERIOD_MS,
            merge_silence_and_breath: true,
            phonemes: BTreeMap::new(),
            silence: PhonemeStats::silence_fallback(bins),
            breath: None,
            silence_is_fallback: true,
        }
    }

    /// Spectral width of the model, taken from the silence vectors.
    pub fn bin_count(&self) -> usize {
        self.silence.sp_mean.len()
    }

    /// Stats for a trained phoneme.
    pub fn get(&self, phoneme: &str) -> Option<&PhonemeStats> {
        self.phonemes.get(phoneme)
    }

    /// True if the phoneme was trained.
    pub fn contains(&self, phoneme: &str) -> bool {
        self.phonemes.contains_key(phoneme)
    }

    /// Resolves a phoneme to the vectors used for rendering.
    ///
    /// Silence and breath spellings (normalized) and the empty string resolve
    /// to the pooled statistics. Phonemes absent from the model resolve to
    /// [`Resolution::Unknown`], carrying the silence vectors.
    pub fn resolve(&self, phoneme: &str) -> Resolution<'_> {
        match PhonemeClass::of(phoneme) {
            PhonemeClass::Silence => Resolution::Silence(&self.silence),
            PhonemeClass::Breath => {
                Resolution::Breath(self.breath.as_ref().unwrap_or(&self.silence))
            }
            PhonemeClass::Phonetic => match self.phonemes.get(phoneme) {
                Some(stats) => Resolution::Phoneme(stats),
                None => Resolution::Unknown(&self.silence),
            },
        }
    }

    /// Checks vector lengths, finiteness, and the frame period.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.bins == 0 {
            return Err(ModelError::invalid("bin count must be positive"));
        }
        if !(self.frame_period_ms.is_finite() && self.frame_period_ms > 0.0) {
            return Err(ModelError::invalid(format!(
                "frame period must be positive, got {}",
                self.frame_period_ms
            )));
        }
        self.silence.check("silence", self.bins)?;
        if let Some(ref breath) = self.breath {
            breath.check("breath", self.bins)?;
        }
        for (name, stats) in &self.phonemes {
            stats.check(name, self.bins)?;
        }
        Ok(())
    }

    /// Serializes the model as JSON.
    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses and validates a model from JSON.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let model: AcousticModel = serde_json::from_str(json)?;
        if model.version != MODEL_VERSION {
            return Err(ModelError::UnsupportedVersion {
                expected: MODEL_VERSION,
                found: model.version,
            });
        }
        model.validate()?;
        Ok(model)
    }

    /// BLAKE3 hash of the serialized model (hex), for provenance in reports.
    pub fn content_hash(&self) -> Result<String, ModelError> {
        Ok(blake3::hash(self.to_json()?.as_bytes()).to_hex().to_string())
    }

    /// Writes the model to `path`, replacing any previous model atomically.
    ///
    /// The JSON goes to a temporary file in the destination directory first and
    /// is renamed over the target only once fully written, so a failed save
    /// never leaves a partial model behind.
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        self.validate()?;
        let json = self.to_json()?;

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| ModelError::Io(e.error))?;

        tracing::info!(
            path = %path.display(),
            phonemes = self.phonemes.len(),
            bins = self.bins,
            "acoustic model saved"
        );
        Ok(())
    }

    /// Loads and validates a model.
    ///
    /// A missing file is [`ModelError::MissingArtifact`]; callers must not
    /// start rendering without a model.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        if !path.is_file() {
            return Err(ModelError::MissingArtifact {
                path: path.to_path_buf(),
            });
        }
        let json = std::fs::read_to_string(path)?;
        let model = Self::from_json(&json)?;
        tracing::debug!(
            path = %path.display(),
            phonemes = model.phonemes.len(),
            "acoustic model loaded"
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_model() -> AcousticModel {
        let mut model = AcousticModel::silence_fallback(3);
        model.silence = PhonemeStats::new(vec![0.1, 0.2, 0.3], vec![0.9, 0.8, 0.7], 4);
        model.silence_is_fallback = false;
        model.phonemes.insert(
            "a".to_string(),
            PhonemeStats::new(
                vec![1.0 / 3.0, 2.0e-12, 1.7976931348623157e308],
                vec![0.1 + 0.2, 0.0, 5e-324],
                2,
            ),
        );
        model
    }

    #[test]
    fn test_fallback_vectors() {
        let model = AcousticModel::silence_fallback(513);
        assert_eq!(model.bin_count(), 513);
        assert!(model.silence.sp_mean.iter().all(|&v| v == 0.001));
        assert!(model.silence.ap_mean.iter().all(|&v| v == 0.0));
        assert!(model.silence_is_fallback);
    }

    #[test]
    fn test_resolve() {
        let model = sample_model();
        assert!(matches!(model.resolve("a"), Resolution::Phoneme(_)));
        assert!(matches!(model.resolve("SP"), Resolution::Silence(_)));
        assert!(matches!(model.resolve("sil"), Resolution::Silence(_)));
        assert!(matches!(model.resolve(""), Resolution::Silence(_)));
        assert!(matches!(model.resolve("zz"), Resolution::Unknown(_)));

        // Breath falls back to silence vectors when pooled.
        let breath = model.resolve("AP");
        assert!(matches!(breath, Resolution::Breath(_)));
        assert_eq!(breath.stats(), &model.silence);
        assert!(!breath.is_voiced());
        assert_eq!(model.resolve("zz").stats(), &model.silence);
    }

    #[test]
    fn test_resolve_separate_breath() {
        let mut model = sample_model();
        let breath = PhonemeStats::new(vec![0.5; 3], vec![0.5; 3], 1);
        model.breath = Some(breath.clone());
        assert_eq!(model.resolve("br").stats(), &breath);
    }

    #[test]
    fn test_json_round_trip_is_bit_exact() {
        let model = sample_model();
        let json = model.to_json().unwrap();
        let back = AcousticModel::from_json(&json).unwrap();
        let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(
            bits(&back.phonemes["a"].sp_mean),
            bits(&model.phonemes["a"].sp_mean)
        );
        assert_eq!(
            bits(&back.phonemes["a"].ap_mean),
            bits(&model.phonemes["a"].ap_mean)
        );
        assert_eq!(back, model);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("bank.json");
        let model = sample_model();
        model.save(&path).unwrap();
        let loaded = AcousticModel::load(&path).unwrap();
        assert_eq!(loaded, model);
        assert_eq!(loaded.content_hash().unwrap(), model.content_hash().unwrap());
    }

    #[test]
    fn test_save_overwrites_previous_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.json");
        sample_model().save(&path).unwrap();
        let replacement = AcousticModel::silence_fallback(3);
        replacement.save(&path).unwrap();
        assert_eq!(AcousticModel::load(&path).unwrap(), replacement);
        // Only the model remains; no temporary files are left behind.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_load_missing_is_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let err = AcousticModel::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ModelError::MissingArtifact { .. }));
    }

    #[test]
    fn test_validate_rejects_ragged_vectors() {
        let mut model = sample_model();
        model
            .phonemes
            .insert("b".into(), PhonemeStats::new(vec![1.0; 2], vec![1.0; 3], 1));
        let err = model.validate().unwrap_err();
        assert!(err.to_string().contains("'b'"));
    }

    #[test]
    fn test_unsupported_version() {
        let mut model = sample_model();
        model.version = 99;
        let json = serde_json::to_string(&model).unwrap();
        assert!(matches!(
            AcousticModel::from_json(&json),
            Err(ModelError::UnsupportedVersion { found: 99, .. })
        ));
    }
}
