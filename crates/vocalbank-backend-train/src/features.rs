//! Per-utterance acoustic features.

use ndarray::{Array1, Array2, ArrayView1};
use vocalbank_spec::FrameLabels;

/// Frame-level analysis output for one utterance.
///
/// `f0` has one value per frame; `sp` and `ap` have one row of `B` bins per
/// frame. Produced by the external analysis stage.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    /// Utterance base name.
    pub name: String,
    /// Fundamental frequency per frame, in Hz.
    pub f0: Array1<f64>,
    /// Spectral envelope, `[frames, bins]`.
    pub sp: Array2<f64>,
    /// Aperiodicity, `[frames, bins]`.
    pub ap: Array2<f64>,
}

impl FeatureSet {
    /// Creates a feature set.
    pub fn new(name: impl Into<String>, f0: Array1<f64>, sp: Array2<f64>, ap: Array2<f64>) -> Self {
        Self {
            name: name.into(),
            f0,
            sp,
            ap,
        }
    }

    /// Frame count, taken from the spectral envelope.
    pub fn frame_count(&self) -> usize {
        self.sp.nrows()
    }

    /// Spectral bin count.
    pub fn bins(&self) -> usize {
        self.sp.ncols()
    }

    /// Spectral envelope of one frame.
    pub fn sp_row(&self, frame: usize) -> ArrayView1<'_, f64> {
        self.sp.row(frame)
    }

    /// Aperiodicity of one frame.
    pub fn ap_row(&self, frame: usize) -> ArrayView1<'_, f64> {
        self.ap.row(frame)
    }

    /// Describes why the three arrays disagree, or `None` if they share a
    /// frame count and `sp`/`ap` share a bin count.
    pub fn shape_mismatch(&self) -> Option<String> {
        let frames = self.frame_count();
        if self.ap.nrows() != frames || self.f0.len() != frames {
            return Some(format!(
                "feature frame counts differ (f0 {}, sp {}, ap {})",
                self.f0.len(),
                frames,
                self.ap.nrows()
            ));
        }
        if self.ap.ncols() != self.sp.ncols() {
            return Some(format!(
                "sp has {} bins but ap has {}",
                self.sp.ncols(),
                self.ap.ncols()
            ));
        }
        None
    }

    /// Describes the first NaN or infinite value in `sp` or `ap`, if any.
    pub fn non_finite_value(&self) -> Option<String> {
        for (name, array) in [("sp", &self.sp), ("ap", &self.ap)] {
            let found = array.indexed_iter().find(|(_, v)| !v.is_finite());
            if let Some(((frame, bin), value)) = found {
                return Some(format!("{} holds {} at frame {}, bin {}", name, value, frame, bin));
            }
        }
        None
    }
}

/// A feature set paired with its per-frame phoneme labels.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledUtterance {
    /// Acoustic features.
    pub features: FeatureSet,
    /// Per-frame labels from the aligner.
    pub labels: FrameLabels,
}

impl LabeledUtterance {
    /// Pairs features with labels.
    pub fn new(features: FeatureSet, labels: FrameLabels) -> Self {
        Self { features, labels }
    }

    /// Utterance name.
    pub fn name(&self) -> &str {
        &self.features.name
    }

    /// Bin count if this utterance passes the per-utterance admission checks
    /// and has at least one frame.
    pub(crate) fn admissible_bins(&self) -> Option<usize> {
        let ok = self.features.shape_mismatch().is_none()
            && self.labels.len() == self.features.frame_count()
            && self.features.non_finite_value().is_none()
            && self.features.frame_count() > 0;
        ok.then(|| self.features.bins())
    }
}
