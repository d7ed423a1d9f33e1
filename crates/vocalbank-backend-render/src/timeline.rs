//! Frame-level vocoder parameters.

use ndarray::{s, Array1, Array2, ArrayView1};
use vocalbank_spec::PhonemeStats;

use crate::error::{RenderError, RenderResult};

/// F0, spectral envelope, and aperiodicity for every frame of a render.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisTimeline {
    /// F0 per frame in Hz; 0 is unvoiced.
    pub f0: Array1<f64>,
    /// Spectral envelope, `[frames, bins]`.
    pub sp: Array2<f64>,
    /// Aperiodicity, `[frames, bins]`.
    pub ap: Array2<f64>,
    /// Frame period the timeline was rendered on.
    pub frame_period_ms: f64,
}

impl SynthesisTimeline {
    /// Zero-filled timeline.
    pub fn zeros(frames: usize, bins: usize, frame_period_ms: f64) -> Self {
        Self {
            f0: Array1::zeros(frames),
            sp: Array2::zeros((frames, bins)),
            ap: Array2::zeros((frames, bins)),
            frame_period_ms,
        }
    }

    /// Number of frames.
    pub fn frame_count(&self) -> usize {
        self.f0.len()
    }

    /// Spectral bin count.
    pub fn bins(&self) -> usize {
        self.sp.ncols()
    }

    /// Duration in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        self.frame_count() as f64 * self.frame_period_ms
    }

    /// Spectral envelope of one frame.
    pub fn sp_row(&self, frame: usize) -> ArrayView1<'_, f64> {
        self.sp.row(frame)
    }

    /// Aperiodicity of one frame.
    pub fn ap_row(&self, frame: usize) -> ArrayView1<'_, f64> {
        self.ap.row(frame)
    }

    /// Writes `pitch` and the given vectors into frames `[start, end)`.
    ///
    /// `end` is clamped to the frame count; an empty range writes nothing.
    /// `stats` must have [`Self::bins`] bins.
    pub fn fill(&mut self, start: usize, end: usize, pitch_hz: f64, stats: &PhonemeStats) {
        let end = end.min(self.frame_count());
        if start >= end {
            return;
        }
        self.f0.slice_mut(s![start..end]).fill(pitch_hz);
        self.sp
            .slice_mut(s![start..end, ..])
            .assign(&ArrayView1::from(stats.sp_mean.as_slice()));
        self.ap
            .slice_mut(s![start..end, ..])
            .assign(&ArrayView1::from(stats.ap_mean.as_slice()));
    }

    /// Checks the vocoder contract: equal frame counts, equal bin counts, and
    /// no NaN or infinite values.
    pub fn check_well_formed(&self) -> RenderResult<()> {
        let frames = self.frame_count();
        if self.sp.nrows() != frames || self.ap.nrows() != frames {
            return Err(RenderError::malformed(format!(
                "frame counts differ (f0 {}, sp {}, ap {})",
                frames,
                self.sp.nrows(),
                self.ap.nrows()
            )));
        }
        if self.sp.ncols() != self.ap.ncols() {
            return Err(RenderError::malformed(format!(
                "sp has {} bins but ap has {}",
                self.sp.ncols(),
                self.ap.ncols()
            )));
        }
        let finite = self.f0.iter().all(|v| v.is_finite())
            && self.sp.iter().all(|v| v.is_finite())
            && self.ap.iter().all(|v| v.is_finite());
        if !finite {
            return Err(RenderError::malformed("timeline contains non-finite values"));
        }
        Ok(())
    }
}
