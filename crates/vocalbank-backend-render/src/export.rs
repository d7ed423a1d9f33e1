//! Timeline export for external vocoders.
//!
//! A timeline is written as three `.npy` arrays sharing a stem:
//! `<stem>_f0.npy` (1-D), `<stem>_sp.npy` and `<stem>_ap.npy` (`[frames, bins]`),
//! all f64, matching the analysis cache layout.

use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2};
use ndarray_npy::{read_npy, write_npy};

use crate::error::{RenderError, RenderResult};
use crate::timeline::SynthesisTimeline;

/// Paths written by [`write_timeline_npy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineFiles {
    /// F0 array.
    pub f0: PathBuf,
    /// Spectral envelope array.
    pub sp: PathBuf,
    /// Aperiodicity array.
    pub ap: PathBuf,
}

impl TimelineFiles {
    /// Paths for `stem` under `dir`.
    pub fn for_stem(dir: &Path, stem: &str) -> Self {
        Self {
            f0: dir.join(format!("{}_f0.npy", stem)),
            sp: dir.join(format!("{}_sp.npy", stem)),
            ap: dir.join(format!("{}_ap.npy", stem)),
        }
    }
}

/// Writes a timeline as `.npy` arrays. The timeline must be well formed.
pub fn write_timeline_npy(
    dir: &Path,
    stem: &str,
    timeline: &SynthesisTimeline,
) -> RenderResult<TimelineFiles> {
    timeline.check_well_formed()?;
    std::fs::create_dir_all(dir)?;

    let files = TimelineFiles::for_stem(dir, stem);
    write_npy(&files.f0, &timeline.f0).map_err(|e| RenderError::array(&files.f0, e))?;
    write_npy(&files.sp, &timeline.sp).map_err(|e| RenderError::array(&files.sp, e))?;
    write_npy(&files.ap, &timeline.ap).map_err(|e| RenderError::array(&files.ap, e))?;

    tracing::debug!(dir = %dir.display(), stem, frames = timeline.frame_count(), "timeline exported");
    Ok(files)
}

/// Reads a timeline written by [`write_timeline_npy`].
pub fn read_timeline_npy(
    dir: &Path,
    stem: &str,
    frame_period_ms: f64,
) -> RenderResult<SynthesisTimeline> {
    let files = TimelineFiles::for_stem(dir, stem);
    let f0: Array1<f64> = read_npy(&files.f0).map_err(|e| RenderError::array(&files.f0, e))?;
    let sp: Array2<f64> = read_npy(&files.sp).map_err(|e| RenderError::array(&files.sp, e))?;
    let ap: Array2<f64> = read_npy(&files.ap).map_err(|e| RenderError::array(&files.ap, e))?;

    let timeline = SynthesisTimeline {
        f0,
        sp,
        ap,
        frame_period_ms,
    };
    timeline.check_well_formed()?;
    Ok(timeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vocalbank_spec::PhonemeStats;

    #[test]
    fn test_export_writes_three_arrays() {
        let dir = tempfile::tempdir().unwrap();
        let mut timeline = SynthesisTimeline::zeros(6, 3, 5.0);
        timeline.fill(0, 3, 220.0, &PhonemeStats::new(vec![1.0; 3], vec![0.5; 3], 1));

        let files = write_timeline_npy(dir.path(), "song", &timeline).unwrap();
        assert!(files.f0.ends_with("song_f0.npy"));
        assert!(files.sp.is_file() && files.ap.is_file());

        let back = read_timeline_npy(dir.path(), "song", 5.0).unwrap();
        assert_eq!(back, timeline);
    }

    #[test]
    fn test_export_refuses_malformed_timeline() {
        let dir = tempfile::tempdir().unwrap();
        let mut timeline = SynthesisTimeline::zeros(2, 2, 5.0);
        timeline.ap[[0, 0]] = f64::NAN;
        assert!(write_timeline_npy(dir.path(), "bad", &timeline).is_err());
        assert!(!dir.path().join("bad_f0.npy").exists());
    }

    #[test]
    fn test_missing_arrays_fail_to_read() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_timeline_npy(dir.path(), "none", 5.0).unwrap_err();
        assert!(matches!(err, RenderError::Array { .. }));
    }
}
