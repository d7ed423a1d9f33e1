//! Frame-grid constants and time conversions shared by every stage.
//!
//! Training and synthesis must agree on [`FRAME_PERIOD_MS`]. A model records
//! the period it was built with, and rendering checks it.

use serde::{Deserialize, Serialize};

/// Analysis frame period in milliseconds.
pub const FRAME_PERIOD_MS: f64 = 5.0;

/// Extra frames appended to a rendered timeline to absorb tail rounding.
pub const GUARD_FRAMES: usize = 10;

/// FFT size used by the external spectral analysis.
pub const FFT_SIZE: usize = 1024;

/// Spectral bin count for [`FFT_SIZE`] (`fft_size / 2 + 1`).
pub const DEFAULT_BIN_COUNT: usize = FFT_SIZE / 2 + 1;

/// Sample rate handed to the vocoder.
pub const DEFAULT_SAMPLE_RATE: u32 = 22050;

/// Pitch used when rendering straight from a label file (middle C).
pub const DEFAULT_PITCH_HZ: f64 = 261.63;

/// Spectral value of the near-silent fallback vector.
pub const SILENCE_FALLBACK_SP: f64 = 0.001;

/// Aperiodicity value of the near-silent fallback vector.
pub const SILENCE_FALLBACK_AP: f64 = 0.0;

/// Ticks per second in label files produced by alignment tools (100 ns ticks).
pub const LAB_TICKS_PER_SECOND: u64 = 10_000_000;

/// Ticks per second written by the legacy score exporter (microsecond ticks).
pub const LEGACY_SCORE_TICKS_PER_SECOND: u64 = 1_000_000;

/// Returns the bin count for an FFT size.
pub fn bins_for_fft(fft_size: usize) -> usize {
    fft_size / 2 + 1
}

/// Maps a time in seconds to its frame index: `floor(t * 1000 / period)`.
///
/// Negative and non-finite times map to frame 0.
pub fn seconds_to_frame(seconds: f64, frame_period_ms: f64) -> usize {
    ms_to_frame(seconds * 1000.0, frame_period_ms)
}

/// Maps a time in milliseconds to its frame index: `floor(ms / period)`.
pub fn ms_to_frame(ms: f64, frame_period_ms: f64) -> usize {
    let frame = (ms / frame_period_ms).floor();
    if frame.is_finite() && frame > 0.0 {
        frame as usize
    } else {
        0
    }
}

/// Time unit of the integer start/end fields in a label file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickUnit {
    /// 100 ns ticks, as written by upstream alignment tools.
    #[default]
    HundredNanos,
    /// Microsecond ticks, as written by the legacy score exporter.
    Micros,
}

impl TickUnit {
    /// Ticks in one second.
    pub fn ticks_per_second(&self) -> u64 {
        match self {
            TickUnit::HundredNanos => LAB_TICKS_PER_SECOND,
            TickUnit::Micros => LEGACY_SCORE_TICKS_PER_SECOND,
        }
    }

    /// Ticks in one millisecond.
    pub fn ticks_per_ms(&self) -> f64 {
        self.ticks_per_second() as f64 / 1000.0
    }

    /// Converts a tick count to seconds.
    pub fn ticks_to_seconds(&self, ticks: i64) -> f64 {
        ticks as f64 / self.ticks_per_second() as f64
    }

    /// Converts milliseconds to the nearest tick count.
    pub fn ms_to_ticks(&self, ms: f64) -> i64 {
        (ms * self.ticks_per_ms()).round() as i64
    }

    /// Short name used on the command line ("100ns" or "us").
    pub fn as_str(&self) -> &'static str {
        match self {
            TickUnit::HundredNanos => "100ns",
            TickUnit::Micros => "us",
        }
    }
}

impl std::str::FromStr for TickUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "100ns" | "hundred_nanos" => Ok(TickUnit::HundredNanos),
            "us" | "micros" => Ok(TickUnit::Micros),
            other => Err(format!("unknown tick unit '{}' (expected 100ns or us)", other)),
        }
    }
}

impl std::fmt::Display for TickUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
