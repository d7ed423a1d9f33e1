//! Vocoder boundary and WAV output.
//!
//! No vocoder ships with this crate. A [`Vocoder`] turns a well-formed
//! [`SynthesisTimeline`] into mono samples in `[-1, 1]`; [`vocode_to_wav`]
//! checks both sides of that contract and writes 16-bit PCM with `hound`.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::error::{RenderError, RenderResult};
use crate::timeline::SynthesisTimeline;

/// Errors reported by a vocoder implementation.
#[derive(Debug, Error)]
pub enum VocoderError {
    /// The vocoder failed internally.
    #[error("vocoder failed: {0}")]
    Failed(String),

    /// The vocoder produced no samples.
    #[error("vocoder produced no samples")]
    EmptyOutput,

    /// The vocoder produced NaN or infinite samples.
    #[error("vocoder produced a non-finite sample at index {index}")]
    NonFiniteSample {
        /// First offending sample.
        index: usize,
    },
}

/// Synthesizes a waveform from frame-level parameters.
pub trait Vocoder {
    /// Returns mono samples at `sample_rate`.
    fn synthesize(
        &self,
        timeline: &SynthesisTimeline,
        sample_rate: u32,
    ) -> Result<Vec<f64>, VocoderError>;
}

/// A written WAV file.
#[derive(Debug, Clone, PartialEq)]
pub struct WavSummary {
    /// Where the file was written.
    pub path: PathBuf,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of samples.
    pub num_samples: usize,
    /// BLAKE3 hash of the little-endian PCM data.
    pub pcm_hash: String,
}

impl WavSummary {
    /// Duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.num_samples as f64 / self.sample_rate as f64
    }
}

/// Converts a sample to 16-bit PCM, clipping to `[-1, 1]`.
pub fn sample_to_pcm16(sample: f64) -> i16 {
    (sample.clamp(-1.0, 1.0) * 32767.0).round() as i16
}

/// Runs `vocoder` over `timeline` and writes a mono 16-bit WAV to `path`.
pub fn vocode_to_wav<V: Vocoder + ?Sized>(
    vocoder: &V,
    timeline: &SynthesisTimeline,
    sample_rate: u32,
    path: &Path,
) -> RenderResult<WavSummary> {
    timeline.check_well_formed()?;
    if sample_rate == 0 {
        return Err(RenderError::malformed("sample rate must be positive"));
    }

    let samples = vocoder.synthesize(timeline, sample_rate)?;
    if samples.is_empty() {
        return Err(VocoderError::EmptyOutput.into());
    }
    if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
        return Err(VocoderError::NonFiniteSample { index }.into());
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    let mut pcm = Vec::with_capacity(samples.len() * 2);
    for &sample in &samples {
        let value = sample_to_pcm16(sample);
        writer.write_sample(value)?;
        pcm.extend_from_slice(&value.to_le_bytes());
    }
    writer.finalize()?;

    let summary = WavSummary {
        path: path.to_path_buf(),
        sample_rate,
        num_samples: samples.len(),
        pcm_hash: blake3::hash(&pcm).to_hex().to_string(),
    };
    tracing::info!(
        path = %path.display(),
        samples = summary.num_samples,
        seconds = summary.duration_seconds(),
        "waveform written"
    );
    Ok(summary)
}
