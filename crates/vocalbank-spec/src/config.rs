//! Pipeline configuration.
//!
//! Every field has a default matching the constants in [`crate::timing`], so an
//! empty JSON object (or no config file at all) is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::timing::{
    bins_for_fft, TickUnit, DEFAULT_PITCH_HZ, DEFAULT_SAMPLE_RATE, FFT_SIZE, FRAME_PERIOD_MS,
    GUARD_FRAMES,
};

/// Settings shared by training and synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Analysis frame period in milliseconds.
    pub frame_period_ms: f64,
    /// Frames appended to rendered timelines.
    pub guard_frames: usize,
    /// Vocoder sample rate.
    pub sample_rate: u32,
    /// FFT size of the spectral analysis; fixes the bin count.
    pub fft_size: usize,
    /// Pool breath frames into the silence statistics (legacy behavior).
    pub merge_silence_and_breath: bool,
    /// Tick unit of label files read for training and label rendering.
    pub label_tick_unit: TickUnit,
    /// Tick unit of label text exported from scores.
    pub export_tick_unit: TickUnit,
    /// Pitch for label-driven rendering.
    pub default_pitch_hz: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frame_period_ms: FRAME_PERIOD_MS,
            guard_frames: GUARD_FRAMES,
            sample_rate: DEFAULT_SAMPLE_RATE,
            fft_size: FFT_SIZE,
            merge_silence_and_breath: true,
            label_tick_unit: TickUnit::HundredNanos,
            export_tick_unit: TickUnit::HundredNanos,
            default_pitch_hz: DEFAULT_PITCH_HZ,
        }
    }
}

impl PipelineConfig {
    /// Parses and validates a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Bin count implied by `fft_size`.
    pub fn bins(&self) -> usize {
        bins_for_fft(self.fft_size)
    }

    /// Checks field ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.frame_period_ms.is_finite() && self.frame_period_ms > 0.0) {
            return Err(ConfigError::InvalidField {
                field: "frame_period_ms",
                message: format!("must be positive, got {}", self.frame_period_ms),
            });
        }
        if self.fft_size < 2 {
            return Err(ConfigError::InvalidField {
                field: "fft_size",
                message: format!("must be at least 2, got {}", self.fft_size),
            });
        }
        if self.sample_rate == 0 {
            return Err(ConfigError::InvalidField {
                field: "sample_rate",
                message: "must be positive".to_string(),
            });
        }
        if !(self.default_pitch_hz.is_finite() && self.default_pitch_hz >= 0.0) {
            return Err(ConfigError::InvalidField {
                field: "default_pitch_hz",
                message: format!("must be >= 0, got {}", self.default_pitch_hz),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(PipelineConfig::from_json("{}").unwrap(), PipelineConfig::default());
        assert_eq!(PipelineConfig::default().bins(), 513);
    }

    #[test]
    fn test_partial_override() {
        let config =
            PipelineConfig::from_json(r#"{"merge_silence_and_breath": false, "export_tick_unit": "micros"}"#)
                .unwrap();
        assert!(!config.merge_silence_and_breath);
        assert_eq!(config.export_tick_unit, TickUnit::Micros);
        assert_eq!(config.frame_period_ms, 5.0);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(matches!(
            PipelineConfig::from_json(r#"{"frame_period": 5.0}"#),
            Err(ConfigError::JsonParse(_))
        ));
    }

    #[test]
    fn test_invalid_frame_period() {
        let err = PipelineConfig::from_json(r#"{"frame_period_ms": 0}"#).unwrap_err();
        assert!(err.to_string().contains("frame_period_ms"));
    }
}
