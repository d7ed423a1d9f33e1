//! Synthesis scores: ordered phoneme/duration/pitch sequences.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ScoreError;
use crate::phoneme::PhonemeClass;
use crate::timing::TickUnit;

/// One note of a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Phoneme to sing.
    pub phoneme: String,
    /// Duration in milliseconds.
    pub duration_ms: f64,
    /// Pitch in Hz. Ignored for silence and breath.
    #[serde(default)]
    pub pitch_hz: f64,
}

impl ScoreEntry {
    /// Creates a new entry.
    pub fn new(phoneme: impl Into<String>, duration_ms: f64, pitch_hz: f64) -> Self {
        Self {
            phoneme: phoneme.into(),
            duration_ms,
            pitch_hz,
        }
    }

    /// Pitch actually sung: 0 for silence and breath.
    pub fn effective_pitch(&self) -> f64 {
        if PhonemeClass::of(&self.phoneme).is_non_phonetic() {
            0.0
        } else {
            self.pitch_hz
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScoreRepr {
    Wrapped { entries: Vec<ScoreEntry> },
    Bare(Vec<ScoreEntry>),
}

/// An ordered sequence of score entries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "ScoreRepr")]
pub struct Score {
    /// Entries in performance order.
    pub entries: Vec<ScoreEntry>,
}

impl From<ScoreRepr> for Score {
    fn from(repr: ScoreRepr) -> Self {
        match repr {
            ScoreRepr::Wrapped { entries } | ScoreRepr::Bare(entries) => Score { entries },
        }
    }
}

impl Score {
    /// Creates a score from entries.
    pub fn new(entries: Vec<ScoreEntry>) -> Self {
        Self { entries }
    }

    /// Parses and validates a score from JSON (`{"entries": [...]}` or a bare array).
    pub fn from_json(json: &str) -> Result<Self, ScoreError> {
        let score: Score = serde_json::from_str(json)?;
        score.validate()?;
        Ok(score)
    }

    /// Reads, parses, and validates a score file.
    pub fn load(path: &Path) -> Result<Self, ScoreError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Serializes the score as pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, ScoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that every duration and pitch is finite and non-negative.
    pub fn validate(&self) -> Result<(), ScoreError> {
        for (index, entry) in self.entries.iter().enumerate() {
            let invalid = |message: String| ScoreError::InvalidEntry {
                index,
                phoneme: entry.phoneme.clone(),
                message,
            };
            if !entry.duration_ms.is_finite() || entry.duration_ms < 0.0 {
                return Err(invalid(format!(
                    "duration must be a finite value >= 0, got {}",
                    entry.duration_ms
                )));
            }
            if !entry.pitch_hz.is_finite() || entry.pitch_hz < 0.0 {
                return Err(invalid(format!(
                    "pitch must be a finite value >= 0, got {}",
                    entry.pitch_hz
                )));
            }
        }
        Ok(())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the score has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all durations in milliseconds.
    pub fn total_duration_ms(&self) -> f64 {
        self.entries.iter().map(|e| e.duration_ms).sum()
    }

    /// Frames needed to render the score: `ceil(total_ms / period) + guard`.
    pub fn total_frames(&self, frame_period_ms: f64, guard_frames: usize) -> usize {
        let frames = (self.total_duration_ms() / frame_period_ms).ceil();
        let frames = if frames.is_finite() && frames > 0.0 {
            frames as usize
        } else {
            0
        };
        frames + guard_frames
    }

    /// Companion label text for the score.
    ///
    /// Each entry becomes `"<startTick> <endTick> <phoneme>"` with a running
    /// tick cursor; lines are joined by `\n` without a trailing newline.
    /// Export with [`TickUnit::HundredNanos`] to get files the label loader
    /// reads back at the same times; [`TickUnit::Micros`] reproduces legacy
    /// exports.
    pub fn to_label_text(&self, unit: TickUnit) -> String {
        let mut lines = Vec::with_capacity(self.entries.len());
        let mut cursor: i64 = 0;
        for entry in &self.entries {
            let end = cursor.saturating_add(unit.ms_to_ticks(entry.duration_ms));
            lines.push(format!("{} {} {}", cursor, end, entry.phoneme));
            cursor = end;
        }
        lines.join("\n")
    }
}
