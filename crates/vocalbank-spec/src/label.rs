//! Label file format.
//!
//! A label file is UTF-8 text with one `start end phoneme` line per segment.
//! `start` and `end` are integer ticks (see [`TickUnit`]). Lines with any other
//! shape never become segments: the loader drops them with a
//! [`WarningCode::MalformedLabelLine`] diagnostic, while [`normalize_label_text`]
//! copies them through untouched.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Diagnostic, LabelError, WarningCode};
use crate::phoneme::normalize;
use crate::timing::TickUnit;

/// A time-coded phoneme segment.
///
/// Segments are expected in time order without overlap, but neither is
/// enforced here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhonemeSegment {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Phoneme label.
    pub label: String,
}

impl PhonemeSegment {
    /// Creates a new segment.
    pub fn new(start: f64, end: f64, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }

    /// Segment length in seconds (negative for inverted segments).
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Result of parsing label text.
#[derive(Debug, Clone, Default)]
pub struct LabelParse {
    /// Well-formed segments, in file order.
    pub segments: Vec<PhonemeSegment>,
    /// One diagnostic per dropped line.
    pub warnings: Vec<Diagnostic>,
}

fn split_fields(line: &str) -> Option<(&str, &str, &str)> {
    let mut parts = line.split_whitespace();
    let start = parts.next()?;
    let end = parts.next()?;
    let label = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((start, end, label))
}

/// Parses label text into segments.
pub fn parse_label_text(text: &str, unit: TickUnit) -> LabelParse {
    let mut out = LabelParse::default();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        let Some((start, end, label)) = split_fields(line) else {
            out.warnings.push(Diagnostic::with_context(
                WarningCode::MalformedLabelLine,
                format!(
                    "expected 3 fields, found {}",
                    line.split_whitespace().count()
                ),
                format!("line {}", line_no),
            ));
            continue;
        };

        match (start.parse::<i64>(), end.parse::<i64>()) {
            (Ok(start), Ok(end)) => out.segments.push(PhonemeSegment::new(
                unit.ticks_to_seconds(start),
                unit.ticks_to_seconds(end),
                label,
            )),
            _ => out.warnings.push(Diagnostic::with_context(
                WarningCode::MalformedLabelLine,
                format!("non-integer tick field in '{}'", line.trim()),
                format!("line {}", line_no),
            )),
        }
    }

    out
}

/// Reads and parses a label file.
pub fn load_label_file(path: &Path, unit: TickUnit) -> Result<LabelParse, LabelError> {
    let text = std::fs::read_to_string(path).map_err(|source| LabelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut parsed = parse_label_text(&text, unit);
    let name = path.display().to_string();
    for warning in &mut parsed.warnings {
        if let Some(ctx) = warning.context.take() {
            warning.context = Some(format!("{}:{}", name, ctx.trim_start_matches("line ")));
        }
    }
    Ok(parsed)
}

/// Writes segments as label text, one line each, with a trailing newline.
pub fn write_label_text(segments: &[PhonemeSegment], unit: TickUnit) -> String {
    let ticks_per_second = unit.ticks_per_second() as f64;
    let mut out = String::new();
    for seg in segments {
        let start = (seg.start * ticks_per_second).round() as i64;
        let end = (seg.end * ticks_per_second).round() as i64;
        out.push_str(&format!("{} {} {}\n", start, end, seg.label));
    }
    out
}

/// Output of [`normalize_label_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    /// The rewritten text.
    pub text: String,
    /// Whether any phoneme changed.
    pub changed: bool,
}

/// Normalizes the phoneme field of every three-token line.
///
/// Three-token lines are rewritten as `start end phoneme` with single spaces.
/// Every other line, including its original spacing, is copied unchanged.
pub fn normalize_label_text(text: &str) -> NormalizedText {
    let mut out = String::with_capacity(text.len());
    let mut changed = false;

    for line in text.split_inclusive('\n') {
        match split_fields(line) {
            Some((start, end, phoneme)) => {
                let canonical = normalize(phoneme);
                if canonical != phoneme {
                    changed = true;
                }
                out.push_str(&format!("{} {} {}\n", start, end, canonical));
            }
            None => out.push_str(line),
        }
    }

    NormalizedText { text: out, changed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_hundred_nano_ticks() {
        let parsed = parse_label_text(
            "0 5000000 sil\n5000000 10000000 a\n",
            TickUnit::HundredNanos,
        );
        assert!(parsed.warnings.is_empty());
        assert_eq!(
            parsed.segments,
            vec![
                PhonemeSegment::new(0.0, 0.5, "sil"),
                PhonemeSegment::new(0.5, 1.0, "a"),
            ]
        );
    }

    #[test]
    fn test_malformed_lines_are_dropped_with_diagnostic() {
        let text = "0 100 a\n#comment line\n100 200 b extra\n300 x c\n\n400 500 d\n";
        let parsed = parse_label_text(text, TickUnit::HundredNanos);
        let labels: Vec<&str> = parsed.segments.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "d"]);
        assert_eq!(parsed.warnings.len(), 3);
        assert!(parsed
            .warnings
            .iter()
            .all(|w| w.code == WarningCode::MalformedLabelLine));
        assert_eq!(parsed.warnings[0].context.as_deref(), Some("line 2"));
    }

    #[test]
    fn test_inverted_segment_still_parses() {
        let parsed = parse_label_text("200 100 a\n", TickUnit::HundredNanos);
        assert_eq!(parsed.segments.len(), 1);
        assert!(parsed.segments[0].duration() < 0.0);
    }

    #[test]
    fn test_write_then_parse_keeps_times() {
        let segments = vec![
            PhonemeSegment::new(0.0, 0.25, "SP"),
            PhonemeSegment::new(0.25, 0.75, "a"),
        ];
        let text = write_label_text(&segments, TickUnit::HundredNanos);
        assert_eq!(text, "0 2500000 SP\n2500000 7500000 a\n");
        let parsed = parse_label_text(&text, TickUnit::HundredNanos);
        assert_eq!(parsed.segments, segments);
    }

    #[test]
    fn test_normalize_text_rewrites_phonemes_only() {
        let text = "0 100 sil\n100 200   a\nnot a label line at all\n200 300 br";
        let normalized = normalize_label_text(text);
        assert!(normalized.changed);
        assert_eq!(
            normalized.text,
            "0 100 SP\n100 200 a\nnot a label line at all\n200 300 AP\n"
        );
    }

    #[test]
    fn test_normalize_text_unchanged() {
        let normalized = normalize_label_text("0 100 SP\n100 200 a\n");
        assert!(!normalized.changed);
        assert_eq!(normalized.text, "0 100 SP\n100 200 a\n");
    }

    #[test]
    fn test_load_label_file_prefixes_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("take1.lab");
        std::fs::write(&path, "0 100 a\nbroken\n").unwrap();
        let parsed = load_label_file(&path, TickUnit::HundredNanos).unwrap();
        assert_eq!(parsed.segments.len(), 1);
        let ctx = parsed.warnings[0].context.as_deref().unwrap();
        assert!(ctx.ends_with("take1.lab:2"), "context was {}", ctx);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let err = load_label_file(Path::new("/nonexistent/x.lab"), TickUnit::HundredNanos)
            .unwrap_err();
        assert!(err.to_string().contains("x.lab"));
    }
}
