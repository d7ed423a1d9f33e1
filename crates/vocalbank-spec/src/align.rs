//! Time-to-frame label alignment.

use serde::{Deserialize, Serialize};

use crate::error::{Diagnostic, WarningCode};
use crate::label::PhonemeSegment;
use crate::timing::seconds_to_frame;

/// Per-frame phoneme labels. An empty string marks an unlabeled frame.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameLabels(Vec<String>);

impl FrameLabels {
    /// Creates `total_frames` unlabeled frames.
    pub fn unlabeled(total_frames: usize) -> Self {
        Self(vec![String::new(); total_frames])
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no frames.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Label of one frame, `None` when out of range or unlabeled.
    pub fn get(&self, frame: usize) -> Option<&str> {
        self.0
            .get(frame)
            .map(String::as_str)
            .filter(|label| !label.is_empty())
    }

    /// Iterates over raw labels, unlabeled frames included as `""`.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of labeled frames.
    pub fn labeled_count(&self) -> usize {
        self.0.iter().filter(|l| !l.is_empty()).count()
    }

    /// Returns the underlying vector.
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for FrameLabels {
    fn from(labels: Vec<String>) -> Self {
        Self(labels)
    }
}

impl FromIterator<String> for FrameLabels {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Output of [`align`].
#[derive(Debug, Clone, Default)]
pub struct Alignment {
    /// Per-frame labels.
    pub frames: FrameLabels,
    /// One diagnostic per segment that covered no whole frame.
    pub warnings: Vec<Diagnostic>,
}

/// Lays segments onto a frame grid of `total_frames` slots.
///
/// Each segment covers `[floor(start*1000/period), floor(end*1000/period))`,
/// clipped to `[0, total_frames]`. Segments are written in input order and
/// overwrite earlier ones, so when segments overlap the later one in the list
/// wins, regardless of their times. A segment covering no frame is dropped
/// with a [`WarningCode::SegmentTooShort`] diagnostic.
pub fn align(segments: &[PhonemeSegment], total_frames: usize, frame_period_ms: f64) -> Alignment {
    let mut frames = vec![String::new(); total_frames];
    let mut warnings = Vec::new();

    for (idx, seg) in segments.iter().enumerate() {
        let raw_start = seconds_to_frame(seg.start, frame_period_ms);
        let raw_end = seconds_to_frame(seg.end, frame_period_ms);
        let start = raw_start.min(total_frames);
        let end = raw_end.min(total_frames);

        if start >= end {
            let reason = if raw_start < raw_end {
                format!("lies past the end of the {}-frame grid", total_frames)
            } else {
                "is shorter than one frame".to_string()
            };
            warnings.push(Diagnostic::with_context(
                WarningCode::SegmentTooShort,
                format!(
                    "segment '{}' [{:.4}s, {:.4}s) covers no frame: {}",
                    seg.label, seg.start, seg.end, reason
                ),
                format!("segment {}", idx),
            ));
            continue;
        }

        for slot in &mut frames[start..end] {
            slot.clone_from(&seg.label);
        }
    }

    Alignment {
        frames: FrameLabels(frames),
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::FRAME_PERIOD_MS;
    use pretty_assertions::assert_eq;

    fn labels(a: &Alignment) -> Vec<&str> {
        a.frames.iter().collect()
    }

    #[test]
    fn test_basic_alignment() {
        let segs = vec![
            PhonemeSegment::new(0.0, 0.01, "SP"),
            PhonemeSegment::new(0.01, 0.02, "a"),
        ];
        let out = align(&segs, 5, FRAME_PERIOD_MS);
        assert_eq!(labels(&out), vec!["SP", "SP", "a", "a", ""]);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_segments_clip_to_total_frames() {
        let segs = vec![PhonemeSegment::new(0.0, 10.0, "a")];
        let out = align(&segs, 3, FRAME_PERIOD_MS);
        assert_eq!(labels(&out), vec!["a", "a", "a"]);
    }

    #[test]
    fn test_short_segment_dropped_with_warning() {
        let segs = vec![PhonemeSegment::new(0.001, 0.004, "t")];
        let out = align(&segs, 4, FRAME_PERIOD_MS);
        assert_eq!(out.frames.labeled_count(), 0);
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].code, WarningCode::SegmentTooShort);
        assert!(out.warnings[0].message.ends_with("is shorter than one frame"));
    }

    #[test]
    fn test_segment_past_end_dropped() {
        let segs = vec![PhonemeSegment::new(1.0, 2.0, "a")];
        let out = align(&segs, 10, FRAME_PERIOD_MS);
        assert_eq!(out.frames.labeled_count(), 0);
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].code, WarningCode::SegmentTooShort);
        assert!(out.warnings[0]
            .message
            .ends_with("lies past the end of the 10-frame grid"));
    }

    #[test]
    fn test_later_segment_in_input_order_wins() {
        // "b" is earlier in time but later in the list.
        let segs = vec![
            PhonemeSegment::new(0.005, 0.02, "a"),
            PhonemeSegment::new(0.0, 0.01, "b"),
        ];
        let out = align(&segs, 4, FRAME_PERIOD_MS);
        assert_eq!(labels(&out), vec!["b", "b", "a", "a"]);
    }

    #[test]
    fn test_zero_frames() {
        let segs = vec![PhonemeSegment::new(0.0, 1.0, "a")];
        let out = align(&segs, 0, FRAME_PERIOD_MS);
        assert!(out.frames.is_empty());
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_frame_labels_json_is_plain_array() {
        let frames = FrameLabels::from(vec!["a".to_string(), String::new()]);
        assert_eq!(serde_json::to_string(&frames).unwrap(), r#"["a",""]"#);
        assert_eq!(frames.get(0), Some("a"));
        assert_eq!(frames.get(1), None);
        assert_eq!(frames.get(2), None);
    }
}
