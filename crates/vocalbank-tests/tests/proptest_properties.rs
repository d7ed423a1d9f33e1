//! Property-based tests for the vocalbank pipeline using proptest.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p vocalbank-tests --test proptest_properties
//! ```

use ndarray::{Array1, Array2};
use proptest::prelude::*;

use vocalbank_backend_render::{render_score, RenderOptions};
use vocalbank_backend_train::{build_model, build_model_parallel, BuildOptions, FeatureSet, LabeledUtterance};
use vocalbank_spec::phoneme::{BREATH_VARIANTS, SILENCE_VARIANTS};
use vocalbank_spec::{
    align, normalize, AcousticModel, FrameLabels, PhonemeSegment, PhonemeStats, Score,
    ScoreEntry, WarningCode, BREATH, FRAME_PERIOD_MS, GUARD_FRAMES, SILENCE,
};

// ============================================================================
// 1. Label Normalization
// ============================================================================

fn arbitrary_token() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z#]{0,6}",
        prop::sample::select(SILENCE_VARIANTS.to_vec()).prop_map(str::to_string),
        prop::sample::select(BREATH_VARIANTS.to_vec()).prop_map(str::to_string),
    ]
}

proptest! {
    /// Normalizing twice is the same as normalizing once.
    #[test]
    fn normalize_is_idempotent(token in arbitrary_token()) {
        let once = normalize(&token);
        prop_assert_eq!(normalize(once), once);
    }

    /// Every known spelling maps to its canonical label; nothing else changes.
    #[test]
    fn normalize_maps_known_spellings(token in arbitrary_token()) {
        let out = normalize(&token);
        if SILENCE_VARIANTS.contains(&token.as_str()) {
            prop_assert_eq!(out, SILENCE);
        } else if BREATH_VARIANTS.contains(&token.as_str()) {
            prop_assert_eq!(out, BREATH);
        } else {
            prop_assert_eq!(out, token.as_str());
        }
    }
}

// ============================================================================
// 2. Frame Alignment
// ============================================================================

/// Segments on the 5 ms grid (in frames), possibly overlapping or out of range.
fn arbitrary_segments() -> impl Strategy<Value = Vec<(usize, usize, String)>> {
    prop::collection::vec((0usize..60, 0usize..20, "[a-e]"), 0..12)
        .prop_map(|v| v.into_iter().map(|(s, len, l)| (s, s + len, l)).collect())
}

/// Places each boundary half a frame in, so flooring lands on the intended frame.
fn to_segments(frames: &[(usize, usize, String)]) -> Vec<PhonemeSegment> {
    let seconds = |frame: usize| (frame as f64 + 0.5) * FRAME_PERIOD_MS / 1000.0;
    frames
        .iter()
        .map(|(s, e, l)| PhonemeSegment::new(seconds(*s), seconds(*e), l.clone()))
        .collect()
}

proptest! {
    /// The alignment always has exactly the requested number of frames.
    #[test]
    fn alignment_has_requested_length(segs in arbitrary_segments(), total in 0usize..80) {
        let alignment = align(&to_segments(&segs), total, FRAME_PERIOD_MS);
        prop_assert_eq!(alignment.frames.len(), total);
    }

    /// Each frame carries the label of the last segment, in input order, that
    /// covers it; uncovered frames are unlabeled.
    #[test]
    fn alignment_last_segment_wins(segs in arbitrary_segments(), total in 1usize..80) {
        let segments = to_segments(&segs);
        let alignment = align(&segments, total, FRAME_PERIOD_MS);

        for frame in 0..total {
            let expected = segs
                .iter()
                .rev()
                .find(|(s, e, _)| *s <= frame && frame < *e)
                .map(|(_, _, l)| l.as_str());
            prop_assert_eq!(alignment.frames.get(frame), expected, "frame {}", frame);
        }
        let empty = segs.iter().filter(|(s, e, _)| s >= e || *s >= total).count();
        prop_assert_eq!(alignment.warnings.len(), empty);
    }
}

// ============================================================================
// 3. Model Build
// ============================================================================

fn utterance(name: String, labels: Vec<String>, level: f64) -> LabeledUtterance {
    let frames = labels.len();
    LabeledUtterance::new(
        FeatureSet::new(
            name,
            Array1::zeros(frames),
            Array2::from_elem((frames, 4), level),
            Array2::from_elem((frames, 4), level / 2.0),
        ),
        FrameLabels::from(labels),
    )
}

fn arbitrary_corpus() -> impl Strategy<Value = Vec<LabeledUtterance>> {
    prop::collection::vec(
        (prop::collection::vec("SP|AP|a|e|", 1..16), 0.0f64..10.0),
        0..10,
    )
    .prop_map(|takes| {
        takes
            .into_iter()
            .enumerate()
            .map(|(i, (labels, level))| utterance(format!("u{:02}", i), labels, level))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Sharded builds count the same frames as sequential ones.
    #[test]
    fn parallel_build_matches_sequential(corpus in arbitrary_corpus()) {
        let options = BuildOptions::default();
        let seq = build_model(&corpus, &options);
        let par = build_model_parallel(&corpus, &options);

        prop_assert_eq!(&par.report.admitted, &seq.report.admitted);
        prop_assert_eq!(&par.report.phoneme_frames, &seq.report.phoneme_frames);
        prop_assert_eq!(par.report.silence_frames, seq.report.silence_frames);
        for (name, stats) in &seq.model.phonemes {
            for (a, b) in stats.sp_mean.iter().zip(&par.model.phonemes[name].sp_mean) {
                prop_assert!((a - b).abs() < 1e-9);
            }
        }
    }

    /// Built models survive a save and load unchanged.
    #[test]
    fn built_model_round_trips(corpus in arbitrary_corpus()) {
        let outcome = build_model(&corpus, &BuildOptions::default());
        let json = outcome.model.to_json().unwrap();
        prop_assert_eq!(AcousticModel::from_json(&json).unwrap(), outcome.model);
    }
}

// ============================================================================
// 4. Score Rendering
// ============================================================================

fn render_model() -> AcousticModel {
    let mut model = AcousticModel::silence_fallback(3);
    model
        .phonemes
        .insert("a".to_string(), PhonemeStats::new(vec![1.0; 3], vec![0.5; 3], 1));
    model
        .phonemes
        .insert("e".to_string(), PhonemeStats::new(vec![2.0; 3], vec![0.5; 3], 1));
    model
}

fn arbitrary_score() -> impl Strategy<Value = Score> {
    prop::collection::vec(("SP|AP|a|e|x", 0.0f64..400.0, 0.0f64..900.0), 0..12).prop_map(
        |entries| {
            Score::new(
                entries
                    .into_iter()
                    .map(|(ph, dur, pitch)| ScoreEntry::new(ph, dur, pitch))
                    .collect(),
            )
        },
    )
}

proptest! {
    /// Frame count is `ceil(total / period) + guard` and the timeline is well formed.
    #[test]
    fn render_frame_count(score in arbitrary_score()) {
        let out = render_score(&score, &render_model(), &RenderOptions::default()).unwrap();
        let expected = (score.total_duration_ms() / FRAME_PERIOD_MS).ceil() as usize + GUARD_FRAMES;
        prop_assert_eq!(out.timeline.frame_count(), expected);
        prop_assert!(out.timeline.check_well_formed().is_ok());
    }

    /// Voiced frames only ever carry the pitch of a trained phoneme entry.
    #[test]
    fn render_voicing_follows_the_model(score in arbitrary_score()) {
        let out = render_score(&score, &render_model(), &RenderOptions::default()).unwrap();
        let voiced_pitches: Vec<f64> = score
            .entries
            .iter()
            .filter(|e| e.phoneme == "a" || e.phoneme == "e")
            .map(|e| e.pitch_hz)
            .collect();
        for &f0 in out.timeline.f0.iter() {
            prop_assert!(f0 == 0.0 || voiced_pitches.contains(&f0));
        }
        let unknown = score.entries.iter().filter(|e| e.phoneme == "x").count();
        prop_assert_eq!(out.count(WarningCode::UnknownPhoneme), unknown);
    }
}
