//! Score and label rendering.
//!
//! Both paths walk their input in order and paint frame ranges of a
//! zero-filled [`SynthesisTimeline`]. Ranges are `[floor(start / period),
//! floor(end / period))`, clamped to the timeline; a range that starts at or
//! past the end is skipped. Later ranges overwrite earlier ones.

use vocalbank_spec::{
    ms_to_frame, seconds_to_frame, AcousticModel, Diagnostic, PhonemeSegment, PipelineConfig,
    Resolution, Score, WarningCode, DEFAULT_PITCH_HZ, FRAME_PERIOD_MS, GUARD_FRAMES,
};

use crate::error::{RenderError, RenderResult};
use crate::timeline::SynthesisTimeline;

/// Frame grid used for score rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Frame period in milliseconds. Must match the model.
    pub frame_period_ms: f64,
    /// Unvoiced frames appended after the last entry.
    pub guard_frames: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            frame_period_ms: FRAME_PERIOD_MS,
            guard_frames: GUARD_FRAMES,
        }
    }
}

impl RenderOptions {
    /// Options taken from a pipeline configuration.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            frame_period_ms: config.frame_period_ms,
            guard_frames: config.guard_frames,
        }
    }
}

/// Options for rendering a label file.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRenderOptions {
    /// Frame grid.
    pub grid: RenderOptions,
    /// Pitch given to every voiced segment.
    pub pitch_hz: f64,
}

impl Default for LabelRenderOptions {
    fn default() -> Self {
        Self {
            grid: RenderOptions::default(),
            pitch_hz: DEFAULT_PITCH_HZ,
        }
    }
}

impl LabelRenderOptions {
    /// Options taken from a pipeline configuration.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            grid: RenderOptions::from_config(config),
            pitch_hz: config.default_pitch_hz,
        }
    }
}

/// A rendered timeline and the diagnostics raised while rendering it.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    /// Vocoder parameters.
    pub timeline: SynthesisTimeline,
    /// Unknown phonemes and similar recoverable problems.
    pub warnings: Vec<Diagnostic>,
    /// Entries that started past the end of the timeline.
    pub skipped: usize,
}

impl RenderOutcome {
    /// Number of diagnostics with the given code.
    pub fn count(&self, code: WarningCode) -> usize {
        self.warnings.iter().filter(|w| w.code == code).count()
    }
}

fn check_model(model: &AcousticModel, options: &RenderOptions) -> RenderResult<()> {
    model.validate()?;
    if (model.frame_period_ms - options.frame_period_ms).abs() > 1e-9 {
        return Err(RenderError::FramePeriodMismatch {
            model: model.frame_period_ms,
            requested: options.frame_period_ms,
        });
    }
    Ok(())
}

/// Shared painter for both render paths.
struct Painter<'m> {
    model: &'m AcousticModel,
    timeline: SynthesisTimeline,
    warnings: Vec<Diagnostic>,
    skipped: usize,
}

impl<'m> Painter<'m> {
    fn new(model: &'m AcousticModel, total_frames: usize, frame_period_ms: f64) -> Self {
        Self {
            model,
            timeline: SynthesisTimeline::zeros(total_frames, model.bin_count(), frame_period_ms),
            warnings: Vec::new(),
            skipped: 0,
        }
    }

    fn paint(&mut self, start: usize, end: usize, phoneme: &str, pitch_hz: f64, context: String) {
        let total = self.timeline.frame_count();
        if start >= total {
            tracing::debug!(phoneme, start, total, "range starts past the timeline, skipped");
            self.skipped += 1;
            return;
        }

        let resolution = self.model.resolve(phoneme);
        if let Resolution::Unknown(_) = resolution {
            self.warnings.push(Diagnostic::with_context(
                WarningCode::UnknownPhoneme,
                format!("phoneme '{}' is not in the model, rendering silence", phoneme),
                context,
            ));
        }
        let f0 = if resolution.is_voiced() { pitch_hz } else { 0.0 };
        self.timeline.fill(start, end, f0, resolution.stats());
    }

    /// Gives frames `[0, end)` the silence vectors, unvoiced.
    fn fill_silence(&mut self, end: usize) {
        self.timeline.fill(0, end, 0.0, &self.model.silence);
    }

    fn finish(self) -> RenderOutcome {
        RenderOutcome {
            timeline: self.timeline,
            warnings: self.warnings,
            skipped: self.skipped,
        }
    }
}

/// Renders a score.
///
/// The timeline has `ceil(total_ms / period) + guard` frames. Each entry
/// occupies the frames between the running millisecond cursor before and after
/// it. Trained phonemes get the entry pitch; silence, breath, and unknown
/// phonemes are rendered unvoiced with the silence (or breath) vectors, and
/// every unknown phoneme raises a [`WarningCode::UnknownPhoneme`] diagnostic.
pub fn render_score(
    score: &Score,
    model: &AcousticModel,
    options: &RenderOptions,
) -> RenderResult<RenderOutcome> {
    score.validate()?;
    check_model(model, options)?;

    let period = options.frame_period_ms;
    let total_frames = score.total_frames(period, options.guard_frames);
    let mut painter = Painter::new(model, total_frames, period);

    let mut cursor_ms = 0.0;
    for (index, entry) in score.entries.iter().enumerate() {
        let start = ms_to_frame(cursor_ms, period);
        cursor_ms += entry.duration_ms;
        let end = ms_to_frame(cursor_ms, period);
        painter.paint(
            start,
            end,
            &entry.phoneme,
            entry.effective_pitch(),
            format!("entry {}", index),
        );
    }

    let outcome = painter.finish();
    tracing::info!(
        entries = score.len(),
        frames = outcome.timeline.frame_count(),
        unknown = outcome.count(WarningCode::UnknownPhoneme),
        "score rendered"
    );
    Ok(outcome)
}

/// Renders a label file with a constant pitch.
///
/// The timeline runs to the end of the last segment plus the guard frames, or
/// one second when there are no segments. Frames no segment covers render as
/// silence up to that end; the guard frames stay zero.
pub fn render_labels(
    segments: &[PhonemeSegment],
    model: &AcousticModel,
    options: &LabelRenderOptions,
) -> RenderResult<RenderOutcome> {
    if !options.pitch_hz.is_finite() || options.pitch_hz < 0.0 {
        return Err(RenderError::malformed(format!(
            "pitch must be a finite value >= 0, got {}",
            options.pitch_hz
        )));
    }
    check_model(model, &options.grid)?;

    let period = options.grid.frame_period_ms;
    let total_seconds = segments.last().map_or(1.0, |seg| seg.end);
    let content_frames = seconds_to_frame(total_seconds, period);
    let mut painter = Painter::new(model, content_frames + options.grid.guard_frames, period);
    painter.fill_silence(content_frames);

    for (index, seg) in segments.iter().enumerate() {
        painter.paint(
            seconds_to_frame(seg.start, period),
            seconds_to_frame(seg.end, period),
            &seg.label,
            options.pitch_hz,
            format!("segment {}", index),
        );
    }

    let outcome = painter.finish();
    tracing::info!(
        segments = segments.len(),
        frames = outcome.timeline.frame_count(),
        unknown = outcome.count(WarningCode::UnknownPhoneme),
        "labels rendered"
    );
    Ok(outcome)
}
