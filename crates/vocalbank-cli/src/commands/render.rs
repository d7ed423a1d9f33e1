//! Render command implementation
//!
//! Renders a score against an acoustic model on a background job and exports
//! the vocoder parameters (and optionally the companion label file).

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use vocalbank_backend_render::{render_score, write_timeline_npy, RenderOptions, RenderOutcome};
use vocalbank_spec::{AcousticModel, Diagnostic, PipelineConfig, Score, TickUnit};

use super::{default_stem, ensure_parent, json_output, print_job_event};
use crate::jobs::{JobEvent, JobKind, JobLog, JobRunner};

/// Inputs of the render command.
#[derive(Debug, Clone)]
pub struct RenderArgs {
    /// Score JSON file.
    pub score: PathBuf,
    /// Acoustic model file.
    pub model: PathBuf,
    /// Output directory.
    pub out_dir: PathBuf,
    /// Output base name (default: the score file stem).
    pub stem: Option<String>,
    /// Also write `<stem>.lab`.
    pub export_lab: bool,
    /// Tick unit of the exported label file (default: from config).
    pub tick_unit: Option<TickUnit>,
}

/// Result of a render.
#[derive(Debug, Clone, Serialize)]
pub struct RenderSummary {
    /// Output base name.
    pub stem: String,
    /// Frames rendered.
    pub frames: usize,
    /// Spectral bins per frame.
    pub bins: usize,
    /// Timeline duration in milliseconds.
    pub duration_ms: f64,
    /// F0 array written.
    pub f0: PathBuf,
    /// Spectral envelope array written.
    pub sp: PathBuf,
    /// Aperiodicity array written.
    pub ap: PathBuf,
    /// Companion label file, if exported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lab: Option<PathBuf>,
    /// BLAKE3 hash of the model used.
    pub model_hash: String,
    /// Unknown phonemes and similar recoverable problems.
    pub warnings: Vec<Diagnostic>,
}

/// Loads a model, failing with its path when it is missing or invalid.
pub(crate) fn load_model(path: &Path) -> Result<AcousticModel> {
    AcousticModel::load(path).with_context(|| format!("failed to load model: {}", path.display()))
}

/// Writes a rendered timeline and builds the summary.
pub(crate) fn export_timeline(
    log: &JobLog,
    out_dir: &Path,
    stem: &str,
    outcome: RenderOutcome,
    model_hash: String,
) -> Result<RenderSummary> {
    for warning in &outcome.warnings {
        log.warn(warning.to_string());
    }
    if outcome.skipped > 0 {
        log.warn(format!(
            "{} entr(ies) start past the end of the timeline",
            outcome.skipped
        ));
    }

    let timeline = &outcome.timeline;
    let files = write_timeline_npy(out_dir, stem, timeline)
        .with_context(|| format!("failed to export timeline to {}", out_dir.display()))?;
    log.info(format!(
        "{} frame(s) x {} bin(s) written to {}",
        timeline.frame_count(),
        timeline.bins(),
        out_dir.display()
    ));

    Ok(RenderSummary {
        stem: stem.to_string(),
        frames: timeline.frame_count(),
        bins: timeline.bins(),
        duration_ms: timeline.duration_ms(),
        f0: files.f0,
        sp: files.sp,
        ap: files.ap,
        lab: None,
        model_hash,
        warnings: outcome.warnings,
    })
}

/// Renders the score on `runner`, passing streamed events to `on_event`.
pub fn execute(
    runner: &JobRunner,
    args: &RenderArgs,
    config: &PipelineConfig,
    on_event: impl FnMut(&JobEvent),
) -> Result<RenderSummary> {
    let stem = args
        .stem
        .clone()
        .unwrap_or_else(|| default_stem(&args.score, "render"));
    // Renders serialize per model file, alongside at most one build of it.
    let artifact = args.model.clone();
    let args = args.clone();
    let options = RenderOptions::from_config(config);
    let tick_unit = args.tick_unit.unwrap_or(config.export_tick_unit);

    let handle = runner.submit(JobKind::Render, &artifact, move |log| {
        let model = load_model(&args.model)?;
        let model_hash = model.content_hash()?;
        let score = Score::load(&args.score)
            .with_context(|| format!("failed to load score: {}", args.score.display()))?;
        log.info(format!(
            "rendering {} entr(ies), {:.0} ms",
            score.len(),
            score.total_duration_ms()
        ));

        let outcome = render_score(&score, &model, &options)?;
        let mut summary = export_timeline(log, &args.out_dir, &stem, outcome, model_hash)?;

        if args.export_lab {
            let lab_path = args.out_dir.join(format!("{}.lab", stem));
            ensure_parent(&lab_path)?;
            std::fs::write(&lab_path, score.to_label_text(tick_unit))
                .with_context(|| format!("failed to write label file: {}", lab_path.display()))?;
            log.info(format!("labels written to {} ({})", lab_path.display(), tick_unit));
            summary.lab = Some(lab_path);
        }
        Ok(summary)
    })?;
    handle.wait(on_event)
}

/// Prints a render summary.
pub(crate) fn print_summary(summary: &RenderSummary) {
    println!(
        "\n{} {} frame(s), {:.0} ms -> {}",
        "SUCCESS".green().bold(),
        summary.frames,
        summary.duration_ms,
        summary.f0.parent().unwrap_or(Path::new(".")).display()
    );
    if !summary.warnings.is_empty() {
        println!(
            "{} {} warning(s)",
            "Warnings:".yellow().bold(),
            summary.warnings.len()
        );
    }
}

/// Run the render command
pub fn run(args: &RenderArgs, config: &PipelineConfig, json_output: bool) -> Result<ExitCode> {
    let runner = JobRunner::new();
    if json_output {
        let outcome = execute(&runner, args, config, |_| {});
        return json_output::emit("render", outcome);
    }

    println!("{} {}", "Rendering:".cyan().bold(), args.score.display());
    let summary = execute(&runner, args, config, print_job_event)?;
    print_summary(&summary);
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vocalbank_backend_render::read_timeline_npy;
    use vocalbank_spec::{ModelError, PhonemeStats, WarningCode};

    fn fixture(dir: &Path) -> RenderArgs {
        let mut model = AcousticModel::silence_fallback(2);
        model
            .phonemes
            .insert("a".to_string(), PhonemeStats::new(vec![1.0, 1.0], vec![0.0, 0.0], 5));
        model.save(&dir.join("bank.json")).unwrap();
        std::fs::write(
            dir.join("song.json"),
            r#"[{"phoneme": "SP", "duration_ms": 20}, {"phoneme": "a", "duration_ms": 30, "pitch_hz": 220}, {"phoneme": "qq", "duration_ms": 10}]"#,
        )
        .unwrap();
        RenderArgs {
            score: dir.join("song.json"),
            model: dir.join("bank.json"),
            out_dir: dir.join("out"),
            stem: None,
            export_lab: true,
            tick_unit: None,
        }
    }

    #[test]
    fn test_render_exports_arrays_and_labels() {
        let dir = tempfile::tempdir().unwrap();
        let args = fixture(dir.path());
        let summary =
            execute(&JobRunner::new(), &args, &PipelineConfig::default(), |_| {}).unwrap();

        assert_eq!(summary.stem, "song");
        assert_eq!(summary.frames, 12 + 10);
        assert_eq!(summary.warnings.len(), 1);
        assert_eq!(summary.warnings[0].code, WarningCode::UnknownPhoneme);

        let timeline = read_timeline_npy(&args.out_dir, "song", 5.0).unwrap();
        assert_eq!(timeline.f0[4], 220.0);
        assert_eq!(timeline.f0[10], 0.0);

        let lab = std::fs::read_to_string(args.out_dir.join("song.lab")).unwrap();
        assert_eq!(lab, "0 200000 SP\n200000 500000 a\n500000 600000 qq");
    }

    #[test]
    fn test_legacy_tick_unit() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = fixture(dir.path());
        args.tick_unit = Some(TickUnit::Micros);
        args.stem = Some("legacy".to_string());
        execute(&JobRunner::new(), &args, &PipelineConfig::default(), |_| {}).unwrap();
        let lab = std::fs::read_to_string(args.out_dir.join("legacy.lab")).unwrap();
        assert!(lab.starts_with("0 20000 SP\n"));
    }

    #[test]
    fn test_missing_model_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = fixture(dir.path());
        args.model = dir.path().join("absent.json");
        let err = execute(&JobRunner::new(), &args, &PipelineConfig::default(), |_| {})
            .unwrap_err();
        assert!(err
            .chain()
            .any(|c| matches!(c.downcast_ref::<ModelError>(), Some(ModelError::MissingArtifact { .. }))));
        assert!(!args.out_dir.exists());
    }
}
