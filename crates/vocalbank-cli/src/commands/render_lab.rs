//! Render-lab command implementation
//!
//! Renders a `.lab` file at a constant pitch, the label-driven counterpart of
//! the render command.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;
use vocalbank_backend_render::{render_labels, LabelRenderOptions};
use vocalbank_spec::{load_label_file, PipelineConfig};

use super::render::{export_timeline, load_model, print_summary, RenderSummary};
use super::{default_stem, json_output, print_job_event};
use crate::jobs::{JobEvent, JobKind, JobRunner};

/// Inputs of the render-lab command.
#[derive(Debug, Clone)]
pub struct LabelRenderArgs {
    /// Label file.
    pub lab: PathBuf,
    /// Acoustic model file.
    pub model: PathBuf,
    /// Output directory.
    pub out_dir: PathBuf,
    /// Output base name (default: the label file stem).
    pub stem: Option<String>,
    /// Pitch for voiced segments (default: from config).
    pub pitch_hz: Option<f64>,
}

/// Renders the label file on `runner`, passing streamed events to `on_event`.
pub fn execute(
    runner: &JobRunner,
    args: &LabelRenderArgs,
    config: &PipelineConfig,
    on_event: impl FnMut(&JobEvent),
) -> Result<RenderSummary> {
    let stem = args
        .stem
        .clone()
        .unwrap_or_else(|| default_stem(&args.lab, "render"));
    // Renders serialize per model file, alongside at most one build of it.
    let artifact = args.model.clone();
    let args = args.clone();
    let mut options = LabelRenderOptions::from_config(config);
    if let Some(pitch) = args.pitch_hz {
        options.pitch_hz = pitch;
    }
    let tick_unit = config.label_tick_unit;

    let handle = runner.submit(JobKind::Render, &artifact, move |log| {
        let model = load_model(&args.model)?;
        let model_hash = model.content_hash()?;
        let parsed = load_label_file(&args.lab, tick_unit)
            .with_context(|| format!("failed to load label file: {}", args.lab.display()))?;
        for warning in &parsed.warnings {
            log.warn(warning.to_string());
        }
        log.info(format!(
            "rendering {} segment(s) at {} Hz",
            parsed.segments.len(),
            options.pitch_hz
        ));

        let outcome = render_labels(&parsed.segments, &model, &options)?;
        let mut summary = export_timeline(log, &args.out_dir, &stem, outcome, model_hash)?;
        let mut warnings = parsed.warnings;
        warnings.append(&mut summary.warnings);
        summary.warnings = warnings;
        Ok(summary)
    })?;
    handle.wait(on_event)
}

/// Run the render-lab command
pub fn run(args: &LabelRenderArgs, config: &PipelineConfig, json_output: bool) -> Result<ExitCode> {
    let runner = JobRunner::new();
    if json_output {
        let outcome = execute(&runner, args, config, |_| {});
        return json_output::emit("render-lab", outcome);
    }

    println!("{} {}", "Rendering:".cyan().bold(), args.lab.display());
    let summary = execute(&runner, args, config, print_job_event)?;
    print_summary(&summary);
    Ok(ExitCode::SUCCESS)
}
