//! Align command implementation
//!
//! Lays a `.lab` file onto a frame grid and writes per-frame labels in the
//! feature cache format.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;
use ndarray::Array1;
use serde::Serialize;
use vocalbank_backend_train::cache::write_frame_labels;
use vocalbank_spec::{align, load_label_file, Diagnostic, PipelineConfig};

use super::{ensure_parent, json_output, print_diagnostics};

/// Where the frame count comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameSource {
    /// An explicit count.
    Count(usize),
    /// The length of an F0 track (`.npy`).
    F0Track(PathBuf),
}

impl FrameSource {
    /// Resolves the frame count.
    pub fn frame_count(&self) -> Result<usize> {
        match self {
            FrameSource::Count(n) => Ok(*n),
            FrameSource::F0Track(path) => {
                let f0: Array1<f64> = ndarray_npy::read_npy(path)
                    .with_context(|| format!("failed to read F0 track: {}", path.display()))?;
                Ok(f0.len())
            }
        }
    }
}

/// Result of the align command.
#[derive(Debug, Clone, Serialize)]
pub struct AlignSummary {
    /// Label file written.
    pub output: PathBuf,
    /// Frames in the grid.
    pub frames: usize,
    /// Frames covered by a segment.
    pub labeled: usize,
    /// Malformed lines and segments too short to cover a frame.
    pub warnings: Vec<Diagnostic>,
}

/// Aligns `lab` and writes the per-frame labels to `output`.
pub fn execute(
    lab: &Path,
    frames: &FrameSource,
    output: &Path,
    config: &PipelineConfig,
) -> Result<AlignSummary> {
    let total_frames = frames.frame_count()?;
    let parsed = load_label_file(lab, config.label_tick_unit)
        .with_context(|| format!("failed to load label file: {}", lab.display()))?;
    let alignment = align(&parsed.segments, total_frames, config.frame_period_ms);

    ensure_parent(output)?;
    write_frame_labels(output, &alignment.frames)
        .with_context(|| format!("failed to write frame labels: {}", output.display()))?;

    let mut warnings = parsed.warnings;
    warnings.extend(alignment.warnings);
    Ok(AlignSummary {
        output: output.to_path_buf(),
        frames: total_frames,
        labeled: alignment.frames.labeled_count(),
        warnings,
    })
}

/// Run the align command
pub fn run(
    lab: &str,
    frames: &FrameSource,
    output: &str,
    config: &PipelineConfig,
    json_output: bool,
) -> Result<ExitCode> {
    let outcome = execute(Path::new(lab), frames, Path::new(output), config);
    if json_output {
        return json_output::emit("align", outcome);
    }

    println!("{} {}", "Aligning:".cyan().bold(), lab);
    let summary = outcome?;
    print_diagnostics(&summary.warnings);
    println!(
        "\n{} {} of {} frame(s) labeled -> {}",
        "SUCCESS".green().bold(),
        summary.labeled,
        summary.frames,
        summary.output.display()
    );
    Ok(ExitCode::SUCCESS)
}
