//! Export-lab command implementation
//!
//! Writes the companion label file of a score without rendering it.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use vocalbank_spec::{Score, TickUnit};

use super::{ensure_parent, json_output};

/// Result of the export-lab command.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    /// Label file written.
    pub output: PathBuf,
    /// Lines written.
    pub entries: usize,
    /// Tick unit of the file.
    pub tick_unit: TickUnit,
}

/// Exports `score` as label text to `output`.
pub fn execute(score: &Path, output: &Path, tick_unit: TickUnit) -> Result<ExportSummary> {
    let loaded = Score::load(score)
        .with_context(|| format!("failed to load score: {}", score.display()))?;
    ensure_parent(output)?;
    std::fs::write(output, loaded.to_label_text(tick_unit))
        .with_context(|| format!("failed to write label file: {}", output.display()))?;
    Ok(ExportSummary {
        output: output.to_path_buf(),
        entries: loaded.len(),
        tick_unit,
    })
}

/// Run the export-lab command
pub fn run(score: &str, output: &str, tick_unit: TickUnit, json_output: bool) -> Result<ExitCode> {
    let outcome = execute(Path::new(score), Path::new(output), tick_unit);
    if json_output {
        return json_output::emit("export-lab", outcome);
    }

    println!("{} {}", "Exporting:".cyan().bold(), score);
    let summary = outcome?;
    println!(
        "\n{} {} line(s) in {} ticks -> {}",
        "SUCCESS".green().bold(),
        summary.entries,
        summary.tick_unit,
        summary.output.display()
    );
    Ok(ExitCode::SUCCESS)
}
