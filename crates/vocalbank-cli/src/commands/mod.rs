//! Command implementations.
//!
//! Each command exposes `execute` (does the work and returns a serializable
//! summary) and `run` (prints the summary as colored text or JSON and maps it
//! to an exit code).

pub mod align;
pub mod build;
pub mod export_lab;
pub mod json_output;
pub mod normalize;
pub mod render;
pub mod render_lab;

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use vocalbank_spec::{Diagnostic, PipelineConfig};

use crate::jobs::{JobEvent, LogLevel};

/// Loads the pipeline configuration, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("failed to load config: {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

/// Creates the parent directory of `path` if needed.
pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Prints diagnostics, one per line.
pub(crate) fn print_diagnostics(warnings: &[Diagnostic]) {
    for warning in warnings {
        let context = warning
            .context
            .as_ref()
            .map(|c| format!(" at {}", c))
            .unwrap_or_default();
        println!(
            "  {} [{}]{}: {}",
            "!".yellow(),
            warning.code,
            context.dimmed(),
            warning.message
        );
    }
}

/// Prints a streamed job event.
pub(crate) fn print_job_event(event: &JobEvent) {
    if let JobEvent::Log { level, message } = event {
        match level {
            LogLevel::Info => println!("  {}", message),
            LogLevel::Warn => println!("  {} {}", "!".yellow(), message),
            LogLevel::Error => println!("  {} {}", "x".red(), message),
        }
    }
}

/// Base name for outputs derived from an input file.
pub(crate) fn default_stem(path: &Path, fallback: &str) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
