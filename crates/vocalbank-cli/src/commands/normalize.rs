//! Normalize command implementation
//!
//! Rewrites silence and breath spellings in `.lab` files to the canonical
//! `SP`/`AP` labels.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use serde::Serialize;
use vocalbank_spec::normalize_label_text;
use walkdir::WalkDir;

use super::{ensure_parent, json_output};

/// One processed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedFile {
    /// File read.
    pub input: PathBuf,
    /// File written (same as `input` when normalizing in place).
    pub output: PathBuf,
    /// Whether any label was rewritten.
    pub changed: bool,
}

/// Result of the normalize command.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizeSummary {
    /// Processed files in path order.
    pub files: Vec<NormalizedFile>,
}

impl NormalizeSummary {
    /// Number of files with rewritten labels.
    pub fn changed_count(&self) -> usize {
        self.files.iter().filter(|f| f.changed).count()
    }
}

fn is_lab(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "lab")
}

/// Lists the `.lab` files under `input` (or `input` itself), sorted.
pub fn lab_files(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        bail!("input not found: {}", input.display());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(input).min_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to read {}", input.display()))?;
        if entry.file_type().is_file() && is_lab(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Normalizes every label file under `input`.
///
/// Files are rewritten in place unless `output` is given, in which case the
/// normalized copies are written there, keeping their path relative to
/// `input`.
pub fn execute(input: &Path, output: Option<&Path>) -> Result<NormalizeSummary> {
    let mut summary = NormalizeSummary::default();
    for path in lab_files(input)? {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read label file: {}", path.display()))?;
        let normalized = normalize_label_text(&text);

        let target = match output {
            Some(dir) => {
                let relative = if input.is_dir() {
                    path.strip_prefix(input).unwrap_or(&path).to_path_buf()
                } else {
                    PathBuf::from(path.file_name().unwrap_or(path.as_os_str()))
                };
                dir.join(relative)
            }
            None => path.clone(),
        };

        if normalized.changed || target != path {
            ensure_parent(&target)?;
            std::fs::write(&target, &normalized.text)
                .with_context(|| format!("failed to write label file: {}", target.display()))?;
        }
        tracing::debug!(path = %path.display(), changed = normalized.changed, "normalized");
        summary.files.push(NormalizedFile {
            input: path,
            output: target,
            changed: normalized.changed,
        });
    }
    Ok(summary)
}

/// Run the normalize command
pub fn run(input: &str, output: Option<&str>, json_output: bool) -> Result<ExitCode> {
    let outcome = execute(Path::new(input), output.map(Path::new));
    if json_output {
        return json_output::emit("normalize", outcome);
    }

    println!("{} {}", "Normalizing:".cyan().bold(), input);
    let summary = outcome?;
    for file in &summary.files {
        let status = if file.changed {
            "changed".green()
        } else {
            "unchanged".dimmed()
        };
        println!("  {} {}", status, file.output.display());
    }
    println!(
        "\n{} {} of {} file(s) changed",
        "SUCCESS".green().bold(),
        summary.changed_count(),
        summary.files.len()
    );
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_in_place() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.lab"), "0 100 sil\n100 200 a\n").unwrap();
        std::fs::write(dir.path().join("b.lab"), "0 100 SP\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "0 100 sil\n").unwrap();

        let summary = execute(dir.path(), None).unwrap();
        assert_eq!(summary.files.len(), 2);
        assert_eq!(summary.changed_count(), 1);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a.lab")).unwrap(),
            "0 100 SP\n100 200 a\n"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("notes.txt")).unwrap(),
            "0 100 sil\n"
        );
    }

    #[test]
    fn test_output_dir_keeps_originals() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        std::fs::create_dir_all(input.join("nested")).unwrap();
        std::fs::write(input.join("nested").join("x.lab"), "0 5 br\n").unwrap();
        let out = dir.path().join("out");

        let summary = execute(&input, Some(&out)).unwrap();
        assert_eq!(summary.files[0].output, out.join("nested").join("x.lab"));
        assert_eq!(
            std::fs::read_to_string(out.join("nested").join("x.lab")).unwrap(),
            "0 5 AP\n"
        );
        assert_eq!(
            std::fs::read_to_string(input.join("nested").join("x.lab")).unwrap(),
            "0 5 br\n"
        );
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        assert!(execute(&dir.path().join("missing"), None).is_err());
    }
}
