//! Build command implementation
//!
//! Builds an acoustic model from a feature cache directory on a background
//! job and writes it atomically.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use vocalbank_backend_train::{build_from_feature_dir, BuildOptions, BuildReport};
use vocalbank_spec::PipelineConfig;

use super::{json_output, print_job_event};
use crate::jobs::{JobEvent, JobKind, JobRunner};

/// Inputs of the build command.
#[derive(Debug, Clone)]
pub struct BuildArgs {
    /// Feature cache directory.
    pub features: PathBuf,
    /// Model path to write.
    pub model: PathBuf,
    /// Keep breath statistics separate from silence.
    pub keep_breath: bool,
    /// Shard utterances across threads.
    pub parallel: bool,
}

/// Result of the build command.
#[derive(Debug, Clone, Serialize)]
pub struct BuildSummary {
    /// Model written.
    pub model: PathBuf,
    /// BLAKE3 hash of the model JSON.
    pub content_hash: String,
    /// Build report.
    pub report: BuildReport,
}

/// Builds the model on `runner`, passing streamed events to `on_event`.
pub fn execute(
    runner: &JobRunner,
    args: &BuildArgs,
    config: &PipelineConfig,
    on_event: impl FnMut(&JobEvent),
) -> Result<BuildSummary> {
    let mut options = BuildOptions::from_config(config);
    if args.keep_breath {
        options.merge_silence_and_breath = false;
    }
    let features = args.features.clone();
    let model_path = args.model.clone();
    let parallel = args.parallel;

    let handle = runner.submit(JobKind::Build, &args.model, move |log| {
        log.info(format!("loading features from {}", features.display()));
        let outcome = build_from_feature_dir(&features, &options, parallel)?;
        let report = outcome.report;
        for warning in &report.warnings {
            log.warn(warning.to_string());
        }
        log.info(format!(
            "{} utterance(s) admitted, {} excluded, {} phoneme(s)",
            report.admitted.len(),
            report.excluded.len(),
            report.phoneme_frames.len()
        ));
        if report.silence_is_fallback {
            log.warn("no silence frames found, using fallback silence vectors");
        }

        outcome
            .model
            .save(&model_path)
            .with_context(|| format!("failed to write model: {}", model_path.display()))?;
        let content_hash = outcome.model.content_hash()?;
        log.info(format!("model written to {}", model_path.display()));
        Ok(BuildSummary {
            model: model_path,
            content_hash,
            report,
        })
    })?;
    handle.wait(on_event)
}

/// Run the build command
pub fn run(args: &BuildArgs, config: &PipelineConfig, json_output: bool) -> Result<ExitCode> {
    let runner = JobRunner::new();
    if json_output {
        let outcome = execute(&runner, args, config, |_| {});
        return json_output::emit("build", outcome);
    }

    println!("{} {}", "Building:".cyan().bold(), args.features.display());
    let summary = execute(&runner, args, config, print_job_event)?;
    println!(
        "\n{} {} ({} bins, {})",
        "SUCCESS".green().bold(),
        summary.model.display(),
        summary.report.bins,
        &summary.content_hash[..16]
    );
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};
    use std::path::Path;
    use vocalbank_backend_train::{write_utterance, FeatureSet, LabeledUtterance};
    use vocalbank_spec::{AcousticModel, FrameLabels};

    fn write_sample(dir: &Path) {
        let labels: FrameLabels = ["SP", "a", "a", "br"].iter().map(|s| s.to_string()).collect();
        let utterance = LabeledUtterance::new(
            FeatureSet::new(
                "take1",
                Array1::from_elem(4, 180.0),
                Array2::from_elem((4, 3), 0.25),
                Array2::from_elem((4, 3), 0.5),
            ),
            labels,
        );
        write_utterance(dir, &utterance).unwrap();
    }

    #[test]
    fn test_build_writes_model_and_streams_events() {
        let dir = tempfile::tempdir().unwrap();
        write_sample(&dir.path().join("features"));
        let args = BuildArgs {
            features: dir.path().join("features"),
            model: dir.path().join("model").join("bank.json"),
            keep_breath: true,
            parallel: false,
        };

        let mut lines = 0;
        let summary = execute(&JobRunner::new(), &args, &PipelineConfig::default(), |e| {
            if matches!(e, JobEvent::Log { .. }) {
                lines += 1;
            }
        })
        .unwrap();
        assert!(lines >= 2);
        assert_eq!(summary.report.admitted, vec!["take1".to_string()]);

        let model = AcousticModel::load(&args.model).unwrap();
        assert!(model.contains("a"));
        assert!(model.breath.is_some());
        assert_eq!(model.content_hash().unwrap(), summary.content_hash);
    }

    #[test]
    fn test_missing_feature_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = BuildArgs {
            features: dir.path().join("nope"),
            model: dir.path().join("bank.json"),
            keep_breath: false,
            parallel: false,
        };
        let err = execute(&JobRunner::new(), &args, &PipelineConfig::default(), |_| {})
            .unwrap_err();
        assert!(format!("{:#}", err).contains("nope"));
        assert!(!args.model.exists());
    }
}
