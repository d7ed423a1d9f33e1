//! Single-flight behavior of long-running commands sharing a job runner.

use std::path::PathBuf;
use std::sync::mpsc;

use vocalbank_cli::commands::build::{self, BuildArgs};
use vocalbank_cli::commands::render::{self, RenderArgs};
use vocalbank_cli::jobs::{JobError, JobKind, JobRunner};
use vocalbank_spec::PipelineConfig;

fn build_args(root: &std::path::Path) -> BuildArgs {
    BuildArgs {
        features: root.join("cache"),
        model: root.join("bank.json"),
        keep_breath: false,
        parallel: false,
    }
}

#[test]
fn concurrent_build_of_same_model_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("cache")).unwrap();
    let args = build_args(dir.path());
    let runner = JobRunner::new();

    let (release, wait_for_release) = mpsc::channel::<()>();
    let running = runner
        .submit(JobKind::Build, &args.model, move |_| {
            let _ = wait_for_release.recv();
            Ok(())
        })
        .unwrap();

    let err = build::execute(&runner, &args, &PipelineConfig::default(), |_| {}).unwrap_err();
    match err.downcast_ref::<JobError>() {
        Some(JobError::Busy { kind, artifact }) => {
            assert_eq!(*kind, JobKind::Build);
            assert_eq!(artifact, &args.model);
        }
        other => panic!("expected busy error, got {:?}", other),
    }
    assert!(!args.model.exists());

    release.send(()).unwrap();
    running.wait(|_| {}).unwrap();

    // Empty cache: the build succeeds with fallback silence vectors.
    let summary = build::execute(&runner, &args, &PipelineConfig::default(), |_| {}).unwrap();
    assert!(summary.report.silence_is_fallback);
    assert!(args.model.is_file());
}

#[test]
fn render_may_overlap_a_build_of_the_same_path() {
    let runner = JobRunner::new();
    let artifact = PathBuf::from("shared");
    let (release, wait_for_release) = mpsc::channel::<()>();

    let build = runner
        .submit(JobKind::Build, &artifact, move |_| {
            let _ = wait_for_release.recv();
            Ok(())
        })
        .unwrap();
    let render = runner
        .submit(JobKind::Render, &artifact, |log| {
            log.info("rendering");
            Ok(42)
        })
        .unwrap();

    assert_eq!(render.wait(|_| {}).unwrap(), 42);
    assert!(runner.is_running(JobKind::Build, &artifact));
    release.send(()).unwrap();
    build.wait(|_| {}).unwrap();
    assert!(!runner.is_running(JobKind::Build, &artifact));
}

#[test]
fn second_render_against_same_model_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let runner = JobRunner::new();
    let model = dir.path().join("bank.json");
    let (release, wait_for_release) = mpsc::channel::<()>();

    let running = runner
        .submit(JobKind::Render, &model, move |_| {
            let _ = wait_for_release.recv();
            Ok(())
        })
        .unwrap();

    // A different score and output directory still shares the model.
    let args = RenderArgs {
        score: dir.path().join("other.json"),
        model: model.clone(),
        out_dir: dir.path().join("elsewhere"),
        stem: Some("take".to_string()),
        export_lab: false,
        tick_unit: None,
    };
    let err = render::execute(&runner, &args, &PipelineConfig::default(), |_| {}).unwrap_err();
    match err.downcast_ref::<JobError>() {
        Some(JobError::Busy { kind, artifact }) => {
            assert_eq!(*kind, JobKind::Render);
            assert_eq!(artifact, &model);
        }
        other => panic!("expected busy error, got {:?}", other),
    }
    assert!(!args.out_dir.exists());

    release.send(()).unwrap();
    running.wait(|_| {}).unwrap();
    assert!(!runner.is_running(JobKind::Render, &model));
}
