//! vocalbank CLI - Command-line interface for phoneme banks and synthesis
//!
//! This binary provides commands for preparing labels, building acoustic
//! models, and rendering scores into vocoder parameters.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod cli_args;

use cli_args::{Cli, Commands};
use vocalbank_cli::commands::{self, align::FrameSource, build::BuildArgs, render::RenderArgs};
use vocalbank_cli::commands::render_lab::LabelRenderArgs;
use vocalbank_cli::logging;

fn dispatch(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = commands::load_config(cli.config.as_deref().map(Path::new))?;
    let json = cli.json;

    match cli.command {
        Commands::Normalize { input, output } => {
            commands::normalize::run(&input, output.as_deref(), json)
        }
        Commands::Align {
            lab,
            frames,
            f0,
            output,
        } => {
            let source = match (frames, f0) {
                (Some(n), _) => FrameSource::Count(n),
                (None, Some(path)) => FrameSource::F0Track(PathBuf::from(path)),
                (None, None) => anyhow::bail!("either --frames or --f0 is required"),
            };
            commands::align::run(&lab, &source, &output, &config, json)
        }
        Commands::Build {
            features,
            model,
            keep_breath,
            parallel,
        } => {
            let args = BuildArgs {
                features: PathBuf::from(features),
                model: PathBuf::from(model),
                keep_breath,
                parallel,
            };
            commands::build::run(&args, &config, json)
        }
        Commands::Render {
            score,
            model,
            out_dir,
            stem,
            export_lab,
            tick_unit,
        } => {
            let args = RenderArgs {
                score: PathBuf::from(score),
                model: PathBuf::from(model),
                out_dir: PathBuf::from(out_dir),
                stem,
                export_lab,
                tick_unit,
            };
            commands::render::run(&args, &config, json)
        }
        Commands::RenderLab {
            lab,
            model,
            out_dir,
            stem,
            pitch,
        } => {
            let args = LabelRenderArgs {
                lab: PathBuf::from(lab),
                model: PathBuf::from(model),
                out_dir: PathBuf::from(out_dir),
                stem,
                pitch_hz: pitch,
            };
            commands::render_lab::run(&args, &config, json)
        }
        Commands::ExportLab {
            score,
            output,
            tick_unit,
        } => commands::export_lab::run(
            &score,
            &output,
            tick_unit.unwrap_or(config.export_tick_unit),
            json,
        ),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match dispatch(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
