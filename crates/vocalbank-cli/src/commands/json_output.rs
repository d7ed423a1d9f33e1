//! JSON output for the `--json` flag.
//!
//! Every command prints a single [`CommandOutput`] object on stdout so tools
//! can parse results without scraping colored text.

use std::process::ExitCode;

use anyhow::{Context, Result};
use serde::Serialize;
use vocalbank_backend_render::RenderError;
use vocalbank_backend_train::TrainError;
use vocalbank_spec::{ConfigError, LabelError, ModelError, ScoreError, StageError};

use crate::jobs::JobError;

/// Error codes for failures that do not come from a pipeline stage.
pub mod error_codes {
    /// Any other failure (I/O, bad arguments).
    pub const GENERIC: &str = "CLI_001";
    /// A job of the same kind is already running.
    pub const JOB_BUSY: &str = "CLI_002";
    /// A job could not be run to completion.
    pub const JOB_FAILED: &str = "CLI_003";
}

/// A failure in JSON output.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable code (e.g. `MODEL_001`, `CLI_001`).
    pub code: String,
    /// Message including its causes.
    pub message: String,
}

impl JsonError {
    /// Converts an error chain, taking the code from the first stage error in it.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        Self {
            code: stage_code(err).to_string(),
            message: format!("{:#}", err),
        }
    }
}

fn stage_code(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<ModelError>() {
            return e.code();
        }
        if let Some(e) = cause.downcast_ref::<ScoreError>() {
            return e.code();
        }
        if let Some(e) = cause.downcast_ref::<LabelError>() {
            return e.code();
        }
        if let Some(e) = cause.downcast_ref::<ConfigError>() {
            return e.code();
        }
        if let Some(e) = cause.downcast_ref::<TrainError>() {
            return e.code();
        }
        if let Some(e) = cause.downcast_ref::<RenderError>() {
            return e.code();
        }
        if let Some(e) = cause.downcast_ref::<JobError>() {
            return match e {
                JobError::Busy { .. } => error_codes::JOB_BUSY,
                _ => error_codes::JOB_FAILED,
            };
        }
    }
    error_codes::GENERIC
}

/// Top-level JSON object printed by every command.
#[derive(Debug, Serialize)]
pub struct CommandOutput<T: Serialize> {
    /// Whether the command succeeded.
    pub success: bool,
    /// Command name.
    pub command: &'static str,
    /// Command result on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    /// Failures.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<JsonError>,
}

impl<T: Serialize> CommandOutput<T> {
    /// Wraps a command outcome.
    pub fn from_result(command: &'static str, outcome: Result<T>) -> Self {
        match outcome {
            Ok(result) => Self {
                success: true,
                command,
                result: Some(result),
                errors: Vec::new(),
            },
            Err(err) => Self {
                success: false,
                command,
                result: None,
                errors: vec![JsonError::from_anyhow(&err)],
            },
        }
    }
}

/// Prints an outcome as pretty JSON and maps it to an exit code.
pub fn emit<T: Serialize>(command: &'static str, outcome: Result<T>) -> Result<ExitCode> {
    let output = CommandOutput::from_result(command, outcome);
    let json =
        serde_json::to_string_pretty(&output).context("failed to serialize command output")?;
    println!("{}", json);
    Ok(if output.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
