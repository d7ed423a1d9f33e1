//! Background job runner.
//!
//! Long operations (model builds and renders) run on a worker thread and
//! stream log lines back to the caller over a channel. At most one job of a
//! given [`JobKind`] may run against the same artifact at a time; a second
//! submission fails with [`JobError::Busy`] until the first one finishes.
//! Builds and renders both key on the model file, so one of each may share it.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;

/// What a job produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Acoustic model build.
    Build,
    /// Synthesis render.
    Render,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::Build => write!(f, "build"),
            JobKind::Render => write!(f, "render"),
        }
    }
}

/// Severity of a streamed log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Progress.
    Info,
    /// Recoverable problem.
    Warn,
    /// Failure.
    Error,
}

/// Events streamed from a running job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JobEvent {
    /// A log line.
    Log {
        /// Severity.
        level: LogLevel,
        /// Text.
        message: String,
    },
    /// The job returned. Not sent if the job panicked.
    Finished {
        /// Whether the job succeeded.
        success: bool,
    },
}

/// Errors raised by the runner itself.
#[derive(Debug, Error)]
pub enum JobError {
    /// A job of the same kind is already running against the artifact.
    #[error("a {kind} job is already running for {}", artifact.display())]
    Busy {
        /// Kind of the running job.
        kind: JobKind,
        /// Artifact it targets.
        artifact: PathBuf,
    },

    /// The worker thread could not be started.
    #[error("failed to start {kind} job: {source}")]
    Spawn {
        /// Kind of job.
        kind: JobKind,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The job panicked.
    #[error("{kind} job panicked")]
    Panicked {
        /// Kind of job.
        kind: JobKind,
    },
}

/// Handle given to a job for streaming log lines.
#[derive(Debug, Clone)]
pub struct JobLog {
    sender: Sender<JobEvent>,
}

impl JobLog {
    fn send(&self, level: LogLevel, message: String) {
        // A dropped receiver only means nobody is listening.
        let _ = self.sender.send(JobEvent::Log { level, message });
    }

    /// Streams a progress line.
    pub fn info(&self, message: impl Into<String>) {
        self.send(LogLevel::Info, message.into());
    }

    /// Streams a warning line.
    pub fn warn(&self, message: impl Into<String>) {
        self.send(LogLevel::Warn, message.into());
    }

    /// Streams an error line.
    pub fn error(&self, message: impl Into<String>) {
        self.send(LogLevel::Error, message.into());
    }
}

type ActiveSet = Arc<Mutex<HashSet<(JobKind, PathBuf)>>>;

/// Removes a job from the active set when dropped, including during unwinding.
struct ActiveGuard {
    active: ActiveSet,
    key: (JobKind, PathBuf),
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.active.lock().remove(&self.key);
    }
}

/// A submitted job.
pub struct JobHandle<T> {
    kind: JobKind,
    events: Receiver<JobEvent>,
    thread: JoinHandle<anyhow::Result<T>>,
}

impl<T> JobHandle<T> {
    /// Kind of the job.
    pub fn kind(&self) -> JobKind {
        self.kind
    }

    /// Receiver for streamed events.
    pub fn events(&self) -> &Receiver<JobEvent> {
        &self.events
    }

    /// Passes every event to `on_event` as it arrives, then returns the
    /// job's result.
    pub fn wait(self, mut on_event: impl FnMut(&JobEvent)) -> anyhow::Result<T> {
        for event in self.events.iter() {
            on_event(&event);
        }
        match self.thread.join() {
            Ok(result) => result,
            Err(_) => Err(JobError::Panicked { kind: self.kind }.into()),
        }
    }
}

/// Runs jobs on worker threads with a single-flight guard per
/// `(kind, artifact)`.
#[derive(Clone, Default)]
pub struct JobRunner {
    active: ActiveSet,
}

impl JobRunner {
    /// Creates a runner with no active jobs.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if a job of `kind` is running against `artifact`.
    pub fn is_running(&self, kind: JobKind, artifact: &Path) -> bool {
        self.active
            .lock()
            .contains(&(kind, artifact.to_path_buf()))
    }

    /// Starts `job` on a worker thread.
    pub fn submit<T, F>(
        &self,
        kind: JobKind,
        artifact: &Path,
        job: F,
    ) -> Result<JobHandle<T>, JobError>
    where
        T: Send + 'static,
        F: FnOnce(&JobLog) -> anyhow::Result<T> + Send + 'static,
    {
        let key = (kind, artifact.to_path_buf());
        if !self.active.lock().insert(key.clone()) {
            return Err(JobError::Busy {
                kind,
                artifact: key.1,
            });
        }
        let guard = ActiveGuard {
            active: Arc::clone(&self.active),
            key,
        };

        let (sender, events) = unbounded();
        let log = JobLog { sender };
        let thread = thread::Builder::new()
            .name(format!("vocalbank-{}", kind))
            .spawn(move || {
                let result = {
                    let _guard = guard;
                    job(&log)
                };
                if let Err(ref err) = result {
                    log.error(format!("{:#}", err));
                }
                let _ = log.sender.send(JobEvent::Finished {
                    success: result.is_ok(),
                });
                result
            })
            .map_err(|source| JobError::Spawn { kind, source })?;

        tracing::debug!(%kind, artifact = %artifact.display(), "job started");
        Ok(JobHandle {
            kind,
            events,
            thread,
        })
    }
}
