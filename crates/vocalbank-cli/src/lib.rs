//! vocalbank CLI library.
//!
//! Command implementations, the background job runner used by long-running
//! commands, and logging setup for the `vocalbank` binary.

pub mod commands;
pub mod jobs;
pub mod logging;
