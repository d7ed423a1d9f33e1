//! CLI argument definitions for the vocalbank command-line interface.
//!
//! All `#[derive(Parser)]` and `#[derive(Subcommand)]` types are defined here,
//! keeping `main.rs` focused on dispatch logic.

use clap::{Parser, Subcommand};
use vocalbank_spec::TickUnit;

/// vocalbank - Phoneme banks and synthesis timelines for singing voices
#[derive(Parser)]
#[command(name = "vocalbank")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    /// Pipeline configuration file (JSON)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Log debug output to stderr (overridden by VOCALBANK_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output machine-readable JSON (no colored output)
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Rewrite silence and breath labels in .lab files to SP/AP
    Normalize {
        /// A .lab file or a directory of them
        #[arg(short, long)]
        input: String,

        /// Write normalized copies here instead of rewriting in place
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Lay a .lab file onto the frame grid and write per-frame labels
    Align {
        /// Label file
        #[arg(long)]
        lab: String,

        /// Number of frames in the grid
        #[arg(long, conflicts_with = "f0", required_unless_present = "f0")]
        frames: Option<usize>,

        /// F0 track (.npy) whose length gives the number of frames
        #[arg(long)]
        f0: Option<String>,

        /// Per-frame label file to write (<base>_ph.json)
        #[arg(short, long)]
        output: String,
    },

    /// Build an acoustic model from a feature cache directory
    Build {
        /// Feature cache directory
        #[arg(short, long)]
        features: String,

        /// Model file to write
        #[arg(short, long)]
        model: String,

        /// Keep breath statistics separate from silence
        #[arg(long)]
        keep_breath: bool,

        /// Process utterances in parallel
        #[arg(long)]
        parallel: bool,
    },

    /// Render a score into vocoder parameter arrays
    Render {
        /// Score file (JSON)
        #[arg(short, long)]
        score: String,

        /// Acoustic model file
        #[arg(short, long)]
        model: String,

        /// Output directory
        #[arg(short, long)]
        out_dir: String,

        /// Output base name (default: score file name)
        #[arg(long)]
        stem: Option<String>,

        /// Also write the companion .lab file
        #[arg(long)]
        export_lab: bool,

        /// Tick unit of the exported .lab file (100ns or us)
        #[arg(long)]
        tick_unit: Option<TickUnit>,
    },

    /// Render a .lab file at a constant pitch
    RenderLab {
        /// Label file
        #[arg(long)]
        lab: String,

        /// Acoustic model file
        #[arg(short, long)]
        model: String,

        /// Output directory
        #[arg(short, long)]
        out_dir: String,

        /// Output base name (default: label file name)
        #[arg(long)]
        stem: Option<String>,

        /// Pitch in Hz for voiced segments
        #[arg(long)]
        pitch: Option<f64>,
    },

    /// Export the companion .lab file of a score
    ExportLab {
        /// Score file (JSON)
        #[arg(short, long)]
        score: String,

        /// Label file to write
        #[arg(short, long)]
        output: String,

        /// Tick unit (100ns or us)
        #[arg(long)]
        tick_unit: Option<TickUnit>,
    },
}
