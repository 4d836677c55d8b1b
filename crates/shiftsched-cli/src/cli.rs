//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;

/// Vehicle shift-scheduling optimizer.
#[derive(Parser, Debug)]
#[command(name = "shiftsched", version, about)]
pub struct Cli {
    /// Log verbosity.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate an input payload without solving.
    Validate {
        /// Path to the input payload JSON file.
        input: PathBuf,
    },
    /// Solve a shift schedule, streaming NDJSON progress events to stdout.
    Run {
        /// Path to the input payload JSON file.
        input: PathBuf,

        /// Where to write the final schedule as JSON. Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}
