//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::import::ImportArgs;
use crate::commands::record::RecordArgs;

/// Touchpoint tracker.
///
/// Records start/end touchpoint events per case and derives elapsed-time
/// metrics from them.
#[derive(Debug, Parser)]
#[command(name = "tp", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply the database schema.
    Migrate {
        /// Drop all stored events before re-applying the schema.
        #[arg(long)]
        reset: bool,
    },

    /// Record a single start or end event.
    Record(RecordArgs),

    /// Import events from JSONL on stdin.
    Import(ImportArgs),

    /// Print stored events as JSONL.
    Events {
        /// Only show events for this case.
        #[arg(long)]
        case: Option<String>,
    },

    /// List cases with their event counts.
    Cases,

    /// Show the overall span of a case.
    Metrics {
        /// The case identifier.
        case: String,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show reconciled touchpoint durations for a case.
    Durations {
        /// The case identifier.
        case: String,

        /// Output as JSON.
        #[arg(long)]
        json: bool,

        /// Include touchpoints without a valid duration.
        #[arg(long)]
        all: bool,
    },

    /// Print the compact unit-time encoding of a case.
    Encode {
        /// The case identifier.
        case: String,

        /// Print every event's label instead of only the last.
        #[arg(long)]
        labels: bool,
    },

    /// Summarize every case.
    Report {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}
