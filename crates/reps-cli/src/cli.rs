//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Motion-driven exercise rep counter.
///
/// Counts repetitions from a stream of device-tilt samples and tracks
/// daily counts, goal streaks, and running totals.
#[derive(Debug, Parser)]
#[command(name = "reps", version, about, long_about = None)]
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
    /// Add repetitions to today's count.
    Add {
        /// Number of repetitions to add.
        #[arg(default_value_t = 1)]
        count: u32,
    },

    /// Remove repetitions from today's count.
    ///
    /// The count never goes below zero; removing more than today holds
    /// clamps at zero.
    Sub {
        /// Number of repetitions to remove.
        #[arg(default_value_t = 1)]
        count: u32,
    },

    /// Run a detection session over a stream of tilt samples.
    ///
    /// Samples are read as JSON lines, each with a `timestamp` (RFC 3339)
    /// and an `angle_deg`. Every completed repetition is committed to the
    /// store as it happens.
    Monitor {
        /// Read samples from a file instead of stdin.
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Show today's count, goal progress, and streaks.
    Status,

    /// Summarize totals, streaks, and the rolling average.
    Report {
        /// Days in the rolling-average window.
        #[arg(long)]
        window: Option<u32>,

        /// Output as JSON instead of the formatted report.
        #[arg(long)]
        json: bool,
    },

    /// Show a month of daily counts with goal markers.
    Calendar {
        /// Month to show, as YYYY-MM. Defaults to the current month.
        #[arg(long)]
        month: Option<String>,
    },

    /// Write the snapshot payload for external display surfaces.
    Export {
        /// Write to this path instead of the configured snapshot path,
        /// or `-` for stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show or change the daily goal.
    Goal {
        #[command(subcommand)]
        action: Option<GoalAction>,
    },

    /// Fill the store with generated demo history.
    Seed {
        /// Days of history to generate, ending today.
        #[arg(long, default_value_t = 30)]
        days: u32,
    },
}

/// Goal subcommands.
#[derive(Debug, Subcommand)]
pub enum GoalAction {
    /// Set the daily goal. Common targets are 10, 30, 50, and 100.
    Set {
        /// Repetitions per day, between 1 and 200.
        reps: u32,
    },
}
