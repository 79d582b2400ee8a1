//! This module contains the command-line interface [`Cli`] parser for the attendance register.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// The command line configuration struct, where the command-line interface parser is automatically
/// derived by [`clap::Parser`].
#[derive(Parser, Debug)]
#[command(name = "attendance", version, about)]
pub struct Cli {
    /// Settings file to load instead of `config.toml` in the working directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Roster file (CSV or JSON). Overrides the configured roster.
    #[arg(long, global = true)]
    pub roster: Option<PathBuf>,

    /// Seed for the mock roster and initial marks.
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Show more log output; repeat for more.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// The different commands available for recording and reporting attendance.
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Display the roster.
    Roster {
        /// Include department and historical percentage.
        #[arg(long)]
        all: bool,
    },

    /// List students below the defaulter threshold.
    Defaulters {
        /// Override the configured threshold.
        #[arg(long)]
        threshold: Option<u8>,
    },

    /// Display the aggregate attendance chart.
    Chart {
        /// Number of students to include.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Display the subject catalogue.
    Subjects,

    /// Export a freshly seeded session as CSV.
    Export {
        #[command(flatten)]
        session: SessionArgs,

        /// Directory to write into instead of the configured export directory.
        #[arg(long, conflicts_with = "stdout")]
        output: Option<PathBuf>,

        /// Print the CSV instead of writing a file.
        #[arg(long)]
        stdout: bool,
    },

    /// Open an interactive register.
    Session {
        #[command(flatten)]
        session: SessionArgs,

        /// Seed every newly opened session with mock marks, not just the first.
        #[arg(long)]
        mock_fill: bool,
    },
}

/// Which session to open.
#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Session date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub date: Option<String>,

    /// Subject code. Defaults to the configured default subject.
    #[arg(long)]
    pub subject: Option<String>,
}
