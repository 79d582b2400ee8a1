//! Writes a mock roster to a CSV file.
//!
//! The file uses the same `id,name,roll,dept,percent` layout the `attendance` binary reads with
//! `--roster`, so a generated roster can be edited by hand and loaded back.

use anyhow::{Context, Result};
use attendance_register::logging::{Verbosity, init_logging};
use attendance_register::mock::{DEFAULT_ROSTER_SIZE, SeededMock, mock_roster};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Generate a mock roster CSV")]
struct Args {
    /// Where to write the roster.
    #[arg(default_value = "roster.csv")]
    output: PathBuf,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of students.
    #[arg(long, default_value_t = DEFAULT_ROSTER_SIZE)]
    count: usize,
}

fn main() -> Result<()> {
    init_logging(Verbosity::Verbose);
    let args = Args::parse();

    let roster = mock_roster(&mut SeededMock::new(args.seed), args.count)?;
    roster
        .write_csv(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    println!("Wrote {} students to {}", roster.len(), args.output.display());
    Ok(())
}
