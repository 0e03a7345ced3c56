//! prd-analysis: summary statistics for PET list-mode files.
//!
//! Summarizes a PET list-mode file: header metadata, event count and average
//! energies.
#![allow(clippy::uninlined_format_args)]

use clap::Parser;
use log::debug;
use prdkit_io::summarize_file;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("{0}")]
    Usage(&'static str),

    #[error("{0}")]
    PrdIo(#[from] prdkit_io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Summarize a PET list-mode file.
#[derive(Parser)]
#[command(name = "prd-analysis")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input list-mode HDF5 file
    input: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let input = cli
        .input
        .ok_or(CliError::Usage("Please provide a file to read"))?;

    if cli.verbose {
        eprintln!("Reading: {}", input.display());
    }
    let start = Instant::now();
    let report = summarize_file(&input)?;
    debug!("summarized {} in {:.2?}", input.display(), start.elapsed());

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }

    if cli.verbose {
        eprintln!(
            "{} time blocks in {:.2}s",
            report.num_blocks,
            start.elapsed().as_secs_f64()
        );
    }
    Ok(())
}
