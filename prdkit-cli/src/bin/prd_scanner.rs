//! Lists the crystals of a scanner in world coordinates.
#![allow(clippy::uninlined_format_args)]

use clap::Parser;
use prdkit_core::{Coordinate, ExperimentSource};
use prdkit_io::Hdf5ExperimentReader;
use std::path::PathBuf;
use std::process::ExitCode;

/// Print the scanner geometry stored in a PET list-mode file.
#[derive(Parser)]
#[command(name = "prd-scanner")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input list-mode HDF5 file
    input: PathBuf,

    /// Print one centre per crystal instead of its eight corners
    #[arg(long)]
    centers: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> prdkit_io::Result<()> {
    // only the header is read; time blocks are left untouched
    let mut reader = Hdf5ExperimentReader::open(&cli.input)?;
    let header = reader.read_header()?;
    let geometry = &header.scanner.geometry;

    println!("Scanner: {}", header.scanner.model_name);
    println!("Number of detectors: {}", geometry.number_of_detectors());

    for (i, crystal) in geometry.crystals().enumerate() {
        if cli.centers {
            println!("{i}: {}", format_coordinate(crystal.center()));
        } else {
            let corners: Vec<String> =
                crystal.corners.iter().copied().map(format_coordinate).collect();
            println!("{i}: {}", corners.join(" "));
        }
    }
    Ok(())
}

fn format_coordinate(coord: Coordinate) -> String {
    let [x, y, z] = coord.c;
    format!("({:.3}, {:.3}, {:.3})", x, y, z)
}
