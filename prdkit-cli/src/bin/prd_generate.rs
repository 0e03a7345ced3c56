//! Writes a deterministic synthetic list-mode file.
#![allow(
    clippy::uninlined_format_args,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]

use clap::Parser;
use prdkit_core::{
    BoxShape, ExamInfo, Header, PromptEvent, ScannerGeometry, ScannerInfo, TimeBlock,
};
use prdkit_io::{Hdf5ExperimentWriter, WriteOptions};
use std::path::PathBuf;
use std::process::ExitCode;

/// Generate a synthetic PET list-mode file.
#[derive(Parser)]
#[command(name = "prd-generate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output HDF5 file
    output: PathBuf,

    /// Number of time blocks
    #[arg(long, default_value = "100")]
    blocks: u32,

    /// Prompt events per time block
    #[arg(long, default_value = "1000")]
    events_per_block: u32,

    /// Number of energy bins (430-650 keV)
    #[arg(long, default_value = "3")]
    energy_bins: u32,

    /// Number of TOF bins (-300 to 300 mm)
    #[arg(long, default_value = "5")]
    tof_bins: u32,

    /// Listmode time block duration (ms)
    #[arg(long, default_value = "1.0")]
    duration_ms: f32,

    /// Detector modules in the ring
    #[arg(long, default_value = "16")]
    modules: usize,

    /// Crystals per module
    #[arg(long, default_value = "8")]
    crystals_per_module: usize,

    /// Subject id stored in the exam information
    #[arg(long)]
    subject: Option<String>,

    /// Deflate level (0 disables compression)
    #[arg(long, default_value = "1")]
    compression: u8,
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
    let geometry = ScannerGeometry::ring(
        cli.modules,
        cli.crystals_per_module,
        400.0,
        BoxShape::centered(4.0, 20.0, 4.0),
        4.2,
    );
    let detectors = geometry.number_of_detectors().max(1) as u32;
    let header = Header {
        exam: cli.subject.clone().map(ExamInfo::for_subject),
        scanner: ScannerInfo {
            model_name: "prdkit synthetic ring".to_string(),
            geometry,
            tof_bin_edges: uniform_edges(-300.0, 300.0, cli.tof_bins),
            energy_bin_edges: uniform_edges(430.0, 650.0, cli.energy_bins),
            listmode_time_block_duration: cli.duration_ms,
        },
    };

    let options = WriteOptions {
        compression: (cli.compression > 0).then_some(cli.compression),
        ..WriteOptions::default()
    };
    let mut writer = Hdf5ExperimentWriter::create(&cli.output, options)?;
    writer.write_header(&header)?;

    let energy_bins = cli.energy_bins.max(1);
    let tof_bins = cli.tof_bins.max(1);
    for id in 0..cli.blocks {
        let events = (0..cli.events_per_block)
            .map(|i| {
                let n = id.wrapping_mul(cli.events_per_block).wrapping_add(i);
                PromptEvent {
                    detector_1_id: n % detectors,
                    detector_2_id: n.wrapping_add(detectors / 2) % detectors,
                    tof_idx: n % tof_bins,
                    energy_1_idx: n % energy_bins,
                    energy_2_idx: (n / energy_bins) % energy_bins,
                }
            })
            .collect();
        writer.write_time_block(&TimeBlock::new(id, events))?;
    }
    writer.finish()?;

    println!(
        "Wrote {} time blocks ({} events) to {}",
        cli.blocks,
        u64::from(cli.blocks) * u64::from(cli.events_per_block),
        cli.output.display()
    );
    Ok(())
}

fn uniform_edges(low: f32, high: f32, bins: u32) -> Vec<f32> {
    let bins = bins.max(1);
    let width = (high - low) / bins as f32;
    (0..=bins).map(|i| low + width * i as f32).collect()
}
