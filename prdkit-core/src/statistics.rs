//! Running statistics and the final summary report.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Accumulator folded over every prompt event of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunningStatistics {
    pub num_events: u64,
    pub sum_energy_1: f64,
    pub sum_energy_2: f64,
    pub last_block_time_ms: f64,
    pub num_blocks: u64,
}

impl RunningStatistics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the start time of the block being consumed.
    pub fn observe_block(&mut self, block_time_ms: f64) {
        self.last_block_time_ms = block_time_ms;
        self.num_blocks += 1;
    }

    /// Adds one event's pair of energies.
    #[inline]
    pub fn record(&mut self, energy_1: f32, energy_2: f32) {
        self.sum_energy_1 += f64::from(energy_1);
        self.sum_energy_2 += f64::from(energy_2);
        self.num_events += 1;
    }

    /// Mean of the first energies; NaN when no event was recorded.
    #[must_use]
    pub fn average_energy_1(&self) -> f64 {
        self.mean(self.sum_energy_1)
    }

    /// Mean of the second energies; NaN when no event was recorded.
    #[must_use]
    pub fn average_energy_2(&self) -> f64 {
        self.mean(self.sum_energy_2)
    }

    #[allow(clippy::cast_precision_loss)]
    fn mean(&self, sum: f64) -> f64 {
        if self.num_events == 0 {
            f64::NAN
        } else {
            sum / self.num_events as f64
        }
    }
}

/// Summary of one list-mode file.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Report {
    pub input: String,
    pub subject_id: Option<String>,
    pub number_of_detectors: usize,
    pub tof_bin_edges: Vec<f32>,
    pub energy_bin_edges: Vec<f32>,
    pub energy_midpoints: Vec<f32>,
    pub last_block_time_ms: f64,
    pub num_blocks: u64,
    pub num_events: u64,
    /// NaN (serialized as `null`) when the file holds no events.
    pub average_energy_1: f64,
    pub average_energy_2: f64,
}

impl Report {
    /// True when averages are undefined because no event was read.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_events == 0
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Processing file: {}", self.input)?;
        if let Some(id) = &self.subject_id {
            writeln!(f, "Subject ID: {id}")?;
        }
        writeln!(f, "Number of detectors: {}", self.number_of_detectors)?;
        writeln!(f, "TOF bin edges: {:?}", self.tof_bin_edges)?;
        writeln!(f, "Energy bin edges: {:?}", self.energy_bin_edges)?;
        writeln!(f, "Energy mid points: {:?}", self.energy_midpoints)?;
        writeln!(f, "Last time block at {} ms", self.last_block_time_ms)?;
        writeln!(f, "Number of events: {}", self.num_events)?;
        writeln!(f, "Average energy_1: {}", self.average_energy_1)?;
        write!(f, "Average energy_2: {}", self.average_energy_2)
    }
}
