//! Single pass over a list-mode stream producing a [`Report`].
//!
//! The pass reads the header, derives energy midpoints, then folds every
//! prompt event of every time block into [`RunningStatistics`]. All state is
//! local to one call of [`ExperimentSummarizer::run`].

use crate::energy::EnergyMidpoints;
use crate::event::TimeBlock;
use crate::source::ExperimentSource;
use crate::statistics::{Report, RunningStatistics};
use crate::Result;
use log::{debug, trace, warn};

/// Summarizes one experiment source.
pub struct ExperimentSummarizer<S> {
    source: S,
}

impl<S: ExperimentSource> ExperimentSummarizer<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Consumes the source and returns the summary.
    ///
    /// # Errors
    /// Returns the source's error if the header or a time block cannot be
    /// read, if the header is inconsistent, or if an event refers to an
    /// energy bin that does not exist.
    pub fn run(mut self) -> std::result::Result<Report, S::Error> {
        let input = self.source.name();
        let header = self.source.read_header()?;
        header.scanner.validate()?;

        let scanner = &header.scanner;
        let midpoints = EnergyMidpoints::from_edges(&scanner.energy_bin_edges)?;
        let number_of_detectors = scanner.number_of_detectors();
        debug!(
            "{input}: {number_of_detectors} detectors, {} TOF bins, {} energy bins, {} ms per block",
            scanner.number_of_tof_bins(),
            midpoints.len(),
            scanner.listmode_time_block_duration
        );

        let mut stats = RunningStatistics::new();
        let mut previous_id: Option<u32> = None;
        for block in self.source.time_blocks() {
            let block = block?;
            if let Some(prev) = previous_id.filter(|&prev| block.id < prev) {
                warn!("{input}: time block id {} follows {prev}", block.id);
            }
            previous_id = Some(block.id);
            accumulate_block(
                &mut stats,
                &midpoints,
                &block,
                scanner.listmode_time_block_duration,
            )?;
        }
        debug!(
            "{input}: {} events in {} time blocks",
            stats.num_events, stats.num_blocks
        );

        Ok(Report {
            input,
            subject_id: header.subject_id().map(str::to_string),
            number_of_detectors,
            tof_bin_edges: scanner.tof_bin_edges.clone(),
            energy_bin_edges: scanner.energy_bin_edges.clone(),
            energy_midpoints: midpoints.as_slice().to_vec(),
            last_block_time_ms: stats.last_block_time_ms,
            num_blocks: stats.num_blocks,
            num_events: stats.num_events,
            average_energy_1: stats.average_energy_1(),
            average_energy_2: stats.average_energy_2(),
        })
    }
}

/// Summarizes `source` in one pass.
///
/// # Errors
/// See [`ExperimentSummarizer::run`].
pub fn summarize<S: ExperimentSource>(source: S) -> std::result::Result<Report, S::Error> {
    ExperimentSummarizer::new(source).run()
}

/// Folds one time block into `stats`, in stored event order.
///
/// # Errors
/// Returns [`crate::Error::IndexOutOfRange`] on the first event whose energy
/// index has no midpoint; `stats` then holds the events before it.
pub fn accumulate_block(
    stats: &mut RunningStatistics,
    midpoints: &EnergyMidpoints,
    block: &TimeBlock,
    block_duration_ms: f32,
) -> Result<()> {
    stats.observe_block(block.start_time_ms(block_duration_ms));
    trace!("time block {}: {} prompt events", block.id, block.len());
    for event in &block.prompt_events {
        let energy_1 = midpoints.energy("energy_1_idx", event.energy_1_idx)?;
        let energy_2 = midpoints.energy("energy_2_idx", event.energy_2_idx)?;
        stats.record(energy_1, energy_2);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::PromptEvent;
    use crate::geometry::ScannerGeometry;
    use crate::header::{Header, ScannerInfo};
    use crate::source::MemorySource;
    use crate::Error;
    use approx::assert_relative_eq;

    fn header(energy_bin_edges: Vec<f32>) -> Header {
        Header {
            exam: None,
            scanner: ScannerInfo {
                model_name: "unit".to_string(),
                geometry: ScannerGeometry::default(),
                tof_bin_edges: vec![-5.0, 5.0],
                energy_bin_edges,
                listmode_time_block_duration: 5.0,
            },
        }
    }

    #[test]
    fn test_accumulate_block_partial_on_error() {
        let midpoints = EnergyMidpoints::from_edges(&[0.0, 10.0]).unwrap();
        let block = TimeBlock::new(
            3,
            vec![
                PromptEvent::with_energies(0, 0),
                PromptEvent::with_energies(0, 7),
            ],
        );
        let mut stats = RunningStatistics::new();
        let err = accumulate_block(&mut stats, &midpoints, &block, 2.0).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 7, .. }));
        assert_eq!(stats.num_events, 1);
        assert_relative_eq!(stats.last_block_time_ms, 6.0);
    }

    #[test]
    fn test_invalid_header_rejected() {
        let source = MemorySource::new(header(vec![1.0]), vec![]);
        assert!(matches!(
            summarize(source),
            Err(Error::InvalidBinEdges { .. })
        ));
    }

    #[test]
    fn test_empty_blocks_count_but_add_no_events() {
        let blocks = vec![TimeBlock::new(0, vec![]), TimeBlock::new(4, vec![])];
        let report = summarize(MemorySource::new(header(vec![0.0, 1.0]), blocks)).unwrap();
        assert_eq!(report.num_blocks, 2);
        assert_eq!(report.num_events, 0);
        assert_relative_eq!(report.last_block_time_ms, 20.0);
        assert!(report.average_energy_1.is_nan());
    }
}
