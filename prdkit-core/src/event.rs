//! Coincidence events and the time blocks that group them.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A prompt coincidence between two detecting elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PromptEvent {
    /// First detecting element.
    pub detector_1_id: u32,
    /// Second detecting element.
    pub detector_2_id: u32,
    /// Index into the TOF bins.
    pub tof_idx: u32,
    /// Index into the energy bins for the first detection.
    pub energy_1_idx: u32,
    /// Index into the energy bins for the second detection.
    pub energy_2_idx: u32,
}

impl PromptEvent {
    /// Event carrying only energy indices.
    #[must_use]
    pub const fn with_energies(energy_1_idx: u32, energy_2_idx: u32) -> Self {
        Self {
            detector_1_id: 0,
            detector_2_id: 0,
            tof_idx: 0,
            energy_1_idx,
            energy_2_idx,
        }
    }
}

/// Events sharing one listmode time block index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeBlock {
    /// Block index; the block starts at `id * listmode_time_block_duration`.
    pub id: u32,
    pub prompt_events: Vec<PromptEvent>,
}

impl TimeBlock {
    #[must_use]
    pub fn new(id: u32, prompt_events: Vec<PromptEvent>) -> Self {
        Self { id, prompt_events }
    }

    /// Returns the number of prompt events in the block.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prompt_events.len()
    }

    /// Returns true if the block holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prompt_events.is_empty()
    }

    /// Start time of the block (ms).
    #[must_use]
    pub fn start_time_ms(&self, block_duration_ms: f32) -> f64 {
        f64::from(self.id) * f64::from(block_duration_ms)
    }
}
