//! Names and options describing the on-disk HDF5 layout.
//!
//! ```text
//! /<root>                 attr prd_format_version
//!   header/
//!     exam/               optional, attr subject_id
//!     scanner/            attrs model_name, listmode_time_block_duration
//!       tof_bin_edges
//!       energy_bin_edges
//!       geometry/         attr module_count
//!         module_<i>/     attr element_count, dataset transforms [n, 3, 4]
//!           element_<j>/  datasets corners [8, 3], transforms [m, 3, 4]
//!   time_blocks/
//!     block_id, event_index                  one entry per block
//!     detector_1_id, detector_2_id, tof_idx,
//!     energy_1_idx, energy_2_idx             one entry per event
//! ```

pub const FORMAT_VERSION: &str = "0.1";
pub const FORMAT_VERSION_ATTR: &str = "prd_format_version";
pub const DEFAULT_ROOT: &str = "PrdExperiment";

pub const HEADER: &str = "header";
pub const EXAM: &str = "exam";
pub const SUBJECT_ID: &str = "subject_id";
pub const SCANNER: &str = "scanner";
pub const MODEL_NAME: &str = "model_name";
pub const BLOCK_DURATION: &str = "listmode_time_block_duration";
pub const TOF_BIN_EDGES: &str = "tof_bin_edges";
pub const ENERGY_BIN_EDGES: &str = "energy_bin_edges";
pub const GEOMETRY: &str = "geometry";
pub const MODULE_COUNT: &str = "module_count";
pub const ELEMENT_COUNT: &str = "element_count";
pub const TRANSFORMS: &str = "transforms";
pub const CORNERS: &str = "corners";

pub const TIME_BLOCKS: &str = "time_blocks";
pub const BLOCK_ID: &str = "block_id";
pub const EVENT_INDEX: &str = "event_index";
pub const DETECTOR_1_ID: &str = "detector_1_id";
pub const DETECTOR_2_ID: &str = "detector_2_id";
pub const TOF_IDX: &str = "tof_idx";
pub const ENERGY_1_IDX: &str = "energy_1_idx";
pub const ENERGY_2_IDX: &str = "energy_2_idx";

/// Per-event datasets, in [`prdkit_core::PromptEvent`] field order.
pub const EVENT_FIELDS: [&str; 5] = [
    DETECTOR_1_ID,
    DETECTOR_2_ID,
    TOF_IDX,
    ENERGY_1_IDX,
    ENERGY_2_IDX,
];

#[must_use]
pub fn module_group(index: usize) -> String {
    format!("module_{index}")
}

#[must_use]
pub fn element_group(index: usize) -> String {
    format!("element_{index}")
}

/// Reader configuration.
#[derive(Clone, Debug)]
pub struct ReaderOptions {
    /// Group holding the experiment.
    pub root: String,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            root: DEFAULT_ROOT.to_string(),
        }
    }
}

/// Writer configuration.
#[derive(Clone, Debug)]
pub struct WriteOptions {
    /// Group holding the experiment.
    pub root: String,
    pub chunk_events: usize,
    pub chunk_blocks: usize,
    pub compression: Option<u8>,
    pub shuffle: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            root: DEFAULT_ROOT.to_string(),
            chunk_events: 100_000,
            chunk_blocks: 1024,
            compression: Some(1),
            shuffle: true,
        }
    }
}
