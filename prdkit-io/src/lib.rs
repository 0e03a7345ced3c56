//! prdkit-io: HDF5 list-mode file I/O for prdkit.
//!
//! This crate reads and writes PET list-mode experiments stored in HDF5:
//! a header group followed by time blocks whose prompt events are kept in
//! flat per-field datasets and streamed back one block at a time.
//!

mod error;
mod h5util;
pub mod layout;
mod reader;
mod writer;

pub use error::{Error, Result};
pub use layout::{ReaderOptions, WriteOptions};
pub use reader::Hdf5ExperimentReader;
pub use writer::{write_experiment, Hdf5ExperimentWriter};

use prdkit_core::Report;
use std::path::Path;

/// Opens `path`, reads its header and every time block, and returns the
/// summary.
///
/// # Errors
/// Returns [`Error::FileOpen`] or [`Error::HeaderRead`] when the file or its
/// header cannot be read, and [`Error::Core`] when an event refers to a
/// missing energy bin.
pub fn summarize_file<P: AsRef<Path>>(path: P) -> Result<Report> {
    prdkit_core::summarize(Hdf5ExperimentReader::open(path)?)
}
