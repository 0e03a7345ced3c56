//! I/O error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// The file is missing, unreadable or not a list-mode file.
    #[error("cannot open {}: {reason}", path.display())]
    FileOpen { path: PathBuf, reason: String },

    /// The header could not be read or is inconsistent.
    #[error("cannot read header: {0}")]
    HeaderRead(String),

    /// Invalid file layout outside the header.
    #[error("invalid file format: {0}")]
    InvalidFormat(String),

    /// HDF5 library error.
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),

    /// Core library error.
    #[error("core error: {0}")]
    Core(#[from] prdkit_core::Error),
}
