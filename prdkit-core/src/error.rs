//! Error types for prdkit-core.

use thiserror::Error;

/// Result type alias for prdkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for list-mode processing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Bin edges that do not describe at least one increasing bin.
    #[error("invalid {name} bin edges: {reason}")]
    InvalidBinEdges { name: &'static str, reason: String },

    /// An event refers to a bin that does not exist.
    #[error("{field} index {index} out of range for {len} bins")]
    IndexOutOfRange {
        field: &'static str,
        index: u32,
        len: usize,
    },

    /// Inconsistent scanner geometry description.
    #[error("invalid scanner geometry: {0}")]
    InvalidGeometry(String),

    /// Listmode time block duration must be finite and positive.
    #[error("invalid listmode time block duration: {0}")]
    InvalidDuration(f32),

    /// Header and time blocks were requested out of order.
    #[error("protocol error: {0}")]
    Protocol(String),
}
