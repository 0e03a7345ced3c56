//! prdkit-core: Core types and summarizer for PET raw list-mode data.
//!
//! This crate provides the header and scanner geometry model, prompt events
//! grouped in time blocks, the [`ExperimentSource`] reader capability and the
//! single-pass [`ExperimentSummarizer`].
//!

pub mod energy;
pub mod error;
pub mod event;
pub mod geometry;
pub mod header;
pub mod source;
pub mod statistics;
pub mod summarizer;

pub use energy::EnergyMidpoints;
pub use error::{Error, Result};
pub use event::{PromptEvent, TimeBlock};
pub use geometry::{
    BoxShape, Coordinate, DetectorModule, ReplicatedObject, RigidTransformation, ScannerGeometry,
};
pub use header::{ExamInfo, Header, ScannerInfo, Subject};
pub use source::{ExperimentSource, MemorySource, StreamState, TimeBlocks};
pub use statistics::{Report, RunningStatistics};
pub use summarizer::{accumulate_block, summarize, ExperimentSummarizer};
