//! The reader capability consumed by the summarizer.
//!
//! A list-mode stream is a header followed by zero or more time blocks. Every
//! source enforces that order with a [`StreamState`].

use crate::event::TimeBlock;
use crate::header::Header;
use crate::{Error, Result};
use std::collections::VecDeque;

/// Position in the header-then-time-blocks protocol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StreamState {
    /// Nothing read yet; only the header may be read.
    #[default]
    ExpectHeader,
    /// Header consumed; time blocks may be read.
    ExpectTimeBlocks,
    /// End of stream reached.
    Done,
    /// The header could not be read; nothing else may be read.
    Failed,
}

impl StreamState {
    /// Moves past the header.
    ///
    /// # Errors
    /// Returns [`Error::Protocol`] if the header was already read.
    pub fn begin_header(&mut self) -> Result<()> {
        match self {
            Self::ExpectHeader => {
                *self = Self::ExpectTimeBlocks;
                Ok(())
            }
            _ => Err(Error::Protocol("header already read".to_string())),
        }
    }

    /// Returns whether another time block may be available.
    ///
    /// # Errors
    /// Returns [`Error::Protocol`] if the header has not been read.
    pub fn check_time_blocks(&self) -> Result<bool> {
        match self {
            Self::ExpectHeader => Err(Error::Protocol(
                "time blocks requested before the header".to_string(),
            )),
            Self::ExpectTimeBlocks => Ok(true),
            Self::Done => Ok(false),
            Self::Failed => Err(Error::Protocol(
                "time blocks requested after a failed header read".to_string(),
            )),
        }
    }

    /// Marks the end of stream.
    pub fn finish(&mut self) {
        *self = Self::Done;
    }

    /// Marks the header as unreadable.
    pub fn fail(&mut self) {
        *self = Self::Failed;
    }
}

/// Something that yields one header and then a finite stream of time blocks.
pub trait ExperimentSource {
    /// Error type of the source; core errors must convert into it.
    type Error: From<Error>;

    /// Human-readable name for reports (usually a file path).
    fn name(&self) -> String;

    /// Reads the header. Must be called exactly once, before any time block.
    ///
    /// # Errors
    /// Returns an error if the header cannot be produced or was already read.
    fn read_header(&mut self) -> std::result::Result<Header, Self::Error>;

    /// Reads the next time block, or `None` at end of stream.
    ///
    /// # Errors
    /// Returns an error if the block cannot be read or the header was not
    /// read first.
    fn read_time_block(&mut self) -> std::result::Result<Option<TimeBlock>, Self::Error>;

    /// Lazily iterates over the remaining time blocks.
    fn time_blocks(&mut self) -> TimeBlocks<'_, Self>
    where
        Self: Sized,
    {
        TimeBlocks {
            source: self,
            finished: false,
        }
    }
}

/// Iterator over the time blocks of a source. Stops after the first error.
pub struct TimeBlocks<'a, S: ExperimentSource> {
    source: &'a mut S,
    finished: bool,
}

impl<S: ExperimentSource> Iterator for TimeBlocks<'_, S> {
    type Item = std::result::Result<TimeBlock, S::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.source.read_time_block() {
            Ok(Some(block)) => Some(Ok(block)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl<S: ExperimentSource> std::iter::FusedIterator for TimeBlocks<'_, S> {}

/// In-memory source, mainly for tests and synthetic data.
#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    header: Header,
    blocks: VecDeque<TimeBlock>,
    state: StreamState,
}

impl MemorySource {
    #[must_use]
    pub fn new(header: Header, blocks: Vec<TimeBlock>) -> Self {
        Self {
            name: "<memory>".to_string(),
            header,
            blocks: blocks.into(),
            state: StreamState::default(),
        }
    }

    /// Sets the name reported by [`ExperimentSource::name`].
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl ExperimentSource for MemorySource {
    type Error = Error;

    fn name(&self) -> String {
        self.name.clone()
    }

    fn read_header(&mut self) -> Result<Header> {
        self.state.begin_header()?;
        Ok(self.header.clone())
    }

    fn read_time_block(&mut self) -> Result<Option<TimeBlock>> {
        if !self.state.check_time_blocks()? {
            return Ok(None);
        }
        let block = self.blocks.pop_front();
        if block.is_none() {
            self.state.finish();
        }
        Ok(block)
    }
}
