//! Experiment header: exam information and scanner description.

use crate::geometry::ScannerGeometry;
use crate::{Error, Result};
use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Subject of an exam.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Subject {
    pub id: String,
}

/// Exam information; optional in a header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExamInfo {
    pub subject: Subject,
}

impl ExamInfo {
    #[must_use]
    pub fn for_subject(id: impl Into<String>) -> Self {
        Self {
            subject: Subject { id: id.into() },
        }
    }
}

/// Scanner description carried by the header.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScannerInfo {
    pub model_name: String,
    pub geometry: ScannerGeometry,
    /// TOF bin boundaries (mm), one more than the number of TOF bins.
    pub tof_bin_edges: Vec<f32>,
    /// Energy bin boundaries (keV), one more than the number of energy bins.
    pub energy_bin_edges: Vec<f32>,
    /// Duration of one listmode time block (ms).
    pub listmode_time_block_duration: f32,
}

impl ScannerInfo {
    /// Number of detecting elements, derived from the geometry.
    #[must_use]
    pub fn number_of_detectors(&self) -> usize {
        self.geometry.number_of_detectors()
    }

    #[must_use]
    pub fn number_of_tof_bins(&self) -> usize {
        self.tof_bin_edges.len().saturating_sub(1)
    }

    #[must_use]
    pub fn number_of_energy_bins(&self) -> usize {
        self.energy_bin_edges.len().saturating_sub(1)
    }

    /// Checks bin edges and time block duration.
    ///
    /// # Errors
    /// Returns an error if either edge sequence has fewer than two elements or
    /// is not strictly increasing, or if the duration is not finite and
    /// positive.
    pub fn validate(&self) -> Result<()> {
        validate_bin_edges("tof", &self.tof_bin_edges)?;
        validate_bin_edges("energy", &self.energy_bin_edges)?;
        let duration = self.listmode_time_block_duration;
        if !duration.is_finite() || duration <= 0.0 {
            return Err(Error::InvalidDuration(duration));
        }
        Ok(())
    }
}

/// Experiment header.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Header {
    pub exam: Option<ExamInfo>,
    pub scanner: ScannerInfo,
}

impl Header {
    /// Subject id when exam information is present.
    #[must_use]
    pub fn subject_id(&self) -> Option<&str> {
        self.exam.as_ref().map(|exam| exam.subject.id.as_str())
    }
}

/// Checks that `edges` describes at least one bin with increasing boundaries.
///
/// # Errors
/// Returns [`Error::InvalidBinEdges`] when the check fails.
pub fn validate_bin_edges(name: &'static str, edges: &[f32]) -> Result<()> {
    if edges.len() < 2 {
        return Err(Error::InvalidBinEdges {
            name,
            reason: format!("need at least 2 edges, got {}", edges.len()),
        });
    }
    if let Some(pos) = edges
        .windows(2)
        .position(|w| w[0].partial_cmp(&w[1]) != Some(Ordering::Less))
    {
        return Err(Error::InvalidBinEdges {
            name,
            reason: format!(
                "edges must be strictly increasing (edge {} = {}, edge {} = {})",
                pos,
                edges[pos],
                pos + 1,
                edges[pos + 1]
            ),
        });
    }
    Ok(())
}
