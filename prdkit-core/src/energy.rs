//! Representative energies for energy bins.

use crate::header::validate_bin_edges;
use crate::{Error, Result};

/// Bin centres derived from energy bin edges.
///
/// Element `i` is `(edges[i] + edges[i + 1]) / 2`, computed in `f32` like the
/// edges themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyMidpoints {
    values: Vec<f32>,
}

impl EnergyMidpoints {
    /// Computes midpoints of adjacent edges.
    ///
    /// # Errors
    /// Returns an error if `edges` does not describe at least one increasing bin.
    pub fn from_edges(edges: &[f32]) -> Result<Self> {
        validate_bin_edges("energy", edges)?;
        Ok(Self {
            values: edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect(),
        })
    }

    /// Energy of bin `index`, failing instead of reading past the end.
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] if `index` is not a valid bin.
    #[inline]
    pub fn energy(&self, field: &'static str, index: u32) -> Result<f32> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.values.get(i).copied())
            .ok_or(Error::IndexOutOfRange {
                field,
                index,
                len: self.values.len(),
            })
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
