//! Characters permitted to enter the loss state.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The set of column indices allowed to be lost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedLosses {
    allowed: Vec<bool>,
}

impl AllowedLosses {
    /// Every one of `cols` columns may be lost.
    #[must_use]
    pub fn all(cols: usize) -> Self {
        Self {
            allowed: vec![true; cols],
        }
    }

    /// No column may be lost.
    #[must_use]
    pub fn none(cols: usize) -> Self {
        Self {
            allowed: vec![false; cols],
        }
    }

    /// Allows exactly the given column indices.
    pub fn from_indices(cols: usize, indices: impl IntoIterator<Item = usize>) -> Result<Self> {
        let mut losses = Self::none(cols);
        for j in indices {
            if j >= cols {
                return Err(Error::MalformedInput(format!(
                    "allowed loss column {j} out of range for {cols} columns"
                )));
            }
            losses.allowed[j] = true;
        }
        Ok(losses)
    }

    /// Number of columns covered.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.allowed.len()
    }

    /// Whether column `j` may be lost.
    #[must_use]
    pub fn contains(&self, j: usize) -> bool {
        self.allowed.get(j).copied().unwrap_or(false)
    }

    /// Allowed column indices in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.allowed
            .iter()
            .enumerate()
            .filter_map(|(j, &ok)| ok.then_some(j))
    }

    /// Columns that may never be lost, in increasing order.
    pub fn forbidden(&self) -> impl Iterator<Item = usize> + '_ {
        self.allowed
            .iter()
            .enumerate()
            .filter_map(|(j, &ok)| (!ok).then_some(j))
    }

    /// Number of allowed columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.allowed.iter().filter(|&&ok| ok).count()
    }

    /// Whether no column may be lost.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
