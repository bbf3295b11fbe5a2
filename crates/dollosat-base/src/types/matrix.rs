//! Observed and corrected matrices.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// The observed binary input matrix (rows = cells, columns = characters).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitMatrix {
    rows: usize,
    cols: usize,
    /// Row-major bits.
    bits: Vec<bool>,
}

impl BitMatrix {
    /// Creates a matrix from row-major bits.
    pub fn new(rows: usize, cols: usize, bits: Vec<bool>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::MalformedInput(format!(
                "matrix must have at least one row and one column, got {rows}x{cols}"
            )));
        }
        let cells = rows.checked_mul(cols).ok_or_else(|| {
            Error::MalformedInput(format!("{rows}x{cols} matrix is too large"))
        })?;
        if bits.len() != cells {
            return Err(Error::MalformedInput(format!(
                "expected {cells} cells for a {rows}x{cols} matrix, got {}",
                bits.len()
            )));
        }
        Ok(Self { rows, cols, bits })
    }

    /// Creates a matrix from rows of 0/1 values.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut bits = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(Error::MalformedInput(format!(
                    "row {i} has {} entries, expected {cols}",
                    row.len()
                )));
            }
            for &value in row {
                match value {
                    0 => bits.push(false),
                    1 => bits.push(true),
                    other => {
                        return Err(Error::MalformedInput(format!(
                            "row {i} contains non-binary value {other}"
                        )))
                    }
                }
            }
        }
        Self::new(rows.len(), cols, bits)
    }

    /// Number of rows (`n`).
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (`m`).
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Observed bit at `(i, j)`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> bool {
        self.bits[i * self.cols + j]
    }

    /// Observed bits of row `i`.
    #[must_use]
    pub fn row(&self, i: usize) -> &[bool] {
        &self.bits[i * self.cols..(i + 1) * self.cols]
    }
}

/// Corrected state of a single cell under the 1-Dollo model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellState {
    /// Character never acquired.
    #[default]
    Absent,
    /// Character acquired and still present.
    Present,
    /// Character acquired and later lost.
    Lost,
}

impl CellState {
    /// The digit used in matrix files (0, 1 or 2).
    #[must_use]
    pub const fn digit(self) -> u8 {
        match self {
            Self::Absent => 0,
            Self::Present => 1,
            Self::Lost => 2,
        }
    }

    /// Parses a matrix digit.
    #[must_use]
    pub const fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            0 => Some(Self::Absent),
            1 => Some(Self::Present),
            2 => Some(Self::Lost),
            _ => None,
        }
    }

    /// Whether the character has been acquired (present or lost).
    #[must_use]
    pub const fn is_acquired(self) -> bool {
        !matches!(self, Self::Absent)
    }
}

impl fmt::Display for CellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.digit())
    }
}

/// A matrix of corrected cell states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<CellState>,
}

impl StateMatrix {
    /// Creates a matrix with every cell absent.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![CellState::Absent; rows * cols],
        }
    }

    /// Creates a matrix from rows of 0/1/2 digits.
    pub fn from_digits<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut matrix = Self::new(rows.len(), cols);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(Error::MalformedInput(format!(
                    "row {i} has {} entries, expected {cols}",
                    row.len()
                )));
            }
            for (j, &digit) in row.iter().enumerate() {
                let state = CellState::from_digit(digit).ok_or_else(|| {
                    Error::MalformedInput(format!("row {i} contains invalid state {digit}"))
                })?;
                matrix.set(i, j, state);
            }
        }
        Ok(matrix)
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// State at `(i, j)`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> CellState {
        self.cells[i * self.cols + j]
    }

    /// Sets the state at `(i, j)`.
    pub fn set(&mut self, i: usize, j: usize, state: CellState) {
        self.cells[i * self.cols + j] = state;
    }

    /// States of row `i`.
    #[must_use]
    pub fn row(&self, i: usize) -> &[CellState] {
        &self.cells[i * self.cols..(i + 1) * self.cols]
    }

    /// Counts the cells in a given state.
    #[must_use]
    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|&&c| c == state).count()
    }
}

impl fmt::Display for StateMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows {
            for (j, state) in self.row(i).iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{state}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_matrix_from_rows() {
        let m = BitMatrix::from_rows(&[[1u8, 0, 1], [0, 0, 1]]).unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 3);
        assert!(m.get(0, 2));
        assert!(!m.get(1, 0));
        assert_eq!(m.row(1), &[false, false, true]);
    }

    #[test]
    fn test_bit_matrix_rejects_non_binary() {
        let err = BitMatrix::from_rows(&[[1u8, 2]]).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn test_bit_matrix_rejects_empty() {
        let rows: [[u8; 0]; 0] = [];
        assert!(BitMatrix::from_rows(&rows).is_err());
    }

    #[test]
    fn test_bit_matrix_rejects_overflowing_shape() {
        let err = BitMatrix::new(usize::MAX, 2, vec![false; 2]).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn test_state_matrix_display() {
        let m = StateMatrix::from_digits(&[[1u8, 0], [2, 1]]).unwrap();
        assert_eq!(m.to_string(), "1 0\n2 1\n");
        assert_eq!(m.count(CellState::Present), 2);
    }
}
