//! A validated clustering problem.

use dollosat_base::{AllowedLosses, BitMatrix, Error, Result};

use crate::allocator::Dimensions;

/// Observed matrix, target cluster counts and allowed losses.
#[derive(Debug, Clone)]
pub struct Instance {
    matrix: BitMatrix,
    row_clusters: usize,
    col_clusters: usize,
    allowed: AllowedLosses,
}

impl Instance {
    /// Validates and builds an instance.
    ///
    /// Every cluster must end up with at least one member, so the cluster
    /// counts must lie in `1..=rows` and `1..=cols`.
    pub fn new(
        matrix: BitMatrix,
        row_clusters: usize,
        col_clusters: usize,
        allowed: AllowedLosses,
    ) -> Result<Self> {
        check_count("row", row_clusters, matrix.rows())?;
        check_count("column", col_clusters, matrix.cols())?;
        if allowed.cols() != matrix.cols() {
            return Err(Error::MalformedInput(format!(
                "allowed losses cover {} columns, matrix has {}",
                allowed.cols(),
                matrix.cols()
            )));
        }
        Ok(Self {
            matrix,
            row_clusters,
            col_clusters,
            allowed,
        })
    }

    /// Builds an instance in which every column may be lost.
    pub fn with_all_losses(matrix: BitMatrix, row_clusters: usize, col_clusters: usize) -> Result<Self> {
        let allowed = AllowedLosses::all(matrix.cols());
        Self::new(matrix, row_clusters, col_clusters, allowed)
    }

    /// The observed matrix.
    pub fn matrix(&self) -> &BitMatrix {
        &self.matrix
    }

    /// Target number of row clusters (`s`).
    pub fn row_clusters(&self) -> usize {
        self.row_clusters
    }

    /// Target number of column clusters (`t`).
    pub fn col_clusters(&self) -> usize {
        self.col_clusters
    }

    /// Columns that may be lost.
    pub fn allowed_losses(&self) -> &AllowedLosses {
        &self.allowed
    }

    /// The dimensions the variable map is allocated for.
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            rows: self.matrix.rows(),
            cols: self.matrix.cols(),
            row_clusters: self.row_clusters,
            col_clusters: self.col_clusters,
        }
    }
}

fn check_count(axis: &'static str, requested: usize, available: usize) -> Result<()> {
    if requested == 0 || requested > available {
        return Err(Error::InvalidClusterCount {
            axis,
            requested,
            available,
        });
    }
    Ok(())
}
