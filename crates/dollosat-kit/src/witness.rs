//! Canonical assignments for known reconstructions.
//!
//! [`build`] is the inverse of decoding: given a corrected matrix and the
//! cluster maps, it sets every allocated variable the way the formula
//! expects. A candidate reconstruction can then be certified with
//! [`Formula::evaluate`](crate::formula::Formula::evaluate).

use dollosat_base::utils::pairs;
use dollosat_base::{BitMatrix, CellState, Error, Result, StateMatrix};

use crate::allocator::VariableMap;
use crate::assignment::Assignment;

/// Builds the assignment describing a corrected matrix and its clustering.
///
/// Only shapes are checked; a reconstruction that breaks the model yields an
/// assignment that falsifies some clause.
pub fn build(
    map: &VariableMap,
    matrix: &BitMatrix,
    corrected: &StateMatrix,
    row_clusters: &[usize],
    col_clusters: &[usize],
) -> Result<Assignment> {
    let dims = map.dimensions();
    if (matrix.rows(), matrix.cols()) != (dims.rows, dims.cols) {
        return Err(Error::AllocatorMappingMismatch(format!(
            "map allocated for a {}x{} matrix, input is {}x{}",
            dims.rows,
            dims.cols,
            matrix.rows(),
            matrix.cols()
        )));
    }
    if (corrected.rows(), corrected.cols()) != (dims.rows, dims.cols) {
        return Err(Error::MalformedInput(format!(
            "corrected matrix is {}x{}, expected {}x{}",
            corrected.rows(),
            corrected.cols(),
            dims.rows,
            dims.cols
        )));
    }
    check_clusters("row", row_clusters, dims.rows, dims.row_clusters)?;
    check_clusters("column", col_clusters, dims.cols, dims.col_clusters)?;

    let mut assignment = Assignment::unset(map.num_vars());
    for i in 0..dims.rows {
        for j in 0..dims.cols {
            let observed = matrix.get(i, j);
            let state = corrected.get(i, j);
            assignment.set(map.false_positive(i, j), observed && state != CellState::Present);
            assignment.set(map.false_negative(i, j), !observed && state == CellState::Present);
            assignment.set(map.is_two(i, j), state == CellState::Lost);
            assignment.set(map.acquired(i, j), state.is_acquired());
        }
    }
    for (a, b) in pairs(dims.rows) {
        for j in 0..dims.cols {
            assignment.set(map.row_pair_equal(a, b, j), corrected.get(a, j) == corrected.get(b, j));
        }
    }
    for (a, b) in pairs(dims.cols) {
        for i in 0..dims.rows {
            assignment.set(map.col_pair_equal(a, b, i), corrected.get(i, a) == corrected.get(i, b));
        }
    }
    for (i, &cluster) in row_clusters.iter().enumerate() {
        for c in 0..dims.row_clusters {
            assignment.set(map.row_assign(i, c), c == cluster);
        }
    }
    for (j, &cluster) in col_clusters.iter().enumerate() {
        for c in 0..dims.col_clusters {
            assignment.set(map.col_assign(j, c), c == cluster);
        }
    }
    Ok(assignment)
}

/// Expands a clustered matrix back to full size.
pub fn expand(clustered: &StateMatrix, row_clusters: &[usize], col_clusters: &[usize]) -> StateMatrix {
    let mut full = StateMatrix::new(row_clusters.len(), col_clusters.len());
    for (i, &r) in row_clusters.iter().enumerate() {
        for (j, &c) in col_clusters.iter().enumerate() {
            full.set(i, j, clustered.get(r, c));
        }
    }
    full
}

fn check_clusters(axis: &str, clusters: &[usize], len: usize, count: usize) -> Result<()> {
    if clusters.len() != len {
        return Err(Error::MalformedInput(format!(
            "{} {axis} cluster labels given for {len} {axis}s",
            clusters.len()
        )));
    }
    if let Some(&bad) = clusters.iter().find(|&&c| c >= count) {
        return Err(Error::MalformedInput(format!(
            "{axis} cluster {bad} out of range for {count} clusters"
        )));
    }
    Ok(())
}
