//! Decoding assignments into clustered matrices.

use dollosat_base::{AllowedLosses, BitMatrix, BoolVar, CellState, Error, Result, StateMatrix};
use dollosat_format::SampleLine;
use rayon::prelude::*;

use crate::allocator::{Dimensions, VariableMap};
use crate::assignment::Assignment;
use crate::cell::is_one;

/// A decoded sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconstruction {
    /// The `s × t` clustered matrix.
    pub matrix: StateMatrix,
    /// Row cluster of every observed row.
    pub row_clusters: Vec<usize>,
    /// Column cluster of every observed column.
    pub col_clusters: Vec<usize>,
    /// The corrected `n × m` matrix.
    pub corrected: StateMatrix,
    /// Observed 1s that were corrected away.
    pub false_positives: usize,
    /// Observed 0s corrected to present.
    pub false_negatives: usize,
}

/// Decodes assignments against the map they were compiled with.
///
/// The decoder only borrows its inputs and can be shared across threads.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'a> {
    map: &'a VariableMap,
    matrix: &'a BitMatrix,
    allowed: Option<&'a AllowedLosses>,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder. The map must have been allocated for the matrix.
    pub fn new(map: &'a VariableMap, matrix: &'a BitMatrix) -> Result<Self> {
        let Dimensions { rows, cols, .. } = map.dimensions();
        if rows != matrix.rows() || cols != matrix.cols() {
            return Err(Error::AllocatorMappingMismatch(format!(
                "map allocated for a {rows}x{cols} matrix, input is {}x{}",
                matrix.rows(),
                matrix.cols()
            )));
        }
        Ok(Self {
            map,
            matrix,
            allowed: None,
        })
    }

    /// Also rejects losses outside the allowed columns.
    pub fn with_allowed_losses(mut self, allowed: &'a AllowedLosses) -> Result<Self> {
        if allowed.cols() != self.matrix.cols() {
            return Err(Error::MalformedInput(format!(
                "allowed losses cover {} columns, matrix has {}",
                allowed.cols(),
                self.matrix.cols()
            )));
        }
        self.allowed = Some(allowed);
        Ok(self)
    }

    /// Decodes one normalized sampler line.
    pub fn decode_sample(&self, sample: &SampleLine) -> Result<Reconstruction> {
        let assignment = Assignment::from_sample(self.map.num_vars(), sample)?;
        self.decode(&assignment)
    }

    /// Decodes independent samples in parallel, one result per sample in
    /// input order.
    pub fn decode_all(&self, samples: &[SampleLine]) -> Vec<Result<Reconstruction>> {
        samples
            .par_iter()
            .map(|sample| {
                self.decode_sample(sample).map_err(|e| {
                    tracing::warn!("Skipping sample on line {}: {}", sample.line, e);
                    e
                })
            })
            .collect()
    }

    /// Decodes one assignment.
    pub fn decode(&self, assignment: &Assignment) -> Result<Reconstruction> {
        if assignment.num_vars() != self.map.num_vars() {
            return Err(Error::AllocatorMappingMismatch(format!(
                "assignment covers {} variables, map allocates {}",
                assignment.num_vars(),
                self.map.num_vars()
            )));
        }
        let dims = self.map.dimensions();

        let row_clusters = (0..dims.rows)
            .map(|i| {
                self.single_cluster(assignment, "row", i, dims.row_clusters, |c| {
                    self.map.row_assign(i, c)
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let col_clusters = (0..dims.cols)
            .map(|j| {
                self.single_cluster(assignment, "column", j, dims.col_clusters, |c| {
                    self.map.col_assign(j, c)
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut corrected = StateMatrix::new(dims.rows, dims.cols);
        let (mut false_positives, mut false_negatives) = (0, 0);
        for i in 0..dims.rows {
            for j in 0..dims.cols {
                let state = self.cell_state(assignment, i, j)?;
                let observed = self.matrix.get(i, j);
                if observed && state != CellState::Present {
                    false_positives += 1;
                } else if !observed && state == CellState::Present {
                    false_negatives += 1;
                }
                corrected.set(i, j, state);
            }
        }

        let matrix = collapse(&corrected, &row_clusters, &col_clusters, &dims)?;

        Ok(Reconstruction {
            matrix,
            row_clusters,
            col_clusters,
            corrected,
            false_positives,
            false_negatives,
        })
    }

    fn value(&self, assignment: &Assignment, var: BoolVar) -> Result<bool> {
        assignment.value(var).ok_or_else(|| {
            let category = self
                .map
                .category_of(var.id())
                .map_or_else(|| "unknown".to_string(), |c| c.to_string());
            Error::AllocatorMappingMismatch(format!(
                "variable {} ({category}) missing from assignment",
                var.id()
            ))
        })
    }

    fn single_cluster(
        &self,
        assignment: &Assignment,
        axis: &str,
        index: usize,
        clusters: usize,
        var: impl Fn(usize) -> BoolVar,
    ) -> Result<usize> {
        let mut chosen = Vec::new();
        for c in 0..clusters {
            if self.value(assignment, var(c))? {
                chosen.push(c);
            }
        }
        match chosen.as_slice() {
            [c] => Ok(*c),
            [] => Err(Error::InconsistentAssignment(format!(
                "{axis} {index} is in no cluster"
            ))),
            many => Err(Error::InconsistentAssignment(format!(
                "{axis} {index} is in clusters {many:?}"
            ))),
        }
    }

    fn cell_state(&self, assignment: &Assignment, i: usize, j: usize) -> Result<CellState> {
        let observed = self.matrix.get(i, j);
        let one = is_one(observed, self.map.false_positive(i, j), self.map.false_negative(i, j));
        let one = one.eval(self.value(assignment, one.var)?);
        let two = self.value(assignment, self.map.is_two(i, j))?;

        match (one, two) {
            (true, true) => Err(Error::InconsistentAssignment(format!(
                "cell ({i}, {j}) is both present and lost"
            ))),
            (true, false) => Ok(CellState::Present),
            (false, true) => {
                if self.allowed.is_some_and(|a| !a.contains(j)) {
                    return Err(Error::InconsistentAssignment(format!(
                        "cell ({i}, {j}) is lost but column {j} may not be lost"
                    )));
                }
                Ok(CellState::Lost)
            }
            (false, false) => Ok(CellState::Absent),
        }
    }
}

/// Reads the clustered matrix off a corrected one. Every member of a cluster
/// cell must agree with the first.
fn collapse(
    corrected: &StateMatrix,
    row_clusters: &[usize],
    col_clusters: &[usize],
    dims: &Dimensions,
) -> Result<StateMatrix> {
    let mut cells: Vec<Option<CellState>> = vec![None; dims.row_clusters * dims.col_clusters];
    for (i, &r) in row_clusters.iter().enumerate() {
        for (j, &c) in col_clusters.iter().enumerate() {
            let state = corrected.get(i, j);
            let slot = &mut cells[r * dims.col_clusters + c];
            match *slot {
                None => *slot = Some(state),
                Some(first) if first != state => {
                    return Err(Error::InconsistentAssignment(format!(
                        "cell ({i}, {j}) is {state} but cluster cell ({r}, {c}) is {first}"
                    )))
                }
                Some(_) => {}
            }
        }
    }

    let mut matrix = StateMatrix::new(dims.row_clusters, dims.col_clusters);
    for r in 0..dims.row_clusters {
        for c in 0..dims.col_clusters {
            let state = cells[r * dims.col_clusters + c].ok_or_else(|| {
                Error::InconsistentAssignment(format!(
                    "row cluster {r} or column cluster {c} has no members"
                ))
            })?;
            matrix.set(r, c, state);
        }
    }
    Ok(matrix)
}
