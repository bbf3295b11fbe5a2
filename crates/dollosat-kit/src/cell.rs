//! Literals describing the corrected state of one cell.

use dollosat_base::{BitMatrix, BoolVar, Literal};

use crate::allocator::VariableMap;

/// Literal true exactly when the corrected cell is present (state 1).
///
/// Never allocated: an observed 1 stays present unless it is a false
/// positive, and an observed 0 becomes present only as a false negative.
/// The loss state is kept apart by the mutual-exclusion clauses.
pub fn is_one(observed: bool, false_positive: BoolVar, false_negative: BoolVar) -> Literal {
    if observed {
        !false_positive
    } else {
        false_negative.pos()
    }
}

/// The error indicator that cannot apply to the observed bit.
pub fn inapplicable_error(observed: bool, false_positive: BoolVar, false_negative: BoolVar) -> BoolVar {
    if observed {
        false_negative
    } else {
        false_positive
    }
}

/// Every literal the compiler needs for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellLiterals {
    pub one: Literal,
    pub two: Literal,
    pub acquired: Literal,
    /// Forced false.
    pub inapplicable: BoolVar,
}

impl CellLiterals {
    /// Looks up the literals of cell `(i, j)`.
    pub fn new(map: &VariableMap, matrix: &BitMatrix, i: usize, j: usize) -> Self {
        let observed = matrix.get(i, j);
        let fp = map.false_positive(i, j);
        let fn_ = map.false_negative(i, j);
        Self {
            one: is_one(observed, fp, fn_),
            two: map.is_two(i, j).pos(),
            acquired: map.acquired(i, j).pos(),
            inapplicable: inapplicable_error(observed, fp, fn_),
        }
    }

    /// Literals of all cells, row-major.
    pub fn table(map: &VariableMap, matrix: &BitMatrix) -> Vec<Self> {
        (0..matrix.rows())
            .flat_map(|i| (0..matrix.cols()).map(move |j| Self::new(map, matrix, i, j)))
            .collect()
    }
}
