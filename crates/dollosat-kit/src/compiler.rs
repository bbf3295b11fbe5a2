//! Constraint compilation.
//!
//! The compiler turns an [`Instance`] and its [`VariableMap`] into ordered
//! groups of CNF clauses, one group per [`ClauseFamily`]. It performs no
//! I/O. The pairwise and triple-wise families are generated in parallel and
//! concatenated in a fixed order, so the output is deterministic.

use dollosat_base::utils::pairs;
use dollosat_base::{Error, Literal, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::allocator::VariableMap;
use crate::cell::CellLiterals;
use crate::config::EncoderConfig;
use crate::formula::Formula;
use crate::instance::Instance;

/// A clause in DIMACS form.
pub type Clause = Vec<i64>;

/// A structural constraint, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseFamily {
    /// A cell is never both present and lost.
    MutualExclusion,
    /// Losses outside the allowed columns, and inapplicable error indicators.
    ForbiddenState,
    /// `acquired` is the disjunction of present and lost.
    Acquisition,
    /// No pair of columns violates the single-loss model.
    DolloConflict,
    /// Pairwise equality gadgets over rows and columns.
    PairEquality,
    /// Members of one cluster agree everywhere.
    ClusterConsistency,
    /// A row or column joins at most one cluster.
    AtMostOne,
    /// A row or column joins at least one cluster.
    AtLeastOne,
    /// Every cluster has a member.
    ClusterOccupancy,
}

impl ClauseFamily {
    /// All families in emission order.
    pub const ALL: [ClauseFamily; 9] = [
        ClauseFamily::MutualExclusion,
        ClauseFamily::ForbiddenState,
        ClauseFamily::Acquisition,
        ClauseFamily::DolloConflict,
        ClauseFamily::PairEquality,
        ClauseFamily::ClusterConsistency,
        ClauseFamily::AtMostOne,
        ClauseFamily::AtLeastOne,
        ClauseFamily::ClusterOccupancy,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::MutualExclusion => "mutual_exclusion",
            Self::ForbiddenState => "forbidden_state",
            Self::Acquisition => "acquisition",
            Self::DolloConflict => "dollo_conflict",
            Self::PairEquality => "pair_equality",
            Self::ClusterConsistency => "cluster_consistency",
            Self::AtMostOne => "at_most_one",
            Self::AtLeastOne => "at_least_one",
            Self::ClusterOccupancy => "cluster_occupancy",
        }
    }
}

impl fmt::Display for ClauseFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The clauses of one family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClauseGroup {
    pub family: ClauseFamily,
    pub clauses: Vec<Clause>,
}

impl ClauseGroup {
    /// Number of clauses in the group.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Whether the group has no clauses.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

fn clause<const N: usize>(literals: [Literal; N]) -> Clause {
    literals.iter().map(Literal::to_dimacs).collect()
}

/// The two sets a column contributes to the 1-Dollo laminarity test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnSet {
    /// Rows that acquired the character.
    Acquired,
    /// Rows that lost it again.
    Lost,
}

/// Compiles an instance into clause groups.
pub struct Compiler<'a> {
    instance: &'a Instance,
    map: &'a VariableMap,
    config: &'a EncoderConfig,
    cells: Vec<CellLiterals>,
}

impl<'a> Compiler<'a> {
    /// Creates a compiler. The map must have been allocated for the instance.
    pub fn new(instance: &'a Instance, map: &'a VariableMap, config: &'a EncoderConfig) -> Result<Self> {
        if map.dimensions() != instance.dimensions() {
            return Err(Error::AllocatorMappingMismatch(format!(
                "map allocated for {:?}, instance has {:?}",
                map.dimensions(),
                instance.dimensions()
            )));
        }
        let cells = CellLiterals::table(map, instance.matrix());
        Ok(Self {
            instance,
            map,
            config,
            cells,
        })
    }

    /// Compiles every family into a formula.
    pub fn compile(&self) -> Formula {
        let groups: Vec<ClauseGroup> = ClauseFamily::ALL.iter().map(|&f| self.family(f)).collect();
        let formula = Formula::new(self.map.num_vars(), groups);
        tracing::info!(
            "Compiled {} clauses over {} variables",
            formula.num_clauses(),
            formula.num_vars()
        );
        formula
    }

    /// Generates the clauses of one family.
    pub fn family(&self, family: ClauseFamily) -> ClauseGroup {
        let clauses = match family {
            ClauseFamily::MutualExclusion => self.mutual_exclusion(),
            ClauseFamily::ForbiddenState => self.forbidden_state(),
            ClauseFamily::Acquisition => self.acquisition(),
            ClauseFamily::DolloConflict if self.config.phylogeny => self.dollo_conflict(),
            ClauseFamily::DolloConflict => Vec::new(),
            ClauseFamily::PairEquality => self.pair_equality(),
            ClauseFamily::ClusterConsistency => self.cluster_consistency(),
            ClauseFamily::AtMostOne => self.at_most_one(),
            ClauseFamily::AtLeastOne => self.at_least_one(),
            ClauseFamily::ClusterOccupancy => self.cluster_occupancy(),
        };
        debug_assert!(clauses.iter().all(|c| !c.is_empty()));
        tracing::debug!("Family {}: {} clauses", family, clauses.len());
        ClauseGroup { family, clauses }
    }

    fn rows(&self) -> usize {
        self.instance.matrix().rows()
    }

    fn cols(&self) -> usize {
        self.instance.matrix().cols()
    }

    fn cell(&self, i: usize, j: usize) -> &CellLiterals {
        &self.cells[i * self.cols() + j]
    }

    // =========================================================================
    // Cell states
    // =========================================================================

    fn mutual_exclusion(&self) -> Vec<Clause> {
        self.cells
            .iter()
            .map(|cell| clause([cell.one.negate(), cell.two.negate()]))
            .collect()
    }

    fn forbidden_state(&self) -> Vec<Clause> {
        let mut clauses = Vec::new();
        for j in self.instance.allowed_losses().forbidden() {
            for i in 0..self.rows() {
                clauses.push(clause([self.cell(i, j).two.negate()]));
            }
        }
        clauses.extend(self.cells.iter().map(|cell| clause([!cell.inapplicable])));
        clauses
    }

    fn acquisition(&self) -> Vec<Clause> {
        self.cells
            .iter()
            .flat_map(|cell| {
                [
                    clause([cell.acquired.negate(), cell.one, cell.two]),
                    clause([cell.acquired, cell.one.negate()]),
                    clause([cell.acquired, cell.two.negate()]),
                ]
            })
            .collect()
    }

    // =========================================================================
    // 1-Dollo
    // =========================================================================

    fn membership(&self, row: usize, col: usize, set: ColumnSet) -> Literal {
        let cell = self.cell(row, col);
        match set {
            ColumnSet::Acquired => cell.acquired,
            ColumnSet::Lost => cell.two,
        }
    }

    /// A matrix is 1-Dollo when, for every pair of columns, the acquired and
    /// lost row sets of one column are each nested in or disjoint from those
    /// of the other. Three rows witness a violation of `X` against `Y`: one in
    /// `X` only, one in `Y` only, one in both.
    fn dollo_conflict(&self) -> Vec<Clause> {
        let allowed = self.instance.allowed_losses();
        let column_pairs: Vec<(usize, usize)> = pairs(self.cols()).collect();
        let rows = self.rows();

        column_pairs
            .par_iter()
            .map(|&(c, d)| {
                let mut clauses = Vec::new();
                for x in [ColumnSet::Acquired, ColumnSet::Lost] {
                    if x == ColumnSet::Lost && !allowed.contains(c) {
                        continue;
                    }
                    for y in [ColumnSet::Acquired, ColumnSet::Lost] {
                        if y == ColumnSet::Lost && !allowed.contains(d) {
                            continue;
                        }
                        for p in 0..rows {
                            for q in (0..rows).filter(|&q| q != p) {
                                for r in (0..rows).filter(|&r| r != p && r != q) {
                                    clauses.push(clause([
                                        self.membership(p, c, x).negate(),
                                        self.membership(p, d, y),
                                        self.membership(q, d, y).negate(),
                                        self.membership(q, c, x),
                                        self.membership(r, c, x).negate(),
                                        self.membership(r, d, y).negate(),
                                    ]));
                                }
                            }
                        }
                    }
                }
                clauses
            })
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect()
    }

    // =========================================================================
    // Clustering
    // =========================================================================

    /// Seven clauses defining `eq ↔ (x and y have the same state)`.
    fn equality_gadget(eq: Literal, x: &CellLiterals, y: &CellLiterals) -> [Clause; 7] {
        [
            clause([eq.negate(), x.one.negate(), y.one]),
            clause([eq.negate(), x.one, y.one.negate()]),
            clause([eq.negate(), x.two.negate(), y.two]),
            clause([eq.negate(), x.two, y.two.negate()]),
            clause([x.one.negate(), y.one.negate(), eq]),
            clause([x.two.negate(), y.two.negate(), eq]),
            clause([x.one, x.two, y.one, y.two, eq]),
        ]
    }

    fn pair_equality(&self) -> Vec<Clause> {
        let (rows, cols) = (self.rows(), self.cols());
        let row_pairs: Vec<(usize, usize)> = pairs(rows).collect();
        let col_pairs: Vec<(usize, usize)> = pairs(cols).collect();

        let by_rows = row_pairs.par_iter().map(|&(a, b)| {
            (0..cols)
                .flat_map(|j| {
                    let eq = self.map.row_pair_equal(a, b, j).pos();
                    Self::equality_gadget(eq, self.cell(a, j), self.cell(b, j))
                })
                .collect::<Vec<_>>()
        });
        let by_cols = col_pairs.par_iter().map(|&(a, b)| {
            (0..rows)
                .flat_map(|i| {
                    let eq = self.map.col_pair_equal(a, b, i).pos();
                    Self::equality_gadget(eq, self.cell(i, a), self.cell(i, b))
                })
                .collect::<Vec<_>>()
        });

        by_rows
            .chain(by_cols)
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect()
    }

    fn cluster_consistency(&self) -> Vec<Clause> {
        let (rows, cols) = (self.rows(), self.cols());
        let (s, t) = (self.instance.row_clusters(), self.instance.col_clusters());
        let row_pairs: Vec<(usize, usize)> = pairs(rows).collect();
        let col_pairs: Vec<(usize, usize)> = pairs(cols).collect();

        let by_rows = row_pairs.par_iter().map(|&(a, b)| {
            let mut clauses = Vec::with_capacity(s * cols);
            for c in 0..s {
                for j in 0..cols {
                    clauses.push(clause([
                        !self.map.row_assign(a, c),
                        !self.map.row_assign(b, c),
                        self.map.row_pair_equal(a, b, j).pos(),
                    ]));
                }
            }
            clauses
        });
        let by_cols = col_pairs.par_iter().map(|&(a, b)| {
            let mut clauses = Vec::with_capacity(t * rows);
            for c in 0..t {
                for i in 0..rows {
                    clauses.push(clause([
                        !self.map.col_assign(a, c),
                        !self.map.col_assign(b, c),
                        self.map.col_pair_equal(a, b, i).pos(),
                    ]));
                }
            }
            clauses
        });

        by_rows
            .chain(by_cols)
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect()
    }

    fn at_most_one(&self) -> Vec<Clause> {
        let (s, t) = (self.instance.row_clusters(), self.instance.col_clusters());
        let mut clauses = Vec::new();
        for i in 0..self.rows() {
            for (c, d) in pairs(s) {
                clauses.push(clause([!self.map.row_assign(i, c), !self.map.row_assign(i, d)]));
            }
        }
        for j in 0..self.cols() {
            for (c, d) in pairs(t) {
                clauses.push(clause([!self.map.col_assign(j, c), !self.map.col_assign(j, d)]));
            }
        }
        clauses
    }

    fn at_least_one(&self) -> Vec<Clause> {
        let (s, t) = (self.instance.row_clusters(), self.instance.col_clusters());
        let rows = (0..self.rows()).map(|i| {
            (0..s)
                .map(|c| self.map.row_assign(i, c).pos().to_dimacs())
                .collect()
        });
        let cols = (0..self.cols()).map(|j| {
            (0..t)
                .map(|c| self.map.col_assign(j, c).pos().to_dimacs())
                .collect()
        });
        rows.chain(cols).collect()
    }

    fn cluster_occupancy(&self) -> Vec<Clause> {
        let (s, t) = (self.instance.row_clusters(), self.instance.col_clusters());
        let rows = (0..s).map(|c| {
            (0..self.rows())
                .map(|i| self.map.row_assign(i, c).pos().to_dimacs())
                .collect()
        });
        let cols = (0..t).map(|c| {
            (0..self.cols())
                .map(|j| self.map.col_assign(j, c).pos().to_dimacs())
                .collect()
        });
        rows.chain(cols).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dollosat_base::{AllowedLosses, BitMatrix};

    fn compile(rows: &[[u8; 3]], s: usize, t: usize, allowed: AllowedLosses) -> Formula {
        let matrix = BitMatrix::from_rows(rows).unwrap();
        let instance = Instance::new(matrix, s, t, allowed).unwrap();
        let map = VariableMap::allocate(instance.dimensions());
        Compiler::new(&instance, &map, &EncoderConfig::default())
            .unwrap()
            .compile()
    }

    #[test]
    fn test_family_order() {
        let formula = compile(&[[1, 0, 1], [0, 1, 1], [1, 1, 0]], 2, 2, AllowedLosses::all(3));
        let families: Vec<ClauseFamily> = formula.groups().iter().map(|g| g.family).collect();
        assert_eq!(families, ClauseFamily::ALL.to_vec());
    }

    #[test]
    fn test_mutual_exclusion_shape() {
        let formula = compile(&[[1, 0, 1], [0, 1, 1], [1, 1, 0]], 2, 2, AllowedLosses::all(3));
        let map = VariableMap::allocate(crate::allocator::Dimensions {
            rows: 3,
            cols: 3,
            row_clusters: 2,
            col_clusters: 2,
        });
        let group = formula.group(ClauseFamily::MutualExclusion).unwrap();
        // (0, 0) observed 1: present unless a false positive.
        let fp = map.false_positive(0, 0).id() as i64;
        let two = map.is_two(0, 0).id() as i64;
        assert_eq!(group.clauses[0], vec![fp, -two]);
        // (0, 1) observed 0: present only as a false negative.
        let fn_ = map.false_negative(0, 1).id() as i64;
        let two = map.is_two(0, 1).id() as i64;
        assert_eq!(group.clauses[1], vec![-fn_, -two]);
    }

    #[test]
    fn test_forbidden_columns_get_units() {
        let allowed = AllowedLosses::from_indices(3, [0]).unwrap();
        let formula = compile(&[[1, 0, 1], [0, 1, 1], [1, 1, 0]], 1, 1, allowed);
        let group = formula.group(ClauseFamily::ForbiddenState).unwrap();
        assert_eq!(group.len(), 2 * 3 + 9);
        assert!(group.clauses.iter().all(|c| c.len() == 1 && c[0] < 0));
    }

    #[test]
    fn test_no_phylogeny_skips_dollo() {
        let matrix = BitMatrix::from_rows(&[[1u8, 0, 1], [0, 1, 1], [1, 1, 0]]).unwrap();
        let instance = Instance::with_all_losses(matrix, 2, 2).unwrap();
        let map = VariableMap::allocate(instance.dimensions());
        let config = EncoderConfig { phylogeny: false };
        let formula = Compiler::new(&instance, &map, &config).unwrap().compile();
        assert!(formula.group(ClauseFamily::DolloConflict).unwrap().is_empty());
    }

    #[test]
    fn test_map_mismatch_rejected() {
        let matrix = BitMatrix::from_rows(&[[1u8, 0, 1], [0, 1, 1]]).unwrap();
        let instance = Instance::with_all_losses(matrix, 2, 2).unwrap();
        let mut dims = instance.dimensions();
        dims.col_clusters = 3;
        let map = VariableMap::allocate(dims);
        let config = EncoderConfig::default();
        assert!(matches!(
            Compiler::new(&instance, &map, &config),
            Err(Error::AllocatorMappingMismatch(_))
        ));
    }

    #[test]
    fn test_compilation_is_deterministic() {
        let rows = [[1, 0, 1], [0, 1, 1], [1, 1, 0]];
        let a = compile(&rows, 2, 3, AllowedLosses::all(3));
        let b = compile(&rows, 2, 3, AllowedLosses::all(3));
        assert_eq!(a, b);
    }
}
