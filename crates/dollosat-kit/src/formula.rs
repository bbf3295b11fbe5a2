//! Formula assembly and serialization.

use dollosat_base::Result;
use dollosat_check::{CheckConfig, CheckSolver, SatResult};
use dollosat_format::{DimacsCnf, DimacsWriter};
use std::io::Write;

use crate::assignment::Assignment;
use crate::compiler::{Clause, ClauseFamily, ClauseGroup};

/// A clause not satisfied by an assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FalsifiedClause {
    pub family: ClauseFamily,
    /// Position within the family's group.
    pub index: usize,
    pub clause: Clause,
}

/// The assembled CNF formula: clause groups in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    num_vars: usize,
    groups: Vec<ClauseGroup>,
}

impl Formula {
    /// Assembles a formula from clause groups.
    pub fn new(num_vars: usize, groups: Vec<ClauseGroup>) -> Self {
        Self { num_vars, groups }
    }

    /// Number of variables.
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Total number of clauses.
    pub fn num_clauses(&self) -> usize {
        self.groups.iter().map(ClauseGroup::len).sum()
    }

    /// The clause groups.
    pub fn groups(&self) -> &[ClauseGroup] {
        &self.groups
    }

    /// The group of one family.
    pub fn group(&self, family: ClauseFamily) -> Option<&ClauseGroup> {
        self.groups.iter().find(|g| g.family == family)
    }

    /// All clauses in emission order.
    pub fn clauses(&self) -> impl Iterator<Item = &Clause> + '_ {
        self.groups.iter().flat_map(|g| g.clauses.iter())
    }

    /// Streams the formula as DIMACS CNF.
    ///
    /// UniGen needs the `p cnf` header, QuickSampler is fed clause lines only.
    pub fn write_dimacs<W: Write>(&self, writer: W, header: bool) -> Result<()> {
        let mut out = DimacsWriter::new(writer);
        if header {
            out.header(self.num_vars, self.num_clauses())?;
        }
        for clause in self.clauses() {
            out.clause(clause)?;
        }
        tracing::debug!("Wrote {} clauses", out.clauses_written());
        out.finish()
    }

    /// Renders the formula as DIMACS text.
    pub fn to_dimacs(&self, header: bool) -> Result<String> {
        let mut out = Vec::new();
        self.write_dimacs(&mut out, header)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Flattens the formula into a plain DIMACS value.
    pub fn to_cnf(&self) -> DimacsCnf {
        DimacsCnf {
            num_vars: self.num_vars,
            clauses: self.clauses().cloned().collect(),
        }
    }

    /// Finds the first clause the assignment does not satisfy.
    ///
    /// Unassigned variables satisfy nothing.
    pub fn evaluate(&self, assignment: &Assignment) -> Option<FalsifiedClause> {
        self.groups.iter().find_map(|group| {
            group
                .clauses
                .iter()
                .position(|clause| !clause.iter().any(|&lit| assignment.dimacs(lit) == Some(true)))
                .map(|index| FalsifiedClause {
                    family: group.family,
                    index,
                    clause: group.clauses[index].clone(),
                })
        })
    }

    /// Runs the bounded pre-check.
    ///
    /// Every variable is tried false first: no error indicator is set, so the
    /// search starts from the observed matrix without losses.
    pub fn precheck(&self, config: &CheckConfig) -> SatResult {
        let mut solver = CheckSolver::new(self.num_vars, self.clauses().cloned())
            .with_config(config.clone())
            .with_phases(&vec![false; self.num_vars]);
        let result = solver.solve();
        match &result {
            SatResult::Sat(_) => tracing::info!("Pre-check found a model"),
            SatResult::Unsat => tracing::info!("Pre-check proved the formula unsatisfiable"),
            SatResult::Unknown(reason) => tracing::warn!("Pre-check gave up: {}", reason),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formula() -> Formula {
        Formula::new(
            3,
            vec![
                ClauseGroup {
                    family: ClauseFamily::MutualExclusion,
                    clauses: vec![vec![-1, -2]],
                },
                ClauseGroup {
                    family: ClauseFamily::AtLeastOne,
                    clauses: vec![vec![1, 3], vec![2, 3]],
                },
            ],
        )
    }

    #[test]
    fn test_counts() {
        let f = formula();
        assert_eq!(f.num_clauses(), 3);
        assert_eq!(f.group(ClauseFamily::AtLeastOne).unwrap().len(), 2);
        assert!(f.group(ClauseFamily::DolloConflict).is_none());
    }

    #[test]
    fn test_dimacs_header_optional() {
        let f = formula();
        assert_eq!(f.to_dimacs(true).unwrap(), "p cnf 3 3\n-1 -2 0\n1 3 0\n2 3 0\n");
        assert_eq!(f.to_dimacs(false).unwrap(), "-1 -2 0\n1 3 0\n2 3 0\n");
        assert_eq!(DimacsCnf::parse(&f.to_dimacs(true).unwrap()).unwrap(), f.to_cnf());
    }

    #[test]
    fn test_evaluate_reports_first_falsified() {
        let f = formula();
        let good = Assignment::from_literals(3, &[1, -2, 3]).unwrap();
        assert_eq!(f.evaluate(&good), None);

        let bad = Assignment::from_literals(3, &[1, -2, -3]).unwrap();
        let falsified = f.evaluate(&bad).unwrap();
        assert_eq!(falsified.family, ClauseFamily::AtLeastOne);
        assert_eq!(falsified.index, 1);
        assert_eq!(falsified.clause, vec![2, 3]);
    }

    #[test]
    fn test_precheck_model_satisfies_formula() {
        let f = formula();
        let SatResult::Sat(model) = f.precheck(&CheckConfig::default()) else {
            panic!("expected a model");
        };
        assert_eq!(f.evaluate(&Assignment::from_model(&model)), None);
    }
}
