//! Bounded DPLL solver.

use dollosat_format::DimacsCnf;

use crate::bcp::{PropagationQueue, WatchedLiterals};

/// The result of a pre-check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SatResult {
    /// Satisfiable with a model; index `k` holds the value of variable `k + 1`.
    Sat(Vec<bool>),
    /// Unsatisfiable.
    Unsat,
    /// Unknown (resource limit reached).
    Unknown(String),
}

impl SatResult {
    /// Whether a model was found.
    #[must_use]
    pub fn is_sat(&self) -> bool {
        matches!(self, Self::Sat(_))
    }
}

/// Budget for the pre-check.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// Conflicts allowed before giving up.
    pub max_conflicts: u64,
    /// Decisions allowed before giving up.
    pub max_decisions: u64,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            max_conflicts: 100_000,
            max_decisions: 1_000_000,
        }
    }
}

/// Solver statistics.
#[derive(Debug, Clone, Default)]
pub struct SolverStats {
    /// Number of decisions made.
    pub decisions: u64,
    /// Number of conflicts encountered.
    pub conflicts: u64,
    /// Number of propagated literals.
    pub propagations: u64,
}

/// A decision point on the trail.
#[derive(Debug, Clone, Copy)]
struct Decision {
    /// The decided literal.
    literal: i64,
    /// Trail length before the decision.
    trail_pos: usize,
    /// Whether this is already the second branch.
    flipped: bool,
}

/// DPLL solver with watched literals and chronological backtracking.
pub struct CheckSolver {
    /// Number of variables.
    num_vars: usize,
    /// Clauses with at least two literals; positions 0 and 1 are watched.
    clauses: Vec<Vec<i64>>,
    /// Unit clauses, asserted at level 0.
    units: Vec<i64>,
    /// Set when an empty clause was added.
    has_empty_clause: bool,
    watches: WatchedLiterals,
    /// Current variable assignments (None = unassigned).
    assignments: Vec<Option<bool>>,
    trail: PropagationQueue,
    decisions: Vec<Decision>,
    /// Value tried first when branching on each variable.
    phases: Vec<bool>,
    config: CheckConfig,
    stats: SolverStats,
}

fn lit_value(assignments: &[Option<bool>], lit: i64) -> Option<bool> {
    let var = lit.unsigned_abs() as usize - 1;
    assignments[var].map(|v| v == (lit > 0))
}

impl CheckSolver {
    /// Creates a solver over `num_vars` variables.
    ///
    /// Literals beyond `num_vars` grow the variable count. Tautologies are
    /// dropped and duplicate literals merged.
    pub fn new(num_vars: usize, clauses: impl IntoIterator<Item = Vec<i64>>) -> Self {
        let mut kept = Vec::new();
        let mut units = Vec::new();
        let mut has_empty_clause = false;
        let mut num_vars = num_vars;

        for mut clause in clauses {
            clause.sort_unstable_by_key(|l| (l.unsigned_abs(), *l < 0));
            clause.dedup();
            if clause.windows(2).any(|w| w[0] == -w[1]) {
                continue;
            }
            if let Some(max) = clause.iter().map(|l| l.unsigned_abs() as usize).max() {
                num_vars = num_vars.max(max);
            }
            match clause.len() {
                0 => has_empty_clause = true,
                1 => units.push(clause[0]),
                _ => kept.push(clause),
            }
        }

        let mut watches = WatchedLiterals::new(num_vars);
        for (id, clause) in kept.iter().enumerate() {
            watches.add_watch(clause[0], id, clause[1]);
            watches.add_watch(clause[1], id, clause[0]);
        }

        Self {
            num_vars,
            clauses: kept,
            units,
            has_empty_clause,
            watches,
            assignments: vec![None; num_vars],
            trail: PropagationQueue::new(),
            decisions: Vec::new(),
            phases: vec![false; num_vars],
            config: CheckConfig::default(),
            stats: SolverStats::default(),
        }
    }

    /// Creates a solver from a parsed DIMACS formula.
    pub fn from_dimacs(cnf: &DimacsCnf) -> Self {
        Self::new(cnf.num_vars, cnf.clauses.iter().cloned())
    }

    /// Sets the budget.
    #[must_use]
    pub fn with_config(mut self, config: CheckConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the value tried first for each variable (index `k` is variable `k + 1`).
    ///
    /// Missing entries default to `false`.
    #[must_use]
    pub fn with_phases(mut self, phases: &[bool]) -> Self {
        for (slot, &phase) in self.phases.iter_mut().zip(phases) {
            *slot = phase;
        }
        self
    }

    /// Number of variables.
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Runs the search until a model, a refutation, or the budget runs out.
    pub fn solve(&mut self) -> SatResult {
        let result = self.search();
        tracing::debug!(
            "Pre-check finished after {} decisions, {} conflicts, {} propagations",
            self.stats.decisions,
            self.stats.conflicts,
            self.stats.propagations
        );
        result
    }

    fn search(&mut self) -> SatResult {
        if self.has_empty_clause {
            return SatResult::Unsat;
        }
        for unit in std::mem::take(&mut self.units) {
            match lit_value(&self.assignments, unit) {
                Some(false) => return SatResult::Unsat,
                Some(true) => {}
                None => self.assign(unit),
            }
        }
        if self.propagate().is_some() {
            return SatResult::Unsat;
        }

        loop {
            let Some(var) = self.pick_branch_variable() else {
                return SatResult::Sat(self.extract_model());
            };
            if self.stats.decisions >= self.config.max_decisions {
                return SatResult::Unknown(format!(
                    "decision budget of {} exhausted",
                    self.config.max_decisions
                ));
            }
            self.stats.decisions += 1;
            let lit = (var + 1) as i64;
            self.decide(if self.phases[var] { lit } else { -lit }, false);

            while self.propagate().is_some() {
                self.stats.conflicts += 1;
                if self.stats.conflicts >= self.config.max_conflicts {
                    return SatResult::Unknown(format!(
                        "conflict budget of {} exhausted",
                        self.config.max_conflicts
                    ));
                }
                if !self.backtrack_and_flip() {
                    return SatResult::Unsat;
                }
            }
        }
    }

    fn assign(&mut self, lit: i64) {
        let var = lit.unsigned_abs() as usize - 1;
        self.assignments[var] = Some(lit > 0);
        self.trail.enqueue(lit);
    }

    fn decide(&mut self, lit: i64, flipped: bool) {
        self.decisions.push(Decision {
            literal: lit,
            trail_pos: self.trail.trail_len(),
            flipped,
        });
        self.assign(lit);
    }

    /// Undoes decisions until one can be flipped. Returns false when the
    /// search space is exhausted.
    fn backtrack_and_flip(&mut self) -> bool {
        while let Some(decision) = self.decisions.pop() {
            for &lit in self.trail.since(decision.trail_pos) {
                self.assignments[lit.unsigned_abs() as usize - 1] = None;
            }
            self.trail.truncate(decision.trail_pos);
            if !decision.flipped {
                self.decide(-decision.literal, true);
                return true;
            }
        }
        false
    }

    /// Performs BCP and returns a conflict clause if one is found.
    fn propagate(&mut self) -> Option<usize> {
        while let Some(p) = self.trail.dequeue() {
            self.stats.propagations += 1;
            let false_lit = -p;
            let watchers = std::mem::take(self.watches.get_watches_mut(false_lit));
            let mut kept = Vec::with_capacity(watchers.len());
            let mut conflict = None;

            for watch in watchers {
                if conflict.is_some()
                    || lit_value(&self.assignments, watch.blocker) == Some(true)
                {
                    kept.push(watch);
                    continue;
                }

                let clause = &mut self.clauses[watch.clause_id];
                if clause[0] == false_lit {
                    clause.swap(0, 1);
                }
                let first = clause[0];
                if lit_value(&self.assignments, first) == Some(true) {
                    kept.push(crate::bcp::Watch {
                        clause_id: watch.clause_id,
                        blocker: first,
                    });
                    continue;
                }

                let replacement = (2..clause.len())
                    .find(|&k| lit_value(&self.assignments, clause[k]) != Some(false));
                if let Some(k) = replacement {
                    clause.swap(1, k);
                    self.watches.add_watch(clause[1], watch.clause_id, first);
                    continue;
                }

                kept.push(watch);
                match lit_value(&self.assignments, first) {
                    Some(false) => conflict = Some(watch.clause_id),
                    _ => self.assign(first),
                }
            }

            self.watches.get_watches_mut(false_lit).extend(kept);
            if conflict.is_some() {
                return conflict;
            }
        }
        None
    }

    /// Picks the lowest-numbered unassigned variable.
    fn pick_branch_variable(&self) -> Option<usize> {
        self.assignments.iter().position(Option::is_none)
    }

    /// Extracts the model (variable assignments).
    fn extract_model(&self) -> Vec<bool> {
        self.assignments
            .iter()
            .map(|a| a.unwrap_or(false))
            .collect()
    }

    /// Returns solver statistics.
    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tautology_dropped() {
        let solver = CheckSolver::new(2, vec![vec![1, -1, 2]]);
        assert!(solver.clauses.is_empty());
        assert!(solver.units.is_empty());
    }

    #[test]
    fn test_duplicate_literals_merged() {
        let solver = CheckSolver::new(2, vec![vec![2, 2]]);
        assert_eq!(solver.units, vec![2]);
    }

    #[test]
    fn test_phase_is_tried_first() {
        let mut solver = CheckSolver::new(2, Vec::<Vec<i64>>::new()).with_phases(&[true, false]);
        assert_eq!(solver.solve(), SatResult::Sat(vec![true, false]));
    }
}
