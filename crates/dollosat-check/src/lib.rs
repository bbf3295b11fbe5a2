//! # dollosat-check
//!
//! Resource-bounded satisfiability pre-check.
//!
//! Sampling is delegated to external engines; this crate only answers "is
//! there any solution?" within a budget, and returns one model when there is.
//!
//! Implements:
//! - Boolean Constraint Propagation (BCP) over two watched literals
//! - Chronological DPLL backtracking with per-variable initial phases
//! - Conflict and decision budgets

pub mod bcp;
pub mod solver;

pub use solver::{CheckConfig, CheckSolver, SatResult, SolverStats};
