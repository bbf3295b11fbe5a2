//! Type system for dollosat.
//!
//! - `BoolVar` / `Literal` → 1-based boolean variables and signed literals
//! - `BitMatrix` → the observed 0/1 input matrix
//! - `CellState` / `StateMatrix` → corrected 0/1/2 matrices
//! - `AllowedLosses` → characters permitted to enter the loss state

mod bool_var;
mod losses;
mod matrix;

pub use bool_var::{BoolVar, Literal};
pub use losses::AllowedLosses;
pub use matrix::{BitMatrix, CellState, StateMatrix};

/// Unique identifier for a variable in a formula (DIMACS numbering, from 1).
pub type VarId = u64;
