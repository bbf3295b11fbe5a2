//! # dollosat-format
//!
//! File format parsing and serialization for dollosat.
//!
//! Supports:
//! - **Matrix**: observed 0/1 input matrices with a two-line size header
//! - **Allowed losses**: one comma-separated line of column indices
//! - **DIMACS CNF**: formulas for external samplers, header optional
//! - **Samples**: sampler output lines normalized to assignments
//! - **Solutions**: decoded clustered matrices, one block per sample

pub mod dimacs;
pub mod losses;
pub mod matrix;
pub mod samples;
pub mod solutions;

pub use dimacs::{DimacsCnf, DimacsWriter};
pub use losses::{parse_allowed_losses, read_allowed_losses};
pub use matrix::{parse_matrix, read_matrix};
pub use samples::{SampleBody, SampleLine};
pub use solutions::SolutionWriter;
