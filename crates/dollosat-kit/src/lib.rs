//! # dollosat-kit
//!
//! Compiles the clustered 1-Dollo reconstruction problem into CNF and
//! decodes satisfying assignments back into matrices.
//!
//! This crate provides:
//! - Variable allocation ([`VariableMap`]), persisted as JSON
//! - Clause generation per constraint family ([`Compiler`])
//! - Formula assembly and DIMACS output ([`Formula`])
//! - Decoding of sampler output ([`Decoder`])
//!
//! # Example
//!
//! ```no_run
//! use dollosat_kit::*;
//!
//! # fn main() -> dollosat_kit::Result<()> {
//! let matrix = BitMatrix::from_rows(&[[1u8, 1, 0], [1, 0, 0], [0, 0, 1]])?;
//! let instance = Instance::with_all_losses(matrix, 2, 2)?;
//! let encoding = encode(&instance, &EncoderConfig::default())?;
//!
//! let mut cnf = Vec::new();
//! encoding.formula.write_dimacs(&mut cnf, true)?;
//! # Ok(())
//! # }
//! ```

pub mod allocator;
pub mod assignment;
pub mod cell;
pub mod compiler;
pub mod config;
pub mod decoder;
pub mod formula;
pub mod instance;
pub mod witness;

// Re-export core types
pub use dollosat_base::{AllowedLosses, BitMatrix, CellState, StateMatrix};
pub use dollosat_base::{Error, Result};
pub use dollosat_check::{CheckConfig, SatResult};

pub use allocator::{Category, CategoryRange, Dimensions, VariableMap};
pub use assignment::Assignment;
pub use compiler::{Clause, ClauseFamily, ClauseGroup, Compiler};
pub use config::EncoderConfig;
pub use decoder::{Decoder, Reconstruction};
pub use formula::{FalsifiedClause, Formula};
pub use instance::Instance;

/// A compiled instance: the formula and the map needed to decode it.
#[derive(Debug, Clone)]
pub struct Encoding {
    pub map: VariableMap,
    pub formula: Formula,
}

/// Allocates variables for an instance and compiles its formula.
pub fn encode(instance: &Instance, config: &EncoderConfig) -> Result<Encoding> {
    let map = VariableMap::allocate(instance.dimensions());
    tracing::debug!("Allocated {} variables", map.num_vars());
    let formula = Compiler::new(instance, &map, config)?.compile();
    Ok(Encoding { map, formula })
}
