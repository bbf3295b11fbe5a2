//! # dollosat-base
//!
//! Core types and utilities shared by every dollosat crate.
//!
//! This crate provides the foundational building blocks used across the
//! workspace, including:
//!
//! - **Literals**: 1-based boolean variables and signed literals in DIMACS form
//! - **Matrices**: observed bit matrices and corrected state matrices
//! - **Allowed losses**: the set of characters that may be lost
//! - **Error Types**: unified error handling across the workspace
//! - **Utilities**: unordered pair indexing

pub mod error;
pub mod types;
pub mod utils;

pub use error::{Error, Result};
pub use types::{AllowedLosses, BitMatrix, BoolVar, CellState, Literal, StateMatrix, VarId};
