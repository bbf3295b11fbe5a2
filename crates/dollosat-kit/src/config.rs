//! Encoder configuration.

use serde::{Deserialize, Serialize};

/// Options that shape the compiled formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Emit the 1-Dollo conflict clauses. Without them the formula only
    /// clusters and corrects; the family is cubic in the number of rows.
    pub phylogeny: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self { phylogeny: true }
    }
}
