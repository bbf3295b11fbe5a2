//! Unified error types for dollosat.

use thiserror::Error;

/// The main error type for dollosat operations.
#[derive(Debug, Error)]
pub enum Error {
    /// An input file or value is not well formed.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A cluster count is zero or larger than the dimension it clusters.
    #[error("Invalid cluster count: {requested} {axis} clusters requested, {available} {axis} available")]
    InvalidClusterCount {
        axis: &'static str,
        requested: usize,
        available: usize,
    },

    /// The variable map does not belong to the matrix or assignment at hand.
    #[error("Variable map mismatch: {0}")]
    AllocatorMappingMismatch(String),

    /// An assignment breaks an invariant the formula is supposed to enforce.
    #[error("Inconsistent assignment: {0}")]
    InconsistentAssignment(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Returns whether the error only concerns a single decoded sample.
    ///
    /// Batch decoding skips such samples and keeps going.
    #[must_use]
    pub fn is_per_sample(&self) -> bool {
        matches!(
            self,
            Self::AllocatorMappingMismatch(_) | Self::InconsistentAssignment(_)
        )
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_count_message() {
        let err = Error::InvalidClusterCount {
            axis: "row",
            requested: 5,
            available: 3,
        };
        assert_eq!(
            err.to_string(),
            "Invalid cluster count: 5 row clusters requested, 3 row available"
        );
    }

    #[test]
    fn test_per_sample_errors() {
        assert!(Error::InconsistentAssignment("x".into()).is_per_sample());
        assert!(Error::AllocatorMappingMismatch("x".into()).is_per_sample());
        assert!(!Error::MalformedInput("x".into()).is_per_sample());
    }
}
