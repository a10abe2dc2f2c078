//! Error types for the TSP benchmark.
//!
//! Only input and configuration validation can reject a run. Once the GA has
//! started it always produces a result, except when an operator breaks the
//! permutation invariant, which is a defect and aborts the run.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TspError>;

/// Unified error type.
#[derive(Debug, Error)]
pub enum TspError {
    /// The city set cannot be used (too few cities, non-finite coordinates,
    /// too large for an exact enumeration).
    #[error("invalid instance: {0}")]
    InvalidInstance(String),

    /// A run parameter is out of range or names an unknown operator.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An operator produced something that is not a permutation of `0..n`.
    #[error("{operator} produced a non-permutation {child:?} from {parent1:?} and {parent2:?}")]
    PermutationInvariantViolation {
        /// Name of the offending operator (e.g. `"PMX"`).
        operator: &'static str,
        /// First parent tour.
        parent1: Vec<usize>,
        /// Second parent tour.
        parent2: Vec<usize>,
        /// The invalid child.
        child: Vec<usize>,
    },

    /// Malformed line in an instance file.
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl TspError {
    /// Shorthand for [`TspError::InvalidConfiguration`].
    pub(crate) fn config(message: impl Into<String>) -> Self {
        TspError::InvalidConfiguration(message.into())
    }

    /// Shorthand for [`TspError::InvalidInstance`].
    pub(crate) fn instance(message: impl Into<String>) -> Self {
        TspError::InvalidInstance(message.into())
    }
}
