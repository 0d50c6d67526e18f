//! Error types for rosefuzz.

use thiserror::Error;

/// Errors raised while building or sampling generators.
///
/// Predicate failures are not errors: they are recorded in the run's
/// report as [`crate::property::Failure`] values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FuzzError {
    /// A filter could not be satisfied within its retry budget.
    #[error("Could not satisfy filter in {tries} tries")]
    GenerationExhausted { tries: usize },

    /// A generator description could not be reconstructed.
    #[error("Malformed generator description: {message}")]
    StructuralMismatch { message: String },

    /// Invalid generator construction.
    #[error("Invalid generator: {message}")]
    InvalidGenerator { message: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Result type for rosefuzz operations.
pub type Result<T> = std::result::Result<T, FuzzError>;
