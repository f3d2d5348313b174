//! Error types for the Refute test engine.

use thiserror::Error;

/// Main error type for Refute operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RefuteError {
    /// The property was falsified with a minimal counterexample.
    #[error("property falsified after {tests} tests and {shrinks} shrinks: {reason}")]
    Falsified {
        reason: String,
        tests: usize,
        shrinks: usize,
    },

    /// Too many test cases were discarded.
    #[error("gave up after {discards} discards ({tests} tests passed)")]
    GaveUp { discards: usize, tests: usize },

    /// An existential property exhausted its search budget with no witness.
    #[error("no witness found within the discard budget: {reason}")]
    NoWitness { reason: String },

    /// The property was expected to fail but never did.
    #[error("property was expected to fail but passed {tests} tests")]
    UnexpectedSuccess { tests: usize },

    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Result type for Refute operations.
pub type Result<T> = std::result::Result<T, RefuteError>;
