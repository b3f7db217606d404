//! Error types shared by every stage of the pipeline.

use thiserror::Error;

/// Errors raised by the solver core.
///
/// Configuration and parse errors are caller mistakes and are reported before
/// any numeric work starts. Logic errors indicate an internal contract
/// violation (for example a strategy pair missing from the payoff table).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// Malformed or inconsistent input.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Malformed strategy label or preset text.
    #[error("parse error: {0}")]
    Parse(String),

    /// Internal invariant violated.
    #[error("logic error: {0}")]
    Logic(String),
}

impl SolverError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        SolverError::Configuration(msg.into())
    }

    pub(crate) fn parse(msg: impl Into<String>) -> Self {
        SolverError::Parse(msg.into())
    }

    pub(crate) fn logic(msg: impl Into<String>) -> Self {
        SolverError::Logic(msg.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SolverError>;
