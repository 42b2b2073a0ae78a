//! Error types for graphrel.
//!
//! The taxonomy is deliberately small:
//!
//! - [`Error::Config`] — schema authoring mistakes (reserved names,
//!   unresolvable relationship pairs, conflicting pagination arguments).
//!   Fatal, surfaced immediately, never retried.
//! - [`Error::Executor`] — failures propagated from the external statement
//!   executor. The core does not interpret or retry them; a failed batch must
//!   not corrupt resolution of unrelated loaders.
//! - [`Error::Invariant`] — programming-error class failures (an ambiguous
//!   storage decision, a path hop with no resolved description). Fail loud,
//!   never silently default.

use std::fmt;

/// Convenient result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type shared by all graphrel crates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A schema or request authoring mistake. Fatal and not retryable.
    Config(String),
    /// A failure reported by the external statement executor.
    Executor(String),
    /// A broken internal invariant. Indicates a bug, not a runtime condition.
    Invariant(String),
}

impl Error {
    /// Create a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Create an executor error.
    #[must_use]
    pub fn executor(message: impl Into<String>) -> Self {
        Error::Executor(message.into())
    }

    /// Create an invariant-violation error.
    #[must_use]
    pub fn invariant(message: impl Into<String>) -> Self {
        Error::Invariant(message.into())
    }

    /// Whether this is a configuration error.
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Whether this error came from the statement executor.
    #[must_use]
    pub fn is_executor(&self) -> bool {
        matches!(self, Error::Executor(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "configuration error: {msg}"),
            Error::Executor(msg) => write!(f, "executor error: {msg}"),
            Error::Invariant(msg) => write!(f, "invariant violation: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
