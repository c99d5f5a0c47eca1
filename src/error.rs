//! Unified error types for signupdb.
//!
//! Every fallible operation returns [`Result`]; nothing is retried
//! internally. Callers decide whether a failure is worth another attempt.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// All signupdb errors.
///
/// This is the canonical error type for store, query, and service
/// operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Document (or sign-up record) not found.
    ///
    /// `get` and `cancel_join` targets surface this; `patch` on a missing
    /// document deliberately does not (it is a silent no-op instead).
    #[error("not found: {0}")]
    NotFound(String),

    /// Cancellation attempted after the activity's cancellation cutoff.
    #[error("cancellation deadline passed at {deadline}")]
    DeadlinePassed {
        /// The activity's cancellation cutoff.
        deadline: DateTime<Utc>,
    },

    /// Malformed query constraint (unrecognized filter operator, wrong
    /// operand shape).
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The persistence backing is unavailable or holds data we cannot
    /// interpret. Fatal to the operation, never silently retried.
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization error while encoding/decoding a collection.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the file backing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for signupdb operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Check if this is a deadline-passed error.
    pub fn is_deadline_passed(&self) -> bool {
        matches!(self, Error::DeadlinePassed { .. })
    }

    /// Check if the persistence backing itself failed.
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Storage(_) | Error::Io(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
