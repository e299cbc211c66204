//! Store error taxonomy.

use std::time::Duration;

use thiserror::Error;

/// Result alias used by every store operation.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures the persistence layer can report.
///
/// The first three variants carry domain meaning and map to client errors at
/// the HTTP boundary; the rest are infrastructure faults.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write referenced a category that does not exist.
    #[error("unknown category")]
    UnknownCategory,

    /// The targeted row does not exist.
    #[error("not found")]
    NotFound,

    /// The requested username is already taken.
    #[error("username already exists")]
    DuplicateUsername,

    /// The backend misbehaved (connectivity, SQL fault, poisoned lock).
    #[error("storage backend error: {0}")]
    Backend(#[source] anyhow::Error),

    /// The operation did not complete within its deadline.
    #[error("storage operation timed out after {0:?}")]
    Timeout(Duration),

    /// Stored data could not be decoded into domain types.
    #[error("corrupt stored data: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn backend(err: impl Into<anyhow::Error>) -> Self {
        StoreError::Backend(err.into())
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        StoreError::Corrupt(message.into())
    }
}
