//! Error types for the aquaquery-store crate.
//!
//! All store operations return [`StoreError`] via [`StoreResult`].

use thiserror::Error;

/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the state layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An invalid argument was provided to a store operation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A session's context lock was poisoned by a panicking writer.
    #[error("session {id} is unavailable: context lock poisoned")]
    SessionPoisoned { id: String },

    /// The requested record was not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
}
