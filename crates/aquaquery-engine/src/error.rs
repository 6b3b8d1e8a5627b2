//! Engine error types.
//!
//! Most failures never leave [`crate::QueryEngine::process_query`]: they are
//! folded into a rejected or failed [`crate::QueryResult`].  [`EngineError`]
//! is returned by construction and configuration paths and carried inside
//! those results for logging.

/// Unified error type for the engine crate.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The query was empty or contained only whitespace.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Caching is disabled or the cache could not be built.
    #[error("response cache unavailable")]
    CacheUnavailable,

    /// The session's context could not be used for this request.
    #[error("session {session_id} unavailable: {reason}")]
    SessionUnavailable { session_id: String, reason: String },

    /// Configuration was unreadable or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// An error from the query understanding layer.
    #[error(transparent)]
    Intent(#[from] aquaquery_intent::IntentError),

    /// An error from the state layer.
    #[error(transparent)]
    Store(#[from] aquaquery_store::StoreError),
}

/// Convenience alias used throughout the engine crate.
pub type Result<T> = std::result::Result<T, EngineError>;
