//! Query understanding error types.
//!
//! All intent subsystems surface errors through [`IntentError`].  Scoring
//! itself never fails; errors only arise from rejected input and from
//! building the gazetteer automata.

/// Unified error type for the intent crate.
#[derive(Debug, thiserror::Error)]
pub enum IntentError {
    /// The query was empty or contained only whitespace.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// A gazetteer could not be compiled into a search automaton.
    #[error("failed to build {kind} gazetteer: {reason}")]
    GazetteerBuild { kind: &'static str, reason: String },
}

/// Convenience alias used throughout the intent crate.
pub type Result<T> = std::result::Result<T, IntentError>;
