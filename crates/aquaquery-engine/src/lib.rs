//! # aquaquery-engine
//!
//! The facade every transport talks to.  A [`QueryEngine`] owns the pattern
//! scorer, the location extractor, the session registry and the response
//! cache, and turns a raw question into a [`QueryResult`].
//!
//! ```
//! use aquaquery_engine::{QueryEngine, QueryOutcome};
//! use aquaquery_intent::Intent;
//!
//! let engine = QueryEngine::builder().build().unwrap();
//! let result = engine.process_query("Hello", Some("demo"));
//! assert_eq!(result.intent, Intent::Greeting);
//! assert_eq!(result.outcome, QueryOutcome::Completed);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod render;
pub mod stats;

// ── re-exports ───────────────────────────────────────────────────────

pub use config::EngineConfig;
pub use engine::{
    CACHE_WRITE_THRESHOLD, CLARIFICATION_THRESHOLD, DEFAULT_SESSION_ID, QueryEngine,
    QueryEngineBuilder, QueryOutcome, QueryResult, QueryStage,
};
pub use error::{EngineError, Result};
pub use render::{ResponseRenderer, TemplateRenderer};
pub use stats::{EngineStats, StatsSnapshot};
