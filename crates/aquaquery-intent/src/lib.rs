//! Query understanding for AquaQuery.
//!
//! This crate turns free-text groundwater questions into structured signals:
//!
//! - **Normalization**: lowercasing, tokenization and stop-word filtering via
//!   [`text::normalize`].
//! - **Similarity**: edit-distance, character-set and length-ratio metrics in
//!   [`similarity`], combined into the fuzzy token score used for matching.
//! - **Intent scoring**: a fixed table of [`patterns::IntentPattern`]s scored
//!   by [`scorer::PatternScorer`] using exact, synonym, fuzzy, bigram, context
//!   and coverage signals.
//! - **Location extraction**: state / district / block lookup against static
//!   gazetteers via [`location::LocationExtractor`].
//!
//! Everything here is synchronous, allocation-light and free of shared
//! mutable state, so a single scorer and extractor can be shared across
//! threads behind an `Arc`.

pub mod error;
pub mod intent;
pub mod location;
pub mod patterns;
pub mod scorer;
pub mod similarity;
pub mod text;

pub use error::{IntentError, Result};
pub use intent::Intent;
pub use location::{ExtractedLocation, Gazetteer, LocationExtractor};
pub use patterns::{IntentPattern, PATTERNS};
pub use scorer::{ContextSignals, GLOBAL_CONFIDENCE_FLOOR, PatternScorer, ScoredResult};
pub use text::{NormalizedText, normalize};
