//! # aquaquery-store
//!
//! Mutable state behind the AquaQuery engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  ResponseCache  (FIFO + TTL, 1 mutex)    │
//! ├─────────────────────────────────────────┤
//! │  SessionRegistry (DashMap of sessions)   │
//! │  ConversationContext (per session)       │
//! ├─────────────────────────────────────────┤
//! │  GroundwaterDataset (moka-memoized)      │
//! │  Clock (system / manual)                 │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Quick start
//!
//! ```
//! use aquaquery_store::{ConversationContext, ResponseCache};
//! use aquaquery_intent::Intent;
//!
//! let cache: ResponseCache<String> = ResponseCache::builder("responses")
//!     .capacity(100)
//!     .ttl_seconds(1800)
//!     .build()
//!     .unwrap();
//!
//! let mut ctx = ConversationContext::new();
//! ctx.update("Show me Punjab data", Intent::QueryLocation, Some("punjab"));
//! assert_eq!(ctx.last_location(), Some("punjab"));
//! # let _ = cache;
//! ```

pub mod cache;
pub mod clock;
pub mod context;
pub mod dataset;
pub mod error;
pub mod session;

// ── re-exports ───────────────────────────────────────────────────────

pub use cache::{CacheStats, ResponseCache, ResponseCacheBuilder};
pub use clock::{Clock, ManualClock, SystemClock};
pub use context::{ContextSnapshot, ConversationContext};
pub use dataset::{Category, GroundwaterDataset, GroundwaterRecord, LocationLookup};
pub use error::{StoreError, StoreResult};
pub use session::{SessionHandle, SessionRegistry};
