//! Shared application state for the web server.
//!
//! [`AppState`] is wrapped in an `Arc` and shared by every handler.

use std::sync::Arc;

use aquaquery_engine::QueryEngine;
use chrono::{DateTime, Utc};

use crate::WebConfig;

/// Shared state accessible from every Axum handler.
#[derive(Clone)]
pub struct AppState {
    /// The engine answering every query.
    pub engine: Arc<QueryEngine>,

    /// Web server configuration.
    pub config: WebConfig,

    /// When the server state was built, for uptime reporting.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(engine: Arc<QueryEngine>, config: WebConfig) -> Self {
        Self {
            engine,
            config,
            started_at: Utc::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        let secs = (Utc::now() - self.started_at).num_seconds();
        u64::try_from(secs).unwrap_or(0)
    }
}
