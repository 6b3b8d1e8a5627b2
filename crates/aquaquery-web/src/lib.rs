//! HTTP interface for AquaQuery.
//!
//! This crate exposes the query engine over a small JSON API:
//!
//! - `POST /api/chat` answers one question.
//! - `GET /api/status`, `GET /api/health` report liveness and counters.
//! - `GET /api/capabilities` lists the intent catalogue.
//! - `/api/sessions` creates, inspects and tears down conversations.
//!
//! A background task sweeps expired cache entries while the server runs.

pub mod api;
pub mod error;
pub mod server;
pub mod state;

use std::time::Duration;

use aquaquery_engine::EngineConfig;

pub use error::{WebError, WebResult};
pub use server::WebServer;
pub use state::AppState;

/// Web server configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// The address to bind the HTTP server to.
    pub bind_addr: String,
    /// The port to listen on.
    pub port: u16,
    /// How often expired cache entries are swept.
    pub sweep_interval: Duration,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".into(),
            port: 8080,
            sweep_interval: Duration::from_secs(300),
        }
    }
}

impl From<&EngineConfig> for WebConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            bind_addr: config.server.bind_addr.clone(),
            port: config.server.port,
            sweep_interval: Duration::from_secs(config.cache.sweep_interval_secs),
        }
    }
}
