//! Main web server setup and startup.
//!
//! [`WebServer`] composes the Axum router, registers all routes, and starts
//! the HTTP listener.  While it runs, a background task periodically sweeps
//! expired entries out of the engine's response cache and drops idle
//! sessions.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use aquaquery_engine::QueryEngine;
use axum::Router;
use axum::http::Method;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::WebConfig;
use crate::api;
use crate::error::{WebError, WebResult};
use crate::state::AppState;

/// The AquaQuery web server.
pub struct WebServer {
    config: WebConfig,
    state: Arc<AppState>,
}

impl WebServer {
    /// Create a new web server around a shared engine.
    pub fn new(config: WebConfig, engine: Arc<QueryEngine>) -> Self {
        let state = Arc::new(AppState::new(engine, config.clone()));
        Self { config, state }
    }

    /// Return the `host:port` string this server will bind to.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.config.bind_addr, self.config.port)
    }

    /// Build the Axum router with all routes registered.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers(Any);

        Router::new()
            .route("/api/chat", post(api::chat))
            .route("/api/status", get(api::status))
            .route("/api/health", get(api::health))
            .route("/api/capabilities", get(api::capabilities))
            // Session management.
            .route(
                "/api/sessions",
                get(api::list_sessions).post(api::create_session),
            )
            .route(
                "/api/sessions/{id}",
                get(api::get_session).delete(api::delete_session),
            )
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(Arc::clone(&self.state))
    }

    /// Bind the configured address and serve until the process exits.
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP listener cannot be bound.
    pub async fn start(self) -> WebResult<()> {
        let addr = self.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| WebError::Bind { addr, source })?;
        self.serve(listener, std::future::pending()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> WebResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        let sweeper = spawn_sweeper(Arc::clone(&self.state.engine), self.config.sweep_interval);

        let local = listener.local_addr()?;
        tracing::info!(addr = %local, "starting web server");

        let served = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await;
        sweeper.abort();
        tracing::info!(addr = %local, "web server stopped");
        served.map_err(WebError::from)
    }
}

// ── sweeper ─────────────────────────────────────────────────────────

/// Sweep expired cache entries and idle sessions every `every`.
fn spawn_sweeper(engine: Arc<QueryEngine>, every: Duration) -> JoinHandle<()> {
    let every = every.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = engine.sweep_expired();
            if removed > 0 {
                tracing::info!(removed, "swept expired cache entries");
            }
            let idle = engine.sweep_idle_sessions();
            if idle > 0 {
                tracing::info!(idle, "swept idle sessions");
            }
        }
    })
}
