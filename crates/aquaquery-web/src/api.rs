//! REST API route handlers.
//!
//! Every handler is a thin adapter over [`aquaquery_engine::QueryEngine`].
//! The engine is synchronous and serializes turns of one session behind a
//! lock, so chat queries run on the blocking pool.

use std::sync::Arc;

use aquaquery_engine::render::FAILURE_MESSAGE;
use aquaquery_engine::{QueryOutcome, StatsSnapshot};
use aquaquery_intent::Intent;
use aquaquery_intent::patterns::pattern_for;
use aquaquery_store::{CacheStats, StoreError};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::state::AppState;

/// Longest message the chat endpoint accepts, in characters.
pub const MAX_MESSAGE_CHARS: usize = 1000;

// ---------------------------------------------------------------------------
// POST /api/chat
// ---------------------------------------------------------------------------

/// Request body for the chat endpoint.
#[derive(Debug, Deserialize)]
pub struct ChatBody {
    /// The user's question.
    pub message: String,
    /// Conversation to continue.  Without one the query is anonymous and
    /// never cached.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Answer one question.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatBody>,
) -> (StatusCode, Json<Value>) {
    if body.message.chars().count() > MAX_MESSAGE_CHARS {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": format!("Message too long (max {MAX_MESSAGE_CHARS} characters)"),
            })),
        );
    }

    let ChatBody {
        message,
        session_id,
    } = body;
    let engine = Arc::clone(&state.engine);
    let query_session = session_id.clone();
    let joined = tokio::task::spawn_blocking(move || {
        engine.process_query(&message, query_session.as_deref())
    })
    .await;

    let result = match joined {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(?session_id, error = %e, "chat worker panicked");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": FAILURE_MESSAGE })),
            );
        }
    };

    match result.outcome {
        QueryOutcome::Completed => (StatusCode::OK, Json(json!(result))),
        QueryOutcome::Rejected => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": result.message, "result": result })),
        ),
        QueryOutcome::Failed => {
            tracing::error!(?session_id, "chat request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": result.message })),
            )
        }
    }
}

// ---------------------------------------------------------------------------
// GET /api/status, GET /api/health
// ---------------------------------------------------------------------------

/// Response payload for the `/api/status` endpoint.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub intent_count: usize,
    pub pattern_count: usize,
    pub sessions: usize,
    pub requests: StatsSnapshot,
    /// Absent when caching is disabled.
    pub cache: Option<CacheStats>,
    pub dataset: DatasetSummary,
}

#[derive(Debug, Serialize)]
pub struct DatasetSummary {
    pub total_states: usize,
    pub total_assessments: usize,
    pub critical_blocks: usize,
    pub latest_year: Option<u16>,
}

/// System status and counters.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let engine = &state.engine;
    let dataset = engine.dataset();

    Json(StatusResponse {
        status: "online",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_seconds(),
        intent_count: Intent::ALL.len(),
        pattern_count: engine.scorer().patterns().len(),
        sessions: engine.sessions().len(),
        requests: engine.stats(),
        cache: engine.cache_stats(),
        dataset: DatasetSummary {
            total_states: dataset.total_states(),
            total_assessments: dataset.total_assessments(),
            critical_blocks: dataset.critical_block_count(),
            latest_year: dataset.latest_year(),
        },
    })
}

/// Liveness check.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// GET /api/capabilities
// ---------------------------------------------------------------------------

/// One entry of the intent catalogue.
#[derive(Debug, Serialize)]
pub struct IntentInfo {
    pub name: &'static str,
    pub label: &'static str,
    /// Whether the scorer can produce this intent directly.
    pub scored: bool,
    pub examples: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct CapabilitiesResponse {
    pub total_intents: usize,
    pub intents: Vec<IntentInfo>,
}

/// The intent catalogue with example questions.
pub async fn capabilities() -> Json<CapabilitiesResponse> {
    let intents: Vec<IntentInfo> = Intent::ALL
        .iter()
        .filter(|intent| !intent.is_fallback())
        .map(|&intent| {
            let pattern = pattern_for(intent);
            IntentInfo {
                name: intent.name(),
                label: intent.label(),
                scored: pattern.is_some(),
                examples: pattern.map(|p| p.examples).unwrap_or_default(),
            }
        })
        .collect();

    Json(CapabilitiesResponse {
        total_intents: intents.len(),
        intents,
    })
}

// ---------------------------------------------------------------------------
// Session management endpoints
// ---------------------------------------------------------------------------

/// POST /api/sessions: allocate a fresh session id.
pub async fn create_session(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let id = uuid::Uuid::now_v7().to_string();
    state.engine.sessions().get_or_create(&id);
    (StatusCode::CREATED, Json(json!({ "session_id": id })))
}

/// GET /api/sessions: list live session ids.
pub async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<Value> {
    let mut ids = state.engine.sessions().list_ids();
    ids.sort();
    Json(json!({ "sessions": ids }))
}

/// GET /api/sessions/{id}: the session's conversation context.
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    match state.engine.sessions().snapshot(&id) {
        Ok(snapshot) => (StatusCode::OK, Json(json!(snapshot))),
        Err(e @ StoreError::NotFound { .. }) => {
            (StatusCode::NOT_FOUND, Json(json!({ "error": e.to_string() })))
        }
        Err(e) => {
            tracing::warn!(session_id = %id, error = %e, "session snapshot failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        }
    }
}

/// DELETE /api/sessions/{id}: tear down a session and its cached answers.
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    if state.engine.end_session(&id) {
        (StatusCode::OK, Json(json!({ "deleted": true })))
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("session {id} not found") })),
        )
    }
}
