//! Shared startup helpers.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use aquaquery_engine::config::LoggingConfig;
use aquaquery_engine::{EngineConfig, QueryEngine, QueryResult};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Initialize the global tracing subscriber.  `RUST_LOG` wins over the
/// configured level.  Logs go to stderr so stdout stays clean for answers.
pub fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if logging.json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}

// ---------------------------------------------------------------------------
// Config and engine
// ---------------------------------------------------------------------------

/// Load the configuration file and apply environment overrides.
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    EngineConfig::load(Some(path))
        .with_context(|| format!("failed to load configuration from {}", path.display()))
}

pub fn build_engine(config: &EngineConfig) -> Result<Arc<QueryEngine>> {
    let engine = QueryEngine::from_config(config).context("failed to build query engine")?;
    Ok(Arc::new(engine))
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Human-readable rendering of a result.
pub fn format_result(result: &QueryResult) -> String {
    let mut out = result.message.clone();
    if let Some(clarification) = &result.clarification_text {
        out.push_str("\n\n");
        out.push_str(clarification);
    }
    out.push_str(&format!(
        "\n\n[intent: {} | confidence: {:.2} | {:.2} ms{}]",
        result.intent,
        result.confidence,
        result.processing_time_ms,
        if result.from_cache { " | cached" } else { "" }
    ));
    out
}
