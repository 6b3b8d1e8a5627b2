//! The query engine facade.
//!
//! [`QueryEngine::process_query`] is the single entry point used by the
//! transports.  Per query it walks
//! `Received → CacheCheck → Normalized → Classified → ContextUpdated →
//! CacheWrite → Completed`, or stops at `Rejected` for empty input.  Nothing
//! in here performs I/O or awaits; transports call it from whatever worker
//! owns the request.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use aquaquery_intent::{
    ExtractedLocation, Intent, LocationExtractor, PatternScorer, ScoredResult, normalize,
};
use aquaquery_store::{
    CacheStats, Clock, GroundwaterDataset, GroundwaterRecord, LocationLookup, ResponseCache,
    SessionHandle, SessionRegistry, SystemClock,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, info_span, trace, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::render::{
    CLARIFICATION_TEXT, FAILURE_MESSAGE, REJECTION_MESSAGE, ResponseRenderer, TemplateRenderer,
};
use crate::stats::{EngineStats, StatsSnapshot};

/// Session used for queries that arrive without a session id.
pub const DEFAULT_SESSION_ID: &str = "anonymous";

/// Results under this confidence ask the user to rephrase.
pub const CLARIFICATION_THRESHOLD: f64 = 0.5;

/// Only results above this confidence are cached.
pub const CACHE_WRITE_THRESHOLD: f64 = 0.7;

/// Sessions untouched for this long are dropped by
/// [`QueryEngine::sweep_idle_sessions`].
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(3600);

/// Cache key for one session's query.  The session id is length-prefixed,
/// so no other (session, query) pair maps to the same key and every key of
/// a session starts with [`session_key_prefix`].
fn response_key(session_id: &str, raw: &str) -> String {
    format!("{}:{session_id}_{raw}", session_id.len())
}

fn session_key_prefix(session_id: &str) -> String {
    format!("{}:{session_id}_", session_id.len())
}

// ═══════════════════════════════════════════════════════════════════════
//  Result types
// ═══════════════════════════════════════════════════════════════════════

/// Per-query lifecycle stage, traced as the query advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStage {
    Received,
    CacheCheck,
    Normalized,
    Classified,
    ContextUpdated,
    CacheWrite,
    Completed,
    Rejected,
}

impl fmt::Display for QueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::CacheCheck => "cache_check",
            Self::Normalized => "normalized",
            Self::Classified => "classified",
            Self::ContextUpdated => "context_updated",
            Self::CacheWrite => "cache_write",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// Terminal state of a processed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryOutcome {
    Completed,
    Rejected,
    Failed,
}

/// Everything the engine knows about one answered query.
///
/// Values handed out from the cache are independent clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub intent: Intent,
    pub confidence: f64,
    pub processing_time_ms: f64,
    /// Primary location: extracted from this query, else the session's last.
    pub location: Option<String>,
    /// Locations found in this query only.
    pub extracted: ExtractedLocation,
    pub message: String,
    pub records: Vec<GroundwaterRecord>,
    pub requires_clarification: bool,
    pub clarification_text: Option<String>,
    pub raw_input: String,
    pub session_id: Option<String>,
    pub from_cache: bool,
    pub outcome: QueryOutcome,
}

impl QueryResult {
    fn rejected(raw: &str, session_id: Option<&str>) -> Self {
        Self::fallback(raw, session_id, REJECTION_MESSAGE, QueryOutcome::Rejected)
    }

    fn failed(raw: &str, session_id: Option<&str>) -> Self {
        Self::fallback(raw, session_id, FAILURE_MESSAGE, QueryOutcome::Failed)
    }

    fn fallback(raw: &str, session_id: Option<&str>, message: &str, outcome: QueryOutcome) -> Self {
        Self {
            intent: Intent::Error,
            confidence: 0.0,
            processing_time_ms: 0.0,
            location: None,
            extracted: ExtractedLocation::default(),
            message: message.to_string(),
            records: Vec::new(),
            requires_clarification: false,
            clarification_text: None,
            raw_input: raw.to_string(),
            session_id: session_id.map(str::to_string),
            from_cache: false,
            outcome,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Engine
// ═══════════════════════════════════════════════════════════════════════

/// Query understanding and session engine.
///
/// Shareable across threads; wrap it in an `Arc` to hand it to several
/// workers.
pub struct QueryEngine {
    scorer: PatternScorer,
    extractor: LocationExtractor,
    dataset: Arc<GroundwaterDataset>,
    lookup: Arc<dyn LocationLookup>,
    renderer: Arc<dyn ResponseRenderer>,
    cache: Option<ResponseCache<QueryResult>>,
    sessions: SessionRegistry,
    session_idle: Duration,
    clock: Arc<dyn Clock>,
    stats: EngineStats,
}

impl QueryEngine {
    pub fn builder() -> QueryEngineBuilder {
        QueryEngineBuilder::default()
    }

    /// Build an engine over the sample dataset using `config`.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Self::builder()
            .cache_enabled(config.cache.enabled)
            .cache_capacity(config.cache.capacity)
            .cache_ttl(Duration::from_secs(config.cache.ttl_secs))
            .history_capacity(config.context.history_capacity)
            .session_idle(Duration::from_secs(config.context.idle_timeout_secs))
            .build()
    }

    /// Answer one query.  Never panics on user input and never returns an
    /// error: failures come back as a result with
    /// [`QueryOutcome::Failed`].
    pub fn process_query(&self, raw: &str, session_id: Option<&str>) -> QueryResult {
        let _active = self.stats.begin();
        let started = self.clock.now();
        let session_id = session_id.map(str::trim).filter(|s| !s.is_empty());

        let span = info_span!("query", session_id = session_id.unwrap_or(DEFAULT_SESSION_ID));
        let _entered = span.enter();
        trace!(stage = %QueryStage::Received, "query received");

        if raw.trim().is_empty() {
            let err = EngineError::InvalidInput {
                reason: "query is empty".into(),
            };
            debug!(error = %err, stage = %QueryStage::Rejected, "query rejected");
            self.stats.record_rejected();
            let mut result = QueryResult::rejected(raw, session_id);
            result.processing_time_ms = self.elapsed_ms(started);
            return result;
        }

        // Anonymous queries share one context and are never cached.
        let cache_key = session_id.map(|s| response_key(s, raw));
        match (&self.cache, &cache_key) {
            (Some(cache), Some(key)) => {
                trace!(stage = %QueryStage::CacheCheck, "checking response cache");
                if let Some(mut hit) = cache.get(key) {
                    self.stats.record_cache_hit();
                    self.stats.record_completed();
                    hit.from_cache = true;
                    hit.processing_time_ms = self.elapsed_ms(started);
                    debug!(intent = %hit.intent, "served from cache");
                    return hit;
                }
                self.stats.record_cache_miss();
            }
            (None, Some(_)) => {
                debug!(error = %EngineError::CacheUnavailable, "bypassing cache");
            }
            _ => {}
        }

        let (mut result, handle) = match self.understand(raw, session_id) {
            Ok(understood) => understood,
            Err(err) => {
                error!(error = %err, "query failed");
                self.stats.record_failed();
                let mut result = QueryResult::failed(raw, session_id);
                result.processing_time_ms = self.elapsed_ms(started);
                return result;
            }
        };
        result.processing_time_ms = self.elapsed_ms(started);

        if result.requires_clarification {
            self.stats.record_clarification();
        }

        if let (Some(cache), Some(key), Some(id)) = (&self.cache, cache_key, session_id) {
            if result.confidence > CACHE_WRITE_THRESHOLD {
                trace!(stage = %QueryStage::CacheWrite, "caching response");
                cache.put(key.clone(), result.clone());
                // The session may have ended while this turn was running.
                if !self.sessions.is_live(id, &handle) {
                    cache.invalidate(&key);
                    debug!("session ended mid-query, response not kept");
                }
            }
        }

        self.stats.record_completed();
        trace!(
            stage = %QueryStage::Completed,
            intent = %result.intent,
            confidence = result.confidence,
            "query completed"
        );
        result
    }

    /// Normalize, classify, extract, update the session and render.  Also
    /// returns the session handle the turn ran against.
    fn understand(
        &self,
        raw: &str,
        session_id: Option<&str>,
    ) -> Result<(QueryResult, SessionHandle)> {
        let text = normalize(raw);
        trace!(stage = %QueryStage::Normalized, tokens = text.tokens.len(), "query normalized");

        let context_id = session_id.unwrap_or(DEFAULT_SESSION_ID);
        let ((scored, extracted, location), handle) = self
            .sessions
            .with_session_handle(context_id, |ctx| {
                let scored: ScoredResult = self.scorer.classify_normalized(&text, Some(&ctx.signals()));
                let extracted = self.extractor.extract(&text);
                trace!(
                    stage = %QueryStage::Classified,
                    intent = %scored.intent,
                    locations = extracted.found(),
                    "query classified"
                );

                let location = extracted
                    .primary()
                    .or(ctx.last_location())
                    .map(str::to_string);

                ctx.update(raw, scored.intent, extracted.primary());
                ctx.set_awaiting_clarification(scored.confidence < CLARIFICATION_THRESHOLD);
                trace!(stage = %QueryStage::ContextUpdated, turn = ctx.query_count(), "context updated");

                (scored, extracted, location)
            })
            .map_err(|e| EngineError::SessionUnavailable {
                session_id: context_id.to_string(),
                reason: e.to_string(),
            })?;

        let records = self.records_for(&extracted, location.as_deref());
        let message = self
            .renderer
            .render(scored.intent, location.as_deref(), &records);
        let requires_clarification = scored.confidence < CLARIFICATION_THRESHOLD;

        let result = QueryResult {
            intent: scored.intent,
            confidence: scored.confidence,
            processing_time_ms: 0.0,
            location,
            extracted,
            message,
            records,
            requires_clarification,
            clarification_text: requires_clarification.then(|| CLARIFICATION_TEXT.to_string()),
            raw_input: raw.to_string(),
            session_id: session_id.map(str::to_string),
            from_cache: false,
            outcome: QueryOutcome::Completed,
        };
        Ok((result, handle))
    }

    /// Records for the extracted location, or for a location inherited
    /// from the session (tried as a state, then as a district).
    fn records_for(
        &self,
        extracted: &ExtractedLocation,
        location: Option<&str>,
    ) -> Vec<GroundwaterRecord> {
        if !extracted.is_empty() {
            return self.lookup.lookup(
                extracted.state.as_deref(),
                extracted.district.as_deref(),
                extracted.block.as_deref(),
            );
        }
        let Some(loc) = location else {
            return Vec::new();
        };
        let by_state = self.lookup.lookup(Some(loc), None, None);
        if !by_state.is_empty() {
            return by_state;
        }
        self.lookup.lookup(None, Some(loc), None)
    }

    fn elapsed_ms(&self, started: Duration) -> f64 {
        self.clock.now().saturating_sub(started).as_secs_f64() * 1000.0
    }

    /// Drop expired cache entries.  Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        self.cache.as_ref().map_or(0, ResponseCache::sweep_expired)
    }

    /// Tear down a session and forget its cached responses.
    ///
    /// The context is removed before the cache is purged; a turn still in
    /// flight discards its own write once it sees the session is gone.
    pub fn end_session(&self, session_id: &str) -> bool {
        let existed = self.sessions.remove(session_id);
        self.forget_cached(session_id);
        existed
    }

    /// Drop sessions idle longer than the configured timeout, along with
    /// their cached responses.  Returns how many sessions were removed.
    pub fn sweep_idle_sessions(&self) -> usize {
        let removed = self.sessions.sweep_idle(self.session_idle);
        for id in &removed {
            self.forget_cached(id);
        }
        removed.len()
    }

    fn forget_cached(&self, session_id: &str) {
        if let Some(cache) = &self.cache {
            let dropped = cache.invalidate_prefix(&session_key_prefix(session_id));
            debug!(session_id, dropped, "session cache entries invalidated");
        }
    }

    /// Cache statistics, or `None` when caching is disabled.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(ResponseCache::stats)
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn dataset(&self) -> &Arc<GroundwaterDataset> {
        &self.dataset
    }

    pub fn scorer(&self) -> &PatternScorer {
        &self.scorer
    }
}

impl fmt::Debug for QueryEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryEngine")
            .field("patterns", &self.scorer.patterns().len())
            .field("cache_enabled", &self.cache.is_some())
            .field("sessions", &self.sessions)
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Builder
// ═══════════════════════════════════════════════════════════════════════

/// Assembles a [`QueryEngine`].  Unset collaborators default to the sample
/// dataset, the [`TemplateRenderer`] and the system clock.
pub struct QueryEngineBuilder {
    dataset: Option<Arc<GroundwaterDataset>>,
    lookup: Option<Arc<dyn LocationLookup>>,
    renderer: Option<Arc<dyn ResponseRenderer>>,
    clock: Option<Arc<dyn Clock>>,
    cache_enabled: bool,
    cache_capacity: usize,
    cache_ttl: Duration,
    history_capacity: usize,
    session_idle: Duration,
}

impl Default for QueryEngineBuilder {
    fn default() -> Self {
        Self {
            dataset: None,
            lookup: None,
            renderer: None,
            clock: None,
            cache_enabled: true,
            cache_capacity: aquaquery_store::cache::DEFAULT_CAPACITY,
            cache_ttl: aquaquery_store::cache::DEFAULT_TTL,
            history_capacity: aquaquery_store::context::DEFAULT_HISTORY_CAPACITY,
            session_idle: DEFAULT_SESSION_IDLE,
        }
    }
}

impl QueryEngineBuilder {
    /// Dataset backing the renderer and, unless overridden, the lookup.
    pub fn dataset(mut self, dataset: Arc<GroundwaterDataset>) -> Self {
        self.dataset = Some(dataset);
        self
    }

    pub fn lookup(mut self, lookup: Arc<dyn LocationLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn ResponseRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// How long a session may sit unused before the idle sweep drops it.
    pub fn session_idle(mut self, idle: Duration) -> Self {
        self.session_idle = idle;
        self
    }

    pub fn build(self) -> Result<QueryEngine> {
        let clock: Arc<dyn Clock> = self.clock.unwrap_or_else(|| Arc::new(SystemClock::new()));
        let dataset = self
            .dataset
            .unwrap_or_else(|| Arc::new(GroundwaterDataset::sample()));
        let lookup: Arc<dyn LocationLookup> = match self.lookup {
            Some(lookup) => lookup,
            None => Arc::clone(&dataset) as Arc<dyn LocationLookup>,
        };
        let renderer: Arc<dyn ResponseRenderer> = match self.renderer {
            Some(renderer) => renderer,
            None => Arc::new(TemplateRenderer::new(Arc::clone(&dataset))),
        };

        let cache = if self.cache_enabled {
            Some(
                ResponseCache::builder("responses")
                    .capacity(self.cache_capacity)
                    .ttl(self.cache_ttl)
                    .clock(Arc::clone(&clock))
                    .build()?,
            )
        } else {
            warn!(error = %EngineError::CacheUnavailable, "response caching disabled");
            None
        };

        let engine = QueryEngine {
            scorer: PatternScorer::new(),
            extractor: LocationExtractor::new()?,
            dataset,
            lookup,
            renderer,
            cache,
            sessions: SessionRegistry::with_history_capacity(self.history_capacity)
                .with_clock(Arc::clone(&clock)),
            session_idle: self.session_idle,
            clock,
            stats: EngineStats::new(),
        };
        info!(
            patterns = engine.scorer.patterns().len(),
            cache_enabled = engine.cache.is_some(),
            "query engine ready"
        );
        Ok(engine)
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use aquaquery_store::ManualClock;

    use super::*;

    fn engine() -> QueryEngine {
        QueryEngine::builder().build().unwrap()
    }

    #[test]
    fn empty_query_is_rejected() {
        let engine = engine();
        for raw in ["", "   \t "] {
            let result = engine.process_query(raw, Some("s"));
            assert_eq!(result.intent, Intent::Error);
            assert_eq!(result.confidence, 0.0);
            assert_eq!(result.outcome, QueryOutcome::Rejected);
            assert_eq!(result.message, REJECTION_MESSAGE);
        }
        assert_eq!(engine.stats().rejected, 2);
        assert!(engine.sessions().is_empty());
    }

    #[test]
    fn greeting_is_completed_and_cached() {
        let engine = engine();
        let first = engine.process_query("Hello", Some("s1"));
        assert_eq!(first.intent, Intent::Greeting);
        assert_eq!(first.outcome, QueryOutcome::Completed);
        assert!(!first.from_cache);
        assert!(!first.requires_clarification);

        let second = engine.process_query("Hello", Some("s1"));
        assert!(second.from_cache);
        assert_eq!(second.intent, first.intent);
        assert_eq!(second.message, first.message);
        assert_eq!(engine.stats().cache_hits, 1);
    }

    #[test]
    fn cache_hit_does_not_touch_the_context() {
        let engine = engine();
        engine.process_query("Hello", Some("s1"));
        engine.process_query("Hello", Some("s1"));
        let snap = engine.sessions().snapshot("s1").unwrap();
        assert_eq!(snap.query_count, 1);
    }

    #[test]
    fn anonymous_queries_are_not_cached() {
        let engine = engine();
        engine.process_query("Hello", None);
        let again = engine.process_query("Hello", None);
        assert!(!again.from_cache);
        assert_eq!(engine.cache_stats().unwrap().size, 0);
        let snap = engine.sessions().snapshot(DEFAULT_SESSION_ID).unwrap();
        assert_eq!(snap.query_count, 2);
    }

    #[test]
    fn low_confidence_asks_for_clarification() {
        let engine = engine();
        let result = engine.process_query("asdf qwerty", Some("s"));
        assert_eq!(result.intent, Intent::Unknown);
        assert!(result.requires_clarification);
        assert_eq!(result.clarification_text.as_deref(), Some(CLARIFICATION_TEXT));
        assert_eq!(engine.cache_stats().unwrap().size, 0);

        let snap = engine.sessions().snapshot("s").unwrap();
        assert!(snap.awaiting_clarification);
    }

    #[test]
    fn location_falls_back_to_the_session() {
        let engine = engine();
        let first = engine.process_query("Show me Punjab data", Some("s"));
        assert_eq!(first.location.as_deref(), Some("punjab"));
        assert!(!first.records.is_empty());

        let follow_up = engine.process_query("Any policy measures?", Some("s"));
        assert!(follow_up.extracted.is_empty());
        assert_eq!(follow_up.location.as_deref(), Some("punjab"));
        assert!(follow_up.message.contains("PUNJAB"));
    }

    #[test]
    fn disabled_cache_is_bypassed() {
        let engine = QueryEngine::builder().cache_enabled(false).build().unwrap();
        engine.process_query("Hello", Some("s"));
        let again = engine.process_query("Hello", Some("s"));
        assert!(!again.from_cache);
        assert!(engine.cache_stats().is_none());
        assert_eq!(engine.sweep_expired(), 0);
    }

    #[test]
    fn cached_entries_expire_with_the_clock() {
        let clock = Arc::new(ManualClock::new());
        let engine = QueryEngine::builder()
            .clock(clock.clone())
            .cache_ttl(Duration::from_secs(60))
            .build()
            .unwrap();

        engine.process_query("Hello", Some("s"));
        clock.advance(Duration::from_secs(61));
        assert_eq!(engine.sweep_expired(), 1);
        assert!(!engine.process_query("Hello", Some("s")).from_cache);
    }

    #[test]
    fn end_session_drops_context_and_cache() {
        let engine = engine();
        engine.process_query("Hello", Some("s"));
        assert!(engine.end_session("s"));
        assert_eq!(engine.cache_stats().unwrap().size, 0);
        assert!(engine.sessions().get("s").is_none());
    }

    #[test]
    fn poisoned_session_fails_the_request_only() {
        let engine = engine();
        engine.process_query("Hello", Some("good"));
        let handle = engine.sessions().get_or_create("bad");
        let _ = std::thread::spawn(move || {
            let _guard = handle.lock().unwrap();
            panic!("writer died");
        })
        .join();

        let result = engine.process_query("Which areas are critical?", Some("bad"));
        assert_eq!(result.outcome, QueryOutcome::Failed);
        assert_eq!(result.intent, Intent::Error);
        assert_eq!(engine.stats().failed, 1);

        assert!(engine.process_query("Hello", Some("good")).from_cache);
    }

    #[test]
    fn sessions_with_overlapping_ids_do_not_share_cache_entries() {
        let engine = engine();
        // Naively joined, both would be "tenant_x_ Hello".
        let first = engine.process_query("x_ Hello", Some("tenant"));
        assert_eq!(first.intent, Intent::Greeting);

        let second = engine.process_query(" Hello", Some("tenant_x"));
        assert!(!second.from_cache);
        assert_eq!(second.session_id.as_deref(), Some("tenant_x"));
    }

    #[test]
    fn end_session_spares_sessions_sharing_a_prefix() {
        let engine = engine();
        engine.process_query("Hello", Some("a"));
        engine.process_query("Hello", Some("a_b"));
        assert_eq!(engine.cache_stats().unwrap().size, 2);

        assert!(engine.end_session("a"));
        assert_eq!(engine.cache_stats().unwrap().size, 1);
        assert!(engine.process_query("Hello", Some("a_b")).from_cache);
    }

    /// Ends session "s" while its turn is being rendered.
    struct EndingRenderer {
        sessions: std::sync::OnceLock<SessionRegistry>,
    }

    impl ResponseRenderer for EndingRenderer {
        fn render(&self, intent: Intent, _: Option<&str>, _: &[GroundwaterRecord]) -> String {
            if let Some(sessions) = self.sessions.get() {
                sessions.remove("s");
            }
            format!("rendered {intent}")
        }
    }

    #[test]
    fn session_ended_mid_query_leaves_no_cache_entry() {
        let renderer = Arc::new(EndingRenderer {
            sessions: std::sync::OnceLock::new(),
        });
        let engine = QueryEngine::builder()
            .renderer(renderer.clone())
            .build()
            .unwrap();
        let _ = renderer.sessions.set(engine.sessions().clone());

        let result = engine.process_query("Hello", Some("s"));
        assert_eq!(result.outcome, QueryOutcome::Completed);
        assert_eq!(engine.cache_stats().unwrap().size, 0);
        assert!(!engine.process_query("Hello", Some("s")).from_cache);
    }

    #[test]
    fn idle_sessions_are_swept_with_their_cache_entries() {
        let clock = Arc::new(ManualClock::new());
        let engine = QueryEngine::builder()
            .clock(clock.clone())
            .session_idle(Duration::from_secs(100))
            .build()
            .unwrap();

        engine.process_query("Hello", Some("s"));
        clock.advance(Duration::from_secs(50));
        assert_eq!(engine.sweep_idle_sessions(), 0);

        clock.advance(Duration::from_secs(51));
        assert_eq!(engine.sweep_idle_sessions(), 1);
        assert!(engine.sessions().is_empty());
        assert_eq!(engine.cache_stats().unwrap().size, 0);
    }

    struct RecordingRenderer {
        seen: Mutex<Vec<(Intent, Option<String>, usize)>>,
    }

    impl ResponseRenderer for RecordingRenderer {
        fn render(
            &self,
            intent: Intent,
            location: Option<&str>,
            details: &[GroundwaterRecord],
        ) -> String {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push((intent, location.map(str::to_string), details.len()));
            }
            format!("rendered {intent}")
        }
    }

    #[test]
    fn renderer_receives_intent_location_and_records() {
        let renderer = Arc::new(RecordingRenderer {
            seen: Mutex::new(Vec::new()),
        });
        let engine = QueryEngine::builder()
            .renderer(renderer.clone())
            .build()
            .unwrap();

        let result = engine.process_query("Tell me about Amritsar", Some("s"));
        assert_eq!(result.message, "rendered query_district");

        let seen = renderer.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, Intent::QueryDistrict);
        assert_eq!(seen[0].1.as_deref(), Some("amritsar"));
        assert!(seen[0].2 > 0);
    }
}
