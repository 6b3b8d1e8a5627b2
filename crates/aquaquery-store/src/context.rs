//! Per-session conversation memory.
//!
//! A [`ConversationContext`] remembers the last location and intent of a
//! session plus a short ring buffer of recent utterances.  It is owned by one
//! session and is not synchronized; see [`crate::session::SessionRegistry`]
//! for shared access.

use std::collections::VecDeque;

use aquaquery_intent::{ContextSignals, Intent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default number of utterances remembered per session.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Short-lived memory of one conversation.
#[derive(Debug, Clone)]
pub struct ConversationContext {
    history: VecDeque<String>,
    history_capacity: usize,
    last_location: Option<String>,
    last_intent: Intent,
    query_count: u64,
    session_start: DateTime<Utc>,
    awaiting_clarification: bool,
}

impl ConversationContext {
    /// A fresh context with empty history and [`Intent::Unknown`] as the
    /// last intent.
    pub fn new() -> Self {
        Self::with_history_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// A fresh context remembering at most `capacity` utterances.
    pub fn with_history_capacity(capacity: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(capacity),
            history_capacity: capacity,
            last_location: None,
            last_intent: Intent::Unknown,
            query_count: 0,
            session_start: Utc::now(),
            awaiting_clarification: false,
        }
    }

    /// Record a completed turn.
    ///
    /// The last location is only replaced when `location` is non-empty; the
    /// oldest utterance is dropped once the history is full.
    pub fn update(&mut self, raw_input: &str, intent: Intent, location: Option<&str>) {
        self.last_intent = intent;
        self.query_count += 1;

        if let Some(loc) = location.map(str::trim).filter(|l| !l.is_empty()) {
            self.last_location = Some(loc.to_lowercase());
        }

        if self.history_capacity == 0 {
            return;
        }
        if self.history.len() == self.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(raw_input.to_string());
    }

    /// The view of this context the scorer consumes.
    pub fn signals(&self) -> ContextSignals<'_> {
        ContextSignals {
            last_location: self.last_location.as_deref(),
            last_intent: Some(self.last_intent),
        }
    }

    /// Recent utterances, oldest first.
    pub fn history(&self) -> impl ExactSizeIterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    pub fn last_location(&self) -> Option<&str> {
        self.last_location.as_deref()
    }

    pub fn last_intent(&self) -> Intent {
        self.last_intent
    }

    pub fn query_count(&self) -> u64 {
        self.query_count
    }

    pub fn session_start(&self) -> DateTime<Utc> {
        self.session_start
    }

    /// Whether the previous turn asked the user to rephrase.
    pub fn awaiting_clarification(&self) -> bool {
        self.awaiting_clarification
    }

    pub fn set_awaiting_clarification(&mut self, awaiting: bool) {
        self.awaiting_clarification = awaiting;
    }

    /// A serializable copy for the transport layer.
    pub fn snapshot(&self, session_id: &str) -> ContextSnapshot {
        ContextSnapshot {
            session_id: session_id.to_string(),
            last_location: self.last_location.clone(),
            last_intent: self.last_intent,
            query_count: self.query_count,
            session_start: self.session_start,
            awaiting_clarification: self.awaiting_clarification,
            history: self.history.iter().cloned().collect(),
        }
    }
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable copy of a [`ConversationContext`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub session_id: String,
    pub last_location: Option<String>,
    pub last_intent: Intent,
    pub query_count: u64,
    pub session_start: DateTime<Utc>,
    pub awaiting_clarification: bool,
    pub history: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_context() {
        let ctx = ConversationContext::new();
        assert_eq!(ctx.last_intent(), Intent::Unknown);
        assert_eq!(ctx.last_location(), None);
        assert_eq!(ctx.query_count(), 0);
        assert_eq!(ctx.history().len(), 0);
        assert!(!ctx.awaiting_clarification());
    }

    #[test]
    fn update_records_the_turn() {
        let mut ctx = ConversationContext::new();
        ctx.update("Show me Punjab data", Intent::QueryLocation, Some("Punjab"));

        assert_eq!(ctx.last_intent(), Intent::QueryLocation);
        assert_eq!(ctx.last_location(), Some("punjab"));
        assert_eq!(ctx.query_count(), 1);
        assert_eq!(ctx.history().collect::<Vec<_>>(), vec!["Show me Punjab data"]);
    }

    #[test]
    fn empty_location_keeps_the_previous_one() {
        let mut ctx = ConversationContext::new();
        ctx.update("punjab", Intent::QueryLocation, Some("punjab"));
        ctx.update("any policy?", Intent::PolicySuggestion, Some("  "));
        ctx.update("thanks", Intent::Thanks, None);
        assert_eq!(ctx.last_location(), Some("punjab"));
        assert_eq!(ctx.query_count(), 3);
    }

    #[test]
    fn history_is_a_ring_buffer() {
        let mut ctx = ConversationContext::new();
        for i in 0..15 {
            ctx.update(&format!("q{i}"), Intent::Unknown, None);
        }
        let history: Vec<&str> = ctx.history().collect();
        assert_eq!(history.len(), DEFAULT_HISTORY_CAPACITY);
        assert_eq!(history.first(), Some(&"q5"));
        assert_eq!(history.last(), Some(&"q14"));
        assert_eq!(ctx.query_count(), 15);
    }

    #[test]
    fn zero_capacity_keeps_no_history() {
        let mut ctx = ConversationContext::with_history_capacity(0);
        ctx.update("hello", Intent::Greeting, None);
        assert_eq!(ctx.history().len(), 0);
        assert_eq!(ctx.query_count(), 1);
    }

    #[test]
    fn signals_reflect_state() {
        let mut ctx = ConversationContext::new();
        ctx.update("critical areas", Intent::CriticalAreas, Some("haryana"));
        let signals = ctx.signals();
        assert_eq!(signals.last_location, Some("haryana"));
        assert_eq!(signals.last_intent, Some(Intent::CriticalAreas));
    }

    #[test]
    fn snapshot_serializes() {
        let mut ctx = ConversationContext::new();
        ctx.update("hi", Intent::Greeting, None);
        ctx.set_awaiting_clarification(true);

        let snap = ctx.snapshot("abc");
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["session_id"], "abc");
        assert_eq!(json["last_intent"], "greeting");
        assert_eq!(json["awaiting_clarification"], true);
        assert_eq!(json["history"][0], "hi");
    }
}
