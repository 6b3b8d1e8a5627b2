//! Concurrent session registry.
//!
//! Each session id maps to its own [`ConversationContext`] behind a mutex,
//! so turns of one session are applied one at a time while different
//! sessions proceed in parallel.  The map itself is a [`DashMap`].
//!
//! Every access through [`SessionRegistry::get_or_create`] refreshes the
//! session's last-seen time; [`SessionRegistry::sweep_idle`] drops sessions
//! nobody has touched for a while.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dashmap::DashMap;

use crate::clock::{Clock, SystemClock};
use crate::context::{ContextSnapshot, ConversationContext, DEFAULT_HISTORY_CAPACITY};
use crate::error::{StoreError, StoreResult};

/// Shared handle to one session's context.
pub type SessionHandle = Arc<Mutex<ConversationContext>>;

struct SessionSlot {
    handle: SessionHandle,
    /// Clock reading of the last access, in milliseconds.
    last_seen_ms: AtomicU64,
}

impl SessionSlot {
    fn touch(&self, now: Duration) {
        self.last_seen_ms.store(millis(now), Ordering::Relaxed);
    }

    fn idle_for(&self, now: Duration) -> Duration {
        now.saturating_sub(Duration::from_millis(self.last_seen_ms.load(Ordering::Relaxed)))
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Session id → conversation context.
///
/// The registry is cheaply cloneable (`Arc`-backed) and `Send + Sync`.
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<DashMap<String, SessionSlot>>,
    history_capacity: usize,
    clock: Arc<dyn Clock>,
}

impl SessionRegistry {
    /// Create an empty registry with the default history capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_history_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Create an empty registry whose contexts keep `capacity` utterances.
    #[must_use]
    pub fn with_history_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            history_capacity: capacity,
            clock: Arc::new(SystemClock::new()),
        }
    }

    /// Measure idleness with `clock` instead of the system clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Return the session's handle, creating a fresh context if needed.
    pub fn get_or_create(&self, id: &str) -> SessionHandle {
        let now = self.clock.now();
        if let Some(existing) = self.inner.get(id) {
            existing.touch(now);
            return Arc::clone(&existing.handle);
        }

        let slot = self.inner.entry(id.to_string()).or_insert_with(|| {
            tracing::info!(session_id = %id, "session created");
            SessionSlot {
                handle: Arc::new(Mutex::new(ConversationContext::with_history_capacity(
                    self.history_capacity,
                ))),
                last_seen_ms: AtomicU64::new(millis(now)),
            }
        });
        slot.touch(now);
        Arc::clone(&slot.handle)
    }

    /// The session's handle, if it exists.
    pub fn get(&self, id: &str) -> Option<SessionHandle> {
        self.inner.get(id).map(|slot| Arc::clone(&slot.handle))
    }

    /// Run `f` against the session's context, creating it if needed.
    ///
    /// Fails if a previous writer panicked while holding the context.
    pub fn with_session<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut ConversationContext) -> R,
    ) -> StoreResult<R> {
        self.with_session_handle(id, f).map(|(result, _)| result)
    }

    /// Like [`with_session`](Self::with_session), also returning the handle
    /// that was used so the caller can later check it with
    /// [`is_live`](Self::is_live).
    pub fn with_session_handle<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut ConversationContext) -> R,
    ) -> StoreResult<(R, SessionHandle)> {
        let handle = self.get_or_create(id);
        let result = {
            let mut ctx = handle.lock().map_err(|_| {
                tracing::warn!(session_id = %id, "session context lock poisoned");
                StoreError::SessionPoisoned { id: id.to_string() }
            })?;
            f(&mut ctx)
        };
        Ok((result, handle))
    }

    /// Whether `handle` is still the registered context for `id`.  False
    /// once the session was removed, even if the id has since been reused.
    pub fn is_live(&self, id: &str, handle: &SessionHandle) -> bool {
        self.inner
            .get(id)
            .is_some_and(|slot| Arc::ptr_eq(&slot.handle, handle))
    }

    /// Snapshot an existing session.
    pub fn snapshot(&self, id: &str) -> StoreResult<ContextSnapshot> {
        let handle = self.get(id).ok_or_else(|| StoreError::NotFound {
            entity: "session",
            id: id.to_string(),
        })?;
        let ctx = handle
            .lock()
            .map_err(|_| StoreError::SessionPoisoned { id: id.to_string() })?;
        Ok(ctx.snapshot(id))
    }

    /// Tear down a session.  Returns whether it existed.
    pub fn remove(&self, id: &str) -> bool {
        let removed = self.inner.remove(id).is_some();
        if removed {
            tracing::info!(session_id = %id, "session removed");
        }
        removed
    }

    /// Remove every session not accessed within `max_idle`.  Returns the
    /// ids that were removed.
    pub fn sweep_idle(&self, max_idle: Duration) -> Vec<String> {
        let now = self.clock.now();
        let candidates: Vec<String> = self
            .inner
            .iter()
            .filter(|entry| entry.value().idle_for(now) >= max_idle)
            .map(|entry| entry.key().clone())
            .collect();

        // Re-checked under the shard lock: a session touched since the scan
        // stays.
        let removed: Vec<String> = candidates
            .into_iter()
            .filter(|id| {
                self.inner
                    .remove_if(id, |_, slot| slot.idle_for(now) >= max_idle)
                    .is_some()
            })
            .collect();

        if !removed.is_empty() {
            tracing::info!(removed = removed.len(), "idle sessions swept");
        }
        removed
    }

    /// Ids of all live sessions.
    pub fn list_ids(&self) -> Vec<String> {
        self.inner.iter().map(|e| e.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.inner.len())
            .field("history_capacity", &self.history_capacity)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use aquaquery_intent::Intent;

    use super::*;
    use crate::clock::ManualClock;

    #[test]
    fn get_or_create_returns_the_same_context() {
        let registry = SessionRegistry::new();
        let a = registry.get_or_create("s1");
        let b = registry.get_or_create("s1");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn with_session_mutates_in_place() {
        let registry = SessionRegistry::new();
        registry
            .with_session("s1", |ctx| ctx.update("hi", Intent::Greeting, None))
            .unwrap();
        let count = registry.with_session("s1", |ctx| ctx.query_count()).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn snapshot_of_missing_session_is_not_found() {
        let registry = SessionRegistry::new();
        assert!(matches!(
            registry.snapshot("ghost"),
            Err(StoreError::NotFound { entity: "session", .. })
        ));
    }

    #[test]
    fn remove_tears_down() {
        let registry = SessionRegistry::new();
        registry.get_or_create("s1");
        assert!(registry.remove("s1"));
        assert!(!registry.remove("s1"));
        assert!(registry.is_empty());
        assert!(registry.get("s1").is_none());
    }

    #[test]
    fn poisoned_session_is_reported() {
        let registry = SessionRegistry::new();
        let handle = registry.get_or_create("bad");
        let _ = std::thread::spawn(move || {
            let _guard = handle.lock().unwrap();
            panic!("writer died");
        })
        .join();

        let result = registry.with_session("bad", |ctx| ctx.query_count());
        assert!(matches!(result, Err(StoreError::SessionPoisoned { .. })));
    }

    #[test]
    fn is_live_tracks_the_registered_handle() {
        let registry = SessionRegistry::new();
        let (_, first) = registry.with_session_handle("s1", |ctx| ctx.query_count()).unwrap();
        assert!(registry.is_live("s1", &first));

        registry.remove("s1");
        assert!(!registry.is_live("s1", &first));

        // Same id, new context.
        let second = registry.get_or_create("s1");
        assert!(!registry.is_live("s1", &first));
        assert!(registry.is_live("s1", &second));
    }

    #[test]
    fn idle_sessions_are_swept() {
        let clock = Arc::new(ManualClock::new());
        let registry = SessionRegistry::new().with_clock(clock.clone());

        registry.get_or_create("old");
        clock.advance(Duration::from_secs(50));
        registry.get_or_create("fresh");
        clock.advance(Duration::from_secs(50));

        let removed = registry.sweep_idle(Duration::from_secs(100));
        assert_eq!(removed, vec!["old".to_string()]);
        assert!(registry.get("old").is_none());
        assert!(registry.get("fresh").is_some());
    }

    #[test]
    fn access_keeps_a_session_alive() {
        let clock = Arc::new(ManualClock::new());
        let registry = SessionRegistry::new().with_clock(clock.clone());

        registry.get_or_create("s");
        clock.advance(Duration::from_secs(90));
        registry.with_session("s", |ctx| ctx.query_count()).unwrap();
        clock.advance(Duration::from_secs(90));

        assert!(registry.sweep_idle(Duration::from_secs(100)).is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn history_capacity_is_applied() {
        let registry = SessionRegistry::with_history_capacity(2);
        registry
            .with_session("s", |ctx| {
                for q in ["a", "b", "c"] {
                    ctx.update(q, Intent::Unknown, None);
                }
            })
            .unwrap();
        let snap = registry.snapshot("s").unwrap();
        assert_eq!(snap.history, vec!["b", "c"]);
    }
}
