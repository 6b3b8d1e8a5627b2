//! Bounded, time-expiring response cache.
//!
//! [`ResponseCache`] keeps entries in insertion order and evicts the oldest
//! one when full (FIFO, not LRU: a hit does not refresh an entry's
//! position).  Entries older than the TTL are dropped lazily on lookup or in
//! bulk by [`ResponseCache::sweep_expired`].
//!
//! Every operation runs as a single critical section under one mutex, so a
//! lookup-then-expire or evict-then-insert sequence is never interleaved
//! with another request.

use std::collections::VecDeque;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::error::{StoreError, StoreResult};

/// Default maximum number of entries.
pub const DEFAULT_CAPACITY: usize = 100;

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(1800);

// ── cache stats ──────────────────────────────────────────────────────

/// Point-in-time cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    /// Fraction of recorded accesses to live entries beyond each entry's
    /// first: `Σ max(access_count − 1, 0) / Σ access_count`.
    pub hit_rate: f64,
    /// Number of live entries.
    pub size: usize,
    pub capacity: usize,
    /// Lookups that returned a value since creation.
    pub hits: u64,
    /// Lookups that found nothing (or only an expired entry).
    pub misses: u64,
}

impl CacheStats {
    /// Conventional `hits / (hits + misses)`, 0.0 before any lookup.
    pub fn lookup_hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "size={}/{} hits={} misses={} rate={:.2}%",
            self.size,
            self.capacity,
            self.hits,
            self.misses,
            self.hit_rate * 100.0,
        )
    }
}

#[derive(Debug, Default)]
struct LookupCounters {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl LookupCounters {
    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }
}

// ── cache ────────────────────────────────────────────────────────────

#[derive(Debug)]
struct CacheEntry<V> {
    key: String,
    value: V,
    inserted_at: Duration,
    access_count: u64,
}

/// A FIFO, TTL-bounded cache of cloneable values.
///
/// Values are returned by clone, so callers own their copy and can mutate it
/// freely without affecting the stored entry.
///
/// # Example
///
/// ```
/// use aquaquery_store::ResponseCache;
///
/// let cache: ResponseCache<String> = ResponseCache::builder("answers")
///     .capacity(10)
///     .build()
///     .unwrap();
///
/// cache.put("s1_hello", "Namaste!".to_string());
/// assert_eq!(cache.get("s1_hello").as_deref(), Some("Namaste!"));
/// ```
pub struct ResponseCache<V> {
    name: &'static str,
    capacity: usize,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<VecDeque<CacheEntry<V>>>,
    lookups: LookupCounters,
}

impl<V: Clone> ResponseCache<V> {
    /// Start building a new cache.
    pub fn builder(name: &'static str) -> ResponseCacheBuilder<V> {
        ResponseCacheBuilder {
            name,
            capacity: DEFAULT_CAPACITY,
            ttl: DEFAULT_TTL,
            clock: None,
            _marker: PhantomData,
        }
    }

    /// Look up `key`.  Expired entries are removed and reported as a miss;
    /// a hit bumps the entry's access count and returns a copy.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.lock();

        let Some(pos) = entries.iter().position(|e| e.key == key) else {
            self.lookups.record_miss();
            debug!(cache = self.name, key, "cache miss");
            return None;
        };

        if self.is_expired(&entries[pos], now) {
            entries.remove(pos);
            self.lookups.record_miss();
            debug!(cache = self.name, key, "cache entry expired");
            return None;
        }

        let entry = &mut entries[pos];
        entry.access_count += 1;
        self.lookups.record_hit();
        debug!(cache = self.name, key, accesses = entry.access_count, "cache hit");
        Some(entry.value.clone())
    }

    /// Store `value` under `key`, evicting the oldest entry when full.
    ///
    /// An existing entry with the same key is replaced and moves to the
    /// newest position.
    pub fn put(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let now = self.clock.now();
        let mut entries = self.lock();

        if let Some(pos) = entries.iter().position(|e| e.key == key) {
            entries.remove(pos);
        }

        if entries.len() >= self.capacity {
            if let Some(evicted) = entries.pop_front() {
                debug!(cache = self.name, key = %evicted.key, "cache evict");
            }
        }

        debug!(cache = self.name, key = %key, "cache insert");
        entries.push_back(CacheEntry {
            key,
            value,
            inserted_at: now,
            access_count: 1,
        });
    }

    /// Remove every expired entry.  Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|e| !self.is_expired(e, now));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(cache = self.name, removed, "expired entries swept");
        }
        removed
    }

    /// Remove a specific entry.  Returns whether it was present.
    pub fn invalidate(&self, key: &str) -> bool {
        let mut entries = self.lock();
        match entries.iter().position(|e| e.key == key) {
            Some(pos) => {
                entries.remove(pos);
                debug!(cache = self.name, key, "cache invalidate");
                true
            }
            None => false,
        }
    }

    /// Remove all entries whose key starts with `prefix`.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|e| !e.key.starts_with(prefix));
        before - entries.len()
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.lock().clear();
        debug!(cache = self.name, "cache cleared");
    }

    /// Number of stored entries, including any not yet swept.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Statistics over live entries plus the lookup counters.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let entries = self.lock();

        let (mut beyond_first, mut total, mut size) = (0u64, 0u64, 0usize);
        for entry in entries.iter().filter(|e| !self.is_expired(e, now)) {
            beyond_first += entry.access_count.saturating_sub(1);
            total += entry.access_count;
            size += 1;
        }

        CacheStats {
            hit_rate: if total == 0 {
                0.0
            } else {
                beyond_first as f64 / total as f64
            },
            size,
            capacity: self.capacity,
            hits: self.lookups.hits.load(Ordering::Relaxed),
            misses: self.lookups.misses.load(Ordering::Relaxed),
        }
    }

    // -- Private helpers ----------------------------------------------------

    fn is_expired(&self, entry: &CacheEntry<V>, now: Duration) -> bool {
        now.saturating_sub(entry.inserted_at) >= self.ttl
    }

    /// Every mutation completes inside one critical section, so the queue is
    /// consistent even if a previous holder panicked.
    fn lock(&self) -> MutexGuard<'_, VecDeque<CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V> fmt::Debug for ResponseCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseCache")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

// ── builder ──────────────────────────────────────────────────────────

/// Builder for [`ResponseCache`].
pub struct ResponseCacheBuilder<V> {
    name: &'static str,
    capacity: usize,
    ttl: Duration,
    clock: Option<Arc<dyn Clock>>,
    _marker: PhantomData<V>,
}

impl<V: Clone> ResponseCacheBuilder<V> {
    /// Maximum number of entries the cache will hold.
    pub fn capacity(mut self, cap: usize) -> Self {
        self.capacity = cap;
        self
    }

    /// Maximum entry age.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Time-to-live in seconds for each entry.
    pub fn ttl_seconds(self, secs: u64) -> Self {
        self.ttl(Duration::from_secs(secs))
    }

    /// Measure entry age with `clock` instead of the system clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the cache.  A zero capacity is rejected.
    pub fn build(self) -> StoreResult<ResponseCache<V>> {
        if self.capacity == 0 {
            return Err(StoreError::InvalidArgument(format!(
                "cache {} capacity must be at least 1",
                self.name
            )));
        }

        debug!(
            name = self.name,
            capacity = self.capacity,
            ttl_secs = self.ttl.as_secs(),
            "response cache created"
        );

        Ok(ResponseCache {
            name: self.name,
            capacity: self.capacity,
            ttl: self.ttl,
            clock: self
                .clock
                .unwrap_or_else(|| Arc::new(SystemClock::new())),
            entries: Mutex::new(VecDeque::with_capacity(self.capacity)),
            lookups: LookupCounters::default(),
        })
    }
}

// ── tests ────────────────────────────────────────────────────────────
