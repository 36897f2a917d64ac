//! In-memory cache with per-entry TTL.
//!
//! The assessment service keeps rendered summaries here. Entries are
//! evicted lazily when an expired key is read, and explicitly whenever the
//! data behind them changes.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

struct Entry<V> {
    inserted: Instant,
    ttl: Duration,
    value: V,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.inserted) > self.ttl
    }
}

/// Thread-safe string-keyed cache with TTL support.
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, Entry<V>>>,
    default_ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    /// Create an empty cache whose entries live for `default_ttl` unless set otherwise.
    #[must_use]
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
        }
    }

    /// Default time-to-live for [`insert`](Self::insert).
    #[must_use]
    pub const fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // A poisoned map only means a panic happened mid-operation on another
    // thread; every operation leaves the map consistent, so keep using it.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get a cached value.
    ///
    /// Returns None if not cached or expired; an expired entry is removed.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.lock();
        let now = Instant::now();
        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    /// Store a value for `ttl`.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        self.lock().insert(
            key.into(),
            Entry {
                inserted: Instant::now(),
                ttl,
                value,
            },
        );
    }

    /// Store a value for the default TTL.
    pub fn insert(&self, key: impl Into<String>, value: V) {
        self.set(key, value, self.default_ttl);
    }

    /// Remove an entry. Returns whether it was present.
    pub fn delete(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Remove every entry whose key contains `pattern`. Returns the number removed.
    pub fn invalidate_pattern(&self, pattern: &str) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|key, _| !key.contains(pattern));
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!(pattern, removed, "invalidated cache entries");
        }
        removed
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(Duration::from_secs(300))
    }
}
