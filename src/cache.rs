//! In-memory TTL cache for JSON responses.
//!
//! DESIGN
//! ======
//! A `HashMap<String, CacheEntry>` behind a `Mutex`. Each entry remembers
//! when it was stored and its own TTL, so fast and slow endpoints can share
//! one map. There is no eviction: an entry is only replaced when it is
//! refreshed or explicitly cleared. The key set is small and fixed (a handful
//! of list endpoints), so growth is bounded in practice.
//!
//! Lookups and inserts have `_at` twins taking an explicit `Instant`. The
//! client feeds them from its injectable clock.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde_json::Value;

pub const TTL_FAST: Duration = Duration::from_secs(15);
pub const TTL_SLOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < self.ttl
    }
}

#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key` if it is still within its TTL.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.get_at(key, Instant::now())
    }

    pub(crate) fn get_at(&self, key: &str, now: Instant) -> Option<Value> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries
            .get(key)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.value.clone())
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn insert(&self, key: impl Into<String>, value: Value, ttl: Duration) {
        self.insert_at(key, value, ttl, Instant::now());
    }

    pub(crate) fn insert_at(&self, key: impl Into<String>, value: Value, ttl: Duration, now: Instant) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(key.into(), CacheEntry { value, stored_at: now, ttl });
    }

    /// Drop one entry, or every entry when `key` is `None`.
    pub fn clear(&self, key: Option<&str>) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match key {
            Some(key) => {
                entries.remove(key);
            }
            None => entries.clear(),
        }
    }

    /// Number of stored entries, stale ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod tests;
