//! Counter store abstraction and the in-memory implementation.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use super::counter::WindowState;
use crate::error::Result;

/// Storage backend for per-key window counters.
///
/// The store owns all mutable counter state; callers only ever see the
/// [`WindowState`] snapshot taken after their own increment. `incr` must be
/// atomic per key: two concurrent requests for the same key must observe
/// distinct counts, never the same pre-increment value.
///
/// The in-memory [`MemoryStore`] is the default. A remote store (e.g. a
/// shared cache for multi-instance deployments) can be substituted behind
/// this trait; the limiter fails open if `incr` returns an error.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Record one request for `key` at `now` and return the resulting window
    /// state. Creates a fresh window if the key is unknown or its window has
    /// expired.
    async fn incr(&self, key: &str, window: Duration, now: DateTime<Utc>) -> Result<WindowState>;
}

/// In-memory counter store backed by a concurrent hash map.
///
/// Per-key atomicity comes from holding the map entry for the duration of
/// the read-modify-write. Counters are process-local: with multiple
/// instances, each holds its own counts and the effective global limit is
/// the configured limit times the instance count. Nothing survives a
/// restart.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, WindowState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked keys, including ones with expired windows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all counters.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Opportunistically drop entries whose window ended before `now`.
    ///
    /// Expired entries are harmless (they reset lazily on the next request),
    /// so this only bounds memory for keys that never return.
    pub fn sweep(&self, now: DateTime<Utc>) {
        self.entries.retain(|_, state| !state.is_expired(now));
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn incr(&self, key: &str, window: Duration, now: DateTime<Utc>) -> Result<WindowState> {
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| WindowState::new(now, window));
        entry.observe(now, window);
        Ok(*entry)
    }
}
