//! Tag-addressable TTL cache for cross-request reuse.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

struct TaggedEntry {
    data: Value,
    created_at: Instant,
    ttl: Duration,
    tags: Vec<String>,
}

impl TaggedEntry {
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

/// Cache keyed by string with per-entry TTL and invalidation tags.
///
/// External callers can drop every entry under a tag without knowing
/// individual keys. Each cached function owns its key derivation; this
/// layer only stores what it is given.
#[derive(Default)]
pub struct TaggedCache {
    entries: Mutex<HashMap<String, TaggedEntry>>,
}

impl TaggedCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a live entry; an expired entry is removed and misses.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().expect("tagged cache lock poisoned");
        if let Some(entry) = entries.get(key) {
            if entry.is_expired() {
                entries.remove(key);
                return None;
            }
            return Some(entry.data.clone());
        }
        None
    }

    /// Store a value under `key` with its TTL and invalidation tags.
    pub fn insert(&self, key: impl Into<String>, value: Value, ttl: Duration, tags: &[&str]) {
        let mut entries = self.entries.lock().expect("tagged cache lock poisoned");
        entries.insert(
            key.into(),
            TaggedEntry {
                data: value,
                created_at: Instant::now(),
                ttl,
                tags: tags.iter().map(|t| t.to_string()).collect(),
            },
        );
    }

    /// Drop every entry carrying `tag`. Returns the number removed.
    pub fn invalidate_tag(&self, tag: &str) -> usize {
        let mut entries = self.entries.lock().expect("tagged cache lock poisoned");
        let before = entries.len();
        entries.retain(|_, entry| !entry.tags.iter().any(|t| t == tag));
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!(tag, removed, "invalidated tagged cache entries");
        }
        removed
    }

    /// Drop expired entries. Returns the number removed.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock().expect("tagged cache lock poisoned");
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut entries = self.entries.lock().expect("tagged cache lock poisoned");
        entries.clear();
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("tagged cache lock poisoned").len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
