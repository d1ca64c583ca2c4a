//! Size/age-bounded in-process cache for hot data.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde_json::Value;

use crate::entry::CacheEntry;

/// Default age bound for memory-layer entries.
pub const MAX_CACHE_AGE: Duration = Duration::from_secs(60 * 60);
/// Default memory budget for the layer, in bytes.
pub const MAX_CACHE_MEMORY: usize = 50 * 1024 * 1024;

/// Bounds for the memory layer.
#[derive(Debug, Clone)]
pub struct MemoryCacheConfig {
    /// Entries older than this are dropped on sweep (and treated as
    /// misses on read).
    pub max_age: Duration,
    /// Total serialized-size budget enforced on sweep.
    pub max_bytes: usize,
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_age: MAX_CACHE_AGE,
            max_bytes: MAX_CACHE_MEMORY,
        }
    }
}

/// Counts from one janitor sweep of the memory layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Entries dropped for exceeding the age bound.
    pub expired: usize,
    /// Entries evicted to get back under the memory budget.
    pub evicted: usize,
    /// Total measured bytes remaining after the sweep.
    pub remaining_bytes: usize,
}

/// Point-in-time view of the memory layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub entries: usize,
    /// Sum of sizes measured so far; unmeasured entries contribute zero
    /// until a sweep measures them.
    pub measured_bytes: usize,
}

/// The in-process hot map.
///
/// Individual operations lock only for the map access itself; nothing is
/// held across an await. There is no stale-but-served state here: an entry
/// past the age bound is a miss even before the next sweep removes it.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    config: MemoryCacheConfig,
}

impl MemoryCache {
    /// Create a cache with the default bounds.
    pub fn new() -> Self {
        Self::with_config(MemoryCacheConfig::default())
    }

    /// Create a cache with explicit bounds.
    pub fn with_config(config: MemoryCacheConfig) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Look up a fresh entry; an over-age entry is removed and misses.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().expect("memory cache lock poisoned");
        if let Some(entry) = entries.get(key) {
            if entry.age() > self.config.max_age {
                entries.remove(key);
                return None;
            }
            return Some(entry.data().clone());
        }
        None
    }

    /// Insert or repopulate, refreshing the timestamp and resetting the
    /// measured size.
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        let mut entries = self.entries.lock().expect("memory cache lock poisoned");
        entries.insert(key.into(), CacheEntry::new(value));
    }

    /// Remove one entry.
    pub fn remove(&self, key: &str) {
        let mut entries = self.entries.lock().expect("memory cache lock poisoned");
        entries.remove(key);
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut entries = self.entries.lock().expect("memory cache lock poisoned");
        entries.clear();
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("memory cache lock poisoned").len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current entry count and measured byte total.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock().expect("memory cache lock poisoned");
        CacheStats {
            entries: entries.len(),
            measured_bytes: entries.values().filter_map(CacheEntry::measured_size).sum(),
        }
    }

    /// One maintenance pass: measure unmeasured entries, drop over-age
    /// entries, then enforce the memory budget.
    ///
    /// Budget enforcement sheds the biggest consumers first: entries are
    /// ordered ascending by size and removed from the largest end until the
    /// total fits. This minimizes the number of evictions per sweep and is
    /// intentionally not an LRU/LFU policy.
    pub fn sweep(&self) -> SweepSummary {
        let mut entries = self.entries.lock().expect("memory cache lock poisoned");
        let before = entries.len();
        entries.retain(|_, entry| entry.age() <= self.config.max_age);
        let expired = before - entries.len();

        let mut total: usize = entries.values_mut().map(CacheEntry::size_bytes).sum();

        let mut evicted = 0usize;
        if total > self.config.max_bytes {
            let mut by_size: Vec<(String, usize)> = entries
                .iter()
                .map(|(key, entry)| {
                    // Measured just above; zero only for unserializable data.
                    (key.clone(), entry.measured_size().unwrap_or(0))
                })
                .collect();
            by_size.sort_by_key(|(_, size)| *size);

            while total > self.config.max_bytes {
                let Some((key, size)) = by_size.pop() else {
                    break;
                };
                entries.remove(&key);
                total = total.saturating_sub(size);
                evicted += 1;
            }
        }

        if expired > 0 || evicted > 0 {
            tracing::debug!(expired, evicted, remaining_bytes = total, "memory cache sweep");
        }

        SweepSummary {
            expired,
            evicted,
            remaining_bytes: total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unbounded() -> MemoryCacheConfig {
        MemoryCacheConfig {
            max_age: Duration::from_secs(3600),
            max_bytes: usize::MAX,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let cache = MemoryCache::new();
        cache.insert("k", json!(42));
        assert_eq!(cache.get("k"), Some(json!(42)));
        assert_eq!(cache.get("missing"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_over_age_entry_misses_on_read() {
        let cache = MemoryCache::with_config(MemoryCacheConfig {
            max_age: Duration::from_secs(60),
            max_bytes: usize::MAX,
        });
        cache.insert("k", json!("hot"));
        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_repopulation_refreshes_timestamp() {
        let cache = MemoryCache::with_config(MemoryCacheConfig {
            max_age: Duration::from_secs(60),
            max_bytes: usize::MAX,
        });
        cache.insert("k", json!(1));
        tokio::time::advance(Duration::from_secs(45)).await;
        cache.insert("k", json!(2));
        tokio::time::advance(Duration::from_secs(45)).await;
        // 90s since first insert, 45s since repopulation: still fresh.
        assert_eq!(cache.get("k"), Some(json!(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_drops_expired_entries() {
        let cache = MemoryCache::with_config(MemoryCacheConfig {
            max_age: Duration::from_secs(60),
            max_bytes: usize::MAX,
        });
        cache.insert("old", json!("a"));
        tokio::time::advance(Duration::from_secs(61)).await;
        cache.insert("fresh", json!("b"));
        let summary = cache.sweep();
        assert_eq!(summary.expired, 1);
        assert_eq!(summary.evicted, 0);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("fresh"), Some(json!("b")));
    }

    #[test]
    fn test_sweep_evicts_largest_first_until_under_budget() {
        let small = json!("x");
        let medium = json!("x".repeat(100));
        let large = json!("x".repeat(1000));
        let budget = serde_json::to_vec(&small).unwrap().len()
            + serde_json::to_vec(&medium).unwrap().len();

        let cache = MemoryCache::with_config(MemoryCacheConfig {
            max_age: Duration::from_secs(3600),
            max_bytes: budget,
        });
        cache.insert("small", small.clone());
        cache.insert("medium", medium.clone());
        cache.insert("large", large);

        let summary = cache.sweep();
        assert_eq!(summary.expired, 0);
        assert_eq!(summary.evicted, 1);
        assert!(summary.remaining_bytes <= budget);
        // The largest entry went first; the other two survive.
        assert_eq!(cache.get("large"), None);
        assert_eq!(cache.get("small"), Some(small));
        assert_eq!(cache.get("medium"), Some(medium));
    }

    #[test]
    fn test_sweep_measures_sizes_lazily() {
        let cache = MemoryCache::with_config(unbounded());
        cache.insert("k", json!({ "payload": [1, 2, 3] }));
        assert_eq!(cache.stats().measured_bytes, 0);
        let summary = cache.sweep();
        assert!(summary.remaining_bytes > 0);
        assert_eq!(cache.stats().measured_bytes, summary.remaining_bytes);
    }
}
