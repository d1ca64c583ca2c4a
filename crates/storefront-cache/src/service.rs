//! The cache layers as one explicitly constructed value.

use crate::dedup::DedupRegistry;
use crate::memory::{CacheStats, MemoryCache, MemoryCacheConfig, SweepSummary};
use crate::tagged::TaggedCache;

/// Both cache layers plus the dedup registry.
///
/// Constructed once at process start and injected into fetch code; nothing
/// here relies on ambient module state. `reset` replaces the implicit
/// global lifetime of the maps with an explicit operation.
#[derive(Default)]
pub struct CacheService {
    memory: MemoryCache,
    tagged: TaggedCache,
    dedup: DedupRegistry,
}

impl CacheService {
    /// Create a service with default memory bounds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service with explicit memory-layer bounds.
    pub fn with_config(config: MemoryCacheConfig) -> Self {
        Self {
            memory: MemoryCache::with_config(config),
            tagged: TaggedCache::new(),
            dedup: DedupRegistry::new(),
        }
    }

    /// The bounded hot-data layer.
    pub fn memory(&self) -> &MemoryCache {
        &self.memory
    }

    /// The tag-addressable TTL layer.
    pub fn tagged(&self) -> &TaggedCache {
        &self.tagged
    }

    /// The in-flight request registry.
    pub fn dedup(&self) -> &DedupRegistry {
        &self.dedup
    }

    /// One janitor pass: sweep the memory layer, purge expired tagged
    /// entries, then clear the dedup registry as a block.
    pub fn sweep(&self) -> SweepSummary {
        let summary = self.memory.sweep();
        let purged = self.tagged.purge_expired();
        self.dedup.clear();
        tracing::debug!(
            expired = summary.expired,
            evicted = summary.evicted,
            remaining_bytes = summary.remaining_bytes,
            tagged_purged = purged,
            "cache sweep complete"
        );
        summary
    }

    /// Drop everything in every layer.
    pub fn reset(&self) {
        self.memory.clear();
        self.tagged.clear();
        self.dedup.clear();
    }

    /// Stats for the memory layer.
    pub fn stats(&self) -> CacheStats {
        self.memory.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_reset_clears_all_layers() {
        let service = CacheService::new();
        service.memory().insert("m", json!(1));
        service
            .tagged()
            .insert("t", json!(2), Duration::from_secs(60), &["catalog"]);
        service.reset();
        assert!(service.memory().is_empty());
        assert!(service.tagged().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_purges_tagged_layer_too() {
        let service = CacheService::new();
        service
            .tagged()
            .insert("t", json!(1), Duration::from_secs(1), &[]);
        tokio::time::advance(Duration::from_secs(2)).await;
        service.sweep();
        assert!(service.tagged().is_empty());
    }
}
