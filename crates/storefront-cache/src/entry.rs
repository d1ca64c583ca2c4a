//! Memory-layer cache entries.

use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;

/// A cached value in the bounded memory layer.
///
/// `created_at` is set on (re)population only, never refreshed on read.
/// The serialized size is measured lazily, at most once per population.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    data: Value,
    created_at: Instant,
    size_bytes: Option<usize>,
}

impl CacheEntry {
    /// Create an entry holding `data`, stamped now.
    pub fn new(data: Value) -> Self {
        Self {
            data,
            created_at: Instant::now(),
            size_bytes: None,
        }
    }

    /// The cached value.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Time since (re)population.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Serialized size in bytes, measured on first call and reused after.
    pub fn size_bytes(&mut self) -> usize {
        if let Some(size) = self.size_bytes {
            return size;
        }
        let size = serde_json::to_vec(&self.data).map(|b| b.len()).unwrap_or(0);
        self.size_bytes = Some(size);
        size
    }

    /// The measured size, if a sweep has measured this entry already.
    pub fn measured_size(&self) -> Option<usize> {
        self.size_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_size_measured_once() {
        let mut entry = CacheEntry::new(json!({ "k": "value" }));
        assert!(entry.measured_size().is_none());
        let first = entry.size_bytes();
        assert!(first > 0);
        assert_eq!(entry.measured_size(), Some(first));
        assert_eq!(entry.size_bytes(), first);
    }

    #[tokio::test(start_paused = true)]
    async fn test_age_tracks_population_time() {
        let entry = CacheEntry::new(Value::Null);
        tokio::time::advance(Duration::from_secs(90)).await;
        assert_eq!(entry.age(), Duration::from_secs(90));
    }
}
