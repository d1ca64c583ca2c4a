//! In-flight request deduplication.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;

/// Outcome of a deduplicated fetch. Errors are shared by every waiter,
/// hence the `Arc`.
pub type FetchResult = Result<Value, Arc<anyhow::Error>>;

type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

/// Registry collapsing concurrent identical fetches into one execution.
///
/// The check-cache-then-fetch sequence spans an await and is not atomic:
/// two callers can both miss and both start a fetch. Consulting this
/// registry before any transport call closes that window. An entry is
/// removed when its originating caller observes settlement, or wholesale
/// on a janitor sweep.
#[derive(Default)]
pub struct DedupRegistry {
    pending: Mutex<HashMap<String, SharedFetch>>,
}

impl DedupRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Await the pending fetch for `key`, starting it via `make` only if
    /// no identical fetch is already in flight.
    pub async fn run<F>(&self, key: &str, make: F) -> FetchResult
    where
        F: FnOnce() -> BoxFuture<'static, FetchResult>,
    {
        let (shared, started_here) = {
            let mut pending = self.pending.lock().expect("dedup registry lock poisoned");
            match pending.get(key) {
                Some(existing) => (existing.clone(), false),
                None => {
                    let shared = make().shared();
                    pending.insert(key.to_string(), shared.clone());
                    (shared, true)
                }
            }
        };

        let result = shared.await;

        if started_here {
            let mut pending = self.pending.lock().expect("dedup registry lock poisoned");
            pending.remove(key);
        }

        result
    }

    /// Number of fetches currently registered.
    pub fn len(&self) -> usize {
        self.pending.lock().expect("dedup registry lock poisoned").len()
    }

    /// Whether nothing is in flight.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every registered fetch as a block. In-flight futures keep
    /// running for their existing waiters; new callers start fresh.
    pub fn clear(&self) {
        let mut pending = self.pending.lock().expect("dedup registry lock poisoned");
        pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_concurrent_callers_share_one_execution() {
        let registry = Arc::new(DedupRegistry::new());
        let executions = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = tokio::sync::watch::channel(false);

        let mut handles = Vec::new();
        for _ in 0..4 {
            let registry = registry.clone();
            let executions = executions.clone();
            let rx = rx.clone();
            handles.push(tokio::spawn(async move {
                registry
                    .run("key", move || {
                        async move {
                            executions.fetch_add(1, Ordering::SeqCst);
                            // Hold the fetch open until every caller joined.
                            let mut rx = rx;
                            let _ = rx.wait_for(|released| *released).await;
                            Ok(json!("payload"))
                        }
                        .boxed()
                    })
                    .await
            }));
        }

        // Let all four callers reach the registry before releasing.
        tokio::task::yield_now().await;
        tx.send(true).unwrap();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), json!("payload"));
        }
        assert_eq!(executions.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_sequential_calls_execute_separately() {
        let registry = DedupRegistry::new();
        let executions = AtomicUsize::new(0);
        for _ in 0..2 {
            let result = registry
                .run("key", || {
                    executions.fetch_add(1, Ordering::SeqCst);
                    async { Ok(json!(1)) }.boxed()
                })
                .await;
            assert!(result.is_ok());
        }
        assert_eq!(executions.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_errors_are_shared() {
        let registry = DedupRegistry::new();
        let result = registry
            .run("key", || {
                async { Err(Arc::new(anyhow::anyhow!("upstream down"))) }.boxed()
            })
            .await;
        assert!(result.is_err());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_clear_empties_the_registry() {
        let registry = Arc::new(DedupRegistry::new());
        let (_tx, rx) = tokio::sync::watch::channel(false);
        let reg = registry.clone();
        let rx_task = rx.clone();
        let task = tokio::spawn(async move {
            reg.run("stuck", move || {
                async move {
                    let mut rx_task = rx_task;
                    let _ = rx_task.wait_for(|released| *released).await;
                    Ok(Value::Null)
                }
                .boxed()
            })
            .await
        });
        tokio::task::yield_now().await;
        assert_eq!(registry.len(), 1);
        registry.clear();
        assert!(registry.is_empty());
        task.abort();
    }
}
