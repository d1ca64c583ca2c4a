//! Periodic cache maintenance.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::service::CacheService;

/// Default sweep interval.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Handle to a running janitor task.
///
/// The task is started explicitly by the process entry point (library
/// initialization never spawns it) and should be shut down before exit.
/// Short-lived execution contexts simply never start one.
pub struct JanitorHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl JanitorHandle {
    /// Signal the janitor to stop and wait for it to finish.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        let _ = self.task.await;
    }

    /// Abort the task without waiting.
    pub fn abort(&self) {
        self.task.abort();
    }
}

impl CacheService {
    /// Spawn the background sweep loop at the default interval.
    pub fn start_janitor(self: &Arc<Self>) -> JanitorHandle {
        self.start_janitor_with_interval(SWEEP_INTERVAL)
    }

    /// Spawn the background sweep loop at a custom interval.
    pub fn start_janitor_with_interval(self: &Arc<Self>, interval: Duration) -> JanitorHandle {
        let (stop, mut stopped) = watch::channel(false);
        let service = Arc::clone(self);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; skip it so a sweep
            // only runs after a full interval has passed.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        service.sweep();
                    }
                    _ = stopped.changed() => break,
                }
            }
        });
        JanitorHandle { stop, task }
    }
}
