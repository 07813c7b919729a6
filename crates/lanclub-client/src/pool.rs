//! Bounded pool for one-off backend calls (purchases, zero write-backs,
//! launch reports, expiry cleanup).

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// At most `max_in_flight` tasks run concurrently; the rest wait for a
/// permit. [`TaskPool::drain`] waits for everything on shutdown.
#[derive(Debug)]
pub struct TaskPool {
    permits: Arc<Semaphore>,
    tasks: JoinSet<()>,
}

impl TaskPool {
    /// Create a pool allowing `max_in_flight` concurrent tasks.
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
            tasks: JoinSet::new(),
        }
    }

    /// Queue `task` on the pool.
    pub fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        while let Some(done) = self.tasks.try_join_next() {
            if let Err(e) = done {
                warn!(error = %e, "Pooled task panicked");
            }
        }

        let permits = Arc::clone(&self.permits);
        self.tasks.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            task.await;
        });
    }

    /// Number of tasks not yet reaped.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no tasks are outstanding.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait up to `grace` for outstanding tasks, then abort the rest.
    pub async fn drain(&mut self, grace: Duration) {
        let pending = self.tasks.len();
        let waited = tokio::time::timeout(grace, async {
            while self.tasks.join_next().await.is_some() {}
        })
        .await;

        if waited.is_err() {
            warn!(remaining = self.tasks.len(), "Aborting pooled tasks after grace period");
            self.tasks.shutdown().await;
        }
        debug!(pending, "Task pool drained");
    }
}
