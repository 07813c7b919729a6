//! Periodic push/pull loop keeping the local countdown and the server in step.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, mpsc, watch};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use crate::api::BackendClient;
use crate::events::{ClientEvent, SessionSnapshot};
use crate::protocol::UpdateTimeBody;

/// Sync loop state.
pub struct SyncLoop {
    backend: Arc<dyn BackendClient>,
    snapshot: watch::Receiver<SessionSnapshot>,
    events: mpsc::UnboundedSender<ClientEvent>,
    sync_now: Arc<Notify>,
    interval: Duration,
}

impl SyncLoop {
    /// Create a loop that syncs every `interval` or whenever `sync_now` fires.
    pub fn new(
        backend: Arc<dyn BackendClient>,
        snapshot: watch::Receiver<SessionSnapshot>,
        events: mpsc::UnboundedSender<ClientEvent>,
        sync_now: Arc<Notify>,
        interval: Duration,
    ) -> Self {
        Self {
            backend,
            snapshot,
            events,
            sync_now,
            interval: interval.max(Duration::from_secs(1)),
        }
    }

    /// Run until `shutdown` flips to true. An in-flight iteration completes
    /// before the loop exits.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
                _ = self.sync_now.notified() => {
                    debug!("Immediate sync requested");
                }
            }
            self.sync_once().await;
        }

        debug!("Sync loop stopped");
    }

    /// One push-then-pull iteration.
    pub async fn sync_once(&self) {
        let snapshot = self.snapshot.borrow().clone();
        if snapshot.username.is_empty() {
            return;
        }

        if let Some(time_left) = snapshot.running_time_left {
            let body = UpdateTimeBody {
                username: snapshot.username.clone(),
                time_left,
                version: Some(snapshot.version),
            };
            let event = match self.backend.update_time(&body).await {
                Ok(reply) => ClientEvent::TimePushed {
                    version: reply.version,
                },
                Err(e) => {
                    warn!(username = %snapshot.username, error = %e, "Time write-back failed");
                    ClientEvent::PushFailed(e)
                }
            };
            if self.events.send(event).is_err() {
                return;
            }
        }

        let event = match self.backend.get_user_status(&snapshot.username).await {
            Ok(status) => ClientEvent::StatusPulled(status),
            Err(e) => {
                warn!(username = %snapshot.username, error = %e, "Status pull failed");
                ClientEvent::PullFailed(e)
            }
        };
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::reconcile::SessionPhase;
    use crate::testing::FakeBackend;

    fn snapshot(running: Option<i64>, version: i64) -> SessionSnapshot {
        SessionSnapshot {
            username: "alice".into(),
            phase: if running.is_some() {
                SessionPhase::Running
            } else {
                SessionPhase::NoSession
            },
            running_time_left: running,
            version,
        }
    }

    fn sync_loop(
        backend: Arc<FakeBackend>,
        snap: SessionSnapshot,
    ) -> (SyncLoop, watch::Sender<SessionSnapshot>, mpsc::UnboundedReceiver<ClientEvent>) {
        let (snap_tx, snap_rx) = watch::channel(snap);
        let (tx, rx) = mpsc::unbounded_channel();
        let sync = SyncLoop::new(
            backend,
            snap_rx,
            tx,
            Arc::new(Notify::new()),
            Duration::from_secs(5),
        );
        (sync, snap_tx, rx)
    }

    #[tokio::test]
    async fn test_running_session_pushes_then_pulls() {
        let backend = Arc::new(FakeBackend::with_account("alice", 500, 3600));
        let (sync, _snap, mut rx) = sync_loop(backend.clone(), snapshot(Some(3590), 0));

        sync.sync_once().await;

        assert!(matches!(rx.recv().await, Some(ClientEvent::TimePushed { version: 1 })));
        match rx.recv().await {
            Some(ClientEvent::StatusPulled(status)) => {
                assert_eq!(status.time_left, 3590);
                assert_eq!(status.version, 1);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_idle_session_only_pulls() {
        let backend = Arc::new(FakeBackend::with_account("alice", 500, 0));
        let (sync, _snap, mut rx) = sync_loop(backend.clone(), snapshot(None, 0));

        sync.sync_once().await;

        assert!(matches!(rx.recv().await, Some(ClientEvent::StatusPulled(_))));
        assert!(rx.try_recv().is_err());
        assert_eq!(backend.update_calls(), 0);
    }

    #[tokio::test]
    async fn test_stale_version_push_is_reported_not_applied() {
        let backend = Arc::new(FakeBackend::with_account("alice", 500, 3600));
        backend.grant_time("alice", 600);
        let (sync, _snap, mut rx) = sync_loop(backend.clone(), snapshot(Some(100), 0));

        sync.sync_once().await;

        assert!(matches!(
            rx.recv().await,
            Some(ClientEvent::PushFailed(ClientError::Conflict(_)))
        ));
        match rx.recv().await {
            Some(ClientEvent::StatusPulled(status)) => assert_eq!(status.time_left, 4200),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_offline_pull_reports_failure() {
        let backend = Arc::new(FakeBackend::with_account("alice", 500, 60));
        backend.set_offline(true);
        let (sync, _snap, mut rx) = sync_loop(backend, snapshot(None, 0));

        sync.sync_once().await;

        assert!(matches!(
            rx.recv().await,
            Some(ClientEvent::PullFailed(ClientError::Network(_)))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_stops_on_shutdown() {
        let backend = Arc::new(FakeBackend::with_account("alice", 500, 60));
        let (sync, _snap, mut rx) = sync_loop(backend, snapshot(None, 0));
        let (stop_tx, stop_rx) = watch::channel(false);

        let handle = tokio::spawn(sync.run(stop_rx));
        assert!(matches!(rx.recv().await, Some(ClientEvent::StatusPulled(_))));

        stop_tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
