//! Registry heartbeat loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use crate::api::BackendClient;
use crate::events::SessionSnapshot;
use crate::protocol::HeartbeatBody;
use crate::reconcile::SessionPhase;

/// Build the heartbeat body for the current session.
pub fn heartbeat_body(pc_name: &str, snapshot: &SessionSnapshot) -> HeartbeatBody {
    let user = (!snapshot.username.is_empty()).then(|| snapshot.username.clone());
    let status = match snapshot.phase {
        SessionPhase::Running => "in_use",
        SessionPhase::NoSession | SessionPhase::Expired => "active",
    };
    HeartbeatBody {
        pc_name: pc_name.to_string(),
        status: status.to_string(),
        user,
        time_left: snapshot.running_time_left.unwrap_or(0),
    }
}

/// Post a heartbeat every `interval` until `shutdown` flips. Failures are
/// logged and the next beat is attempted on schedule.
pub async fn run_heartbeat(
    backend: Arc<dyn BackendClient>,
    pc_name: String,
    snapshot: watch::Receiver<SessionSnapshot>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = time::interval(interval.max(Duration::from_secs(1)));
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
        }

        let body = heartbeat_body(&pc_name, &snapshot.borrow());
        if let Err(e) = backend.heartbeat(&body).await {
            warn!(pc_name = %pc_name, error = %e, "Heartbeat failed");
        }
    }

    debug!(pc_name = %pc_name, "Heartbeat loop stopped");
}
