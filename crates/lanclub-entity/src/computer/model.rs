//! Computer registry model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::ComputerStatus;

/// One physical club machine as tracked by the registry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Computer {
    /// Row identifier.
    pub id: i64,
    /// Unique machine name.
    pub pc_name: String,
    /// Last reported or derived status.
    pub status: ComputerStatus,
    /// Account currently bound to the machine.
    #[sqlx(rename = "current_username")]
    pub current_user: Option<String>,
    /// Seconds left in the bound session as last reported.
    pub time_remaining: i64,
    /// Label of the package that opened the session.
    pub session_name: Option<String>,
    /// Start of the purchased session window.
    pub session_start_time: Option<DateTime<Utc>>,
    /// End of the purchased session window.
    pub session_end_time: Option<DateTime<Utc>>,
    /// Last heartbeat received from the machine.
    pub last_heartbeat: Option<DateTime<Utc>>,
    /// Last write to the row.
    pub updated_at: DateTime<Utc>,
}

impl Computer {
    /// Whether a heartbeat arrived within `timeout` of `now`.
    pub fn is_online(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        self.last_heartbeat
            .is_some_and(|seen| now.signed_duration_since(seen) <= timeout)
    }

    /// Monitoring view with liveness applied.
    pub fn view(&self, now: DateTime<Utc>, timeout: Duration) -> ComputerView {
        let online = self.is_online(now, timeout);
        let status = if online || self.status == ComputerStatus::Unknown {
            self.status
        } else {
            ComputerStatus::Disconnected
        };
        let remaining = self
            .session_end_time
            .map(|end| end.signed_duration_since(now).num_seconds().max(0));

        ComputerView {
            pc_name: self.pc_name.clone(),
            status,
            online,
            current_user: if online { self.current_user.clone() } else { None },
            time_remaining: self.time_remaining,
            session_name: self.session_name.clone(),
            session_start_time: self.session_start_time,
            session_end_time: self.session_end_time,
            session_remaining_seconds: remaining,
            last_heartbeat: self.last_heartbeat,
        }
    }
}

/// Registry row as shown on the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputerView {
    /// Machine name.
    pub pc_name: String,
    /// Effective status (stale machines read as disconnected).
    pub status: ComputerStatus,
    /// Whether the last heartbeat is within the liveness window.
    pub online: bool,
    /// Bound account, hidden for offline machines.
    pub current_user: Option<String>,
    /// Client-reported time-left.
    pub time_remaining: i64,
    /// Package label.
    pub session_name: Option<String>,
    /// Window start.
    pub session_start_time: Option<DateTime<Utc>>,
    /// Window end.
    pub session_end_time: Option<DateTime<Utc>>,
    /// Seconds until the window ends, computed at read time.
    pub session_remaining_seconds: Option<i64>,
    /// Last heartbeat.
    pub last_heartbeat: Option<DateTime<Utc>>,
}

/// Liveness report sent by a client every heartbeat interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatUpdate {
    /// Machine name.
    pub pc_name: String,
    /// Reported status.
    pub status: ComputerStatus,
    /// Logged-in account, if any.
    pub current_user: Option<String>,
    /// Client-side time-left.
    pub time_remaining: i64,
}

/// Session window written by a package purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionWindow {
    /// Machine the package was bought from.
    pub pc_name: String,
    /// Buyer.
    pub username: String,
    /// Package label.
    pub session_name: String,
    /// Window start.
    pub start: DateTime<Utc>,
    /// Window end.
    pub end: DateTime<Utc>,
    /// Account time-left after the purchase.
    pub time_remaining: i64,
}
