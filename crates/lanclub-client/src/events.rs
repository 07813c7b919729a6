//! Messages flowing between the background tasks and the controller.

use crate::error::ClientError;
use crate::expiry::ExpiryReport;
use crate::protocol::{PurchaseReply, StatusReply};
use crate::reconcile::SessionPhase;

/// Read-only view of the session published by the controller for the
/// sync and heartbeat loops.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    /// Logged-in account, empty before login.
    pub username: String,
    /// Session phase.
    pub phase: SessionPhase,
    /// Seconds left while a countdown runs.
    pub running_time_left: Option<i64>,
    /// Last account version the controller applied.
    pub version: i64,
}

/// Result of background work, delivered to the controller.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// A status pull succeeded.
    StatusPulled(StatusReply),
    /// A status pull failed.
    PullFailed(ClientError),
    /// The running countdown was written back.
    TimePushed {
        /// Account version after the write.
        version: i64,
    },
    /// The write-back failed.
    PushFailed(ClientError),
    /// A purchase call returned.
    PurchaseFinished(Result<PurchaseReply, ClientError>),
    /// Expiry cleanup ran for a countdown generation.
    ExpiryCompleted(ExpiryReport),
    /// The post-expiry zero write returned.
    ZeroPushed(Result<i64, ClientError>),
}
