//! Local/server time-left reconciliation.

/// Where the kiosk session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No countdown.
    #[default]
    NoSession,
    /// A countdown is running.
    Running,
    /// The countdown hit zero and cleanup is in progress.
    Expired,
}

/// What to do with the local countdown after a status pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Nothing running locally and the server has time: start from it.
    Start(i64),
    /// The local countdown drifted past the tolerance: restart from the server.
    Restart(i64),
    /// Leave the countdown alone.
    Keep,
}

/// Decide how a pulled `server` time-left affects the local countdown.
///
/// `local` is `None` when no countdown is running. A server value of zero
/// or less never stops a running countdown; expiry only comes from the
/// countdown itself.
pub fn reconcile(local: Option<i64>, server: i64, tolerance: i64) -> Decision {
    match local {
        None if server > 0 => Decision::Start(server),
        None => Decision::Keep,
        Some(_) if server <= 0 => Decision::Keep,
        Some(left) if (left - server).abs() > tolerance => Decision::Restart(server),
        Some(_) => Decision::Keep,
    }
}
