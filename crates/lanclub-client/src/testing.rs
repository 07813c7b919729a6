//! In-memory collaborators for client tests.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::api::BackendClient;
use crate::error::ClientError;
use crate::expiry::{ProcessTerminator, ShellControl};
use crate::protocol::{
    HeartbeatBody, LaunchReport, PackageInfo, PurchaseBody, PurchaseReply, StatusReply,
    UpdateTimeBody, UpdateTimeReply,
};

#[derive(Debug, Clone, Copy)]
struct FakeAccount {
    balance: i64,
    time_left: i64,
    version: i64,
}

#[derive(Debug, Default)]
struct FakeState {
    accounts: HashMap<String, FakeAccount>,
    offline: bool,
    update_calls: usize,
    heartbeat_calls: usize,
    purchase_calls: usize,
    launches: Vec<LaunchReport>,
    purchase_gate: Option<Arc<Notify>>,
}

/// Backend that keeps accounts in memory and applies the same version
/// rules as the server.
#[derive(Debug, Default)]
pub(crate) struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub(crate) fn with_account(username: &str, balance: i64, time_left: i64) -> Self {
        let backend = Self::default();
        backend.state.lock().unwrap().accounts.insert(
            username.to_string(),
            FakeAccount {
                balance,
                time_left,
                version: 0,
            },
        );
        backend
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    /// Add time the way an operator grant does.
    pub(crate) fn grant_time(&self, username: &str, seconds: i64) {
        let mut state = self.state.lock().unwrap();
        let account = state.accounts.get_mut(username).unwrap();
        account.time_left += seconds;
        account.version += 1;
    }

    /// Make purchases wait until the returned gate is notified.
    pub(crate) fn hold_purchases(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state.lock().unwrap().purchase_gate = Some(Arc::clone(&gate));
        gate
    }

    /// `(balance, time_left, version)`
    pub(crate) fn account(&self, username: &str) -> (i64, i64, i64) {
        let state = self.state.lock().unwrap();
        let a = state.accounts[username];
        (a.balance, a.time_left, a.version)
    }

    pub(crate) fn update_calls(&self) -> usize {
        self.state.lock().unwrap().update_calls
    }

    pub(crate) fn heartbeat_calls(&self) -> usize {
        self.state.lock().unwrap().heartbeat_calls
    }

    pub(crate) fn purchase_calls(&self) -> usize {
        self.state.lock().unwrap().purchase_calls
    }

    pub(crate) fn launches(&self) -> Vec<LaunchReport> {
        self.state.lock().unwrap().launches.clone()
    }

    fn online(state: &FakeState) -> Result<(), ClientError> {
        if state.offline {
            Err(ClientError::Network("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BackendClient for FakeBackend {
    async fn get_user_status(&self, username: &str) -> Result<StatusReply, ClientError> {
        let state = self.state.lock().unwrap();
        Self::online(&state)?;
        let a = state
            .accounts
            .get(username)
            .ok_or_else(|| ClientError::NotFound(format!("User '{username}' not found")))?;
        Ok(StatusReply {
            username: username.to_string(),
            balance: a.balance,
            time_left: a.time_left,
            version: a.version,
        })
    }

    async fn update_time(&self, body: &UpdateTimeBody) -> Result<UpdateTimeReply, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.update_calls += 1;
        Self::online(&state)?;
        let a = state
            .accounts
            .get_mut(&body.username)
            .ok_or_else(|| ClientError::NotFound(body.username.clone()))?;
        if body.version.is_some_and(|v| v != a.version) {
            return Err(ClientError::Conflict("stale version".into()));
        }
        a.time_left = body.time_left;
        a.version += 1;
        Ok(UpdateTimeReply { version: a.version })
    }

    async fn buy_package(&self, body: &PurchaseBody) -> Result<PurchaseReply, ClientError> {
        let gate = self.state.lock().unwrap().purchase_gate.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut state = self.state.lock().unwrap();
        state.purchase_calls += 1;
        Self::online(&state)?;
        let a = state
            .accounts
            .get_mut(&body.username)
            .ok_or_else(|| ClientError::NotFound(body.username.clone()))?;
        if a.balance < body.price {
            return Err(ClientError::InsufficientFunds(format!(
                "Balance {} is below price {}",
                a.balance, body.price
            )));
        }
        a.balance -= body.price;
        a.time_left += body.seconds;
        a.version += 1;
        Ok(PurchaseReply {
            new_balance: a.balance,
            new_time: a.time_left,
            version: a.version,
        })
    }

    async fn heartbeat(&self, _body: &HeartbeatBody) -> Result<(), ClientError> {
        let mut state = self.state.lock().unwrap();
        state.heartbeat_calls += 1;
        Self::online(&state)
    }

    async fn log_launch(&self, report: &LaunchReport) -> Result<(), ClientError> {
        let mut state = self.state.lock().unwrap();
        Self::online(&state)?;
        state.launches.push(report.clone());
        Ok(())
    }

    async fn login(&self, username: &str, _password: &str) -> Result<StatusReply, ClientError> {
        self.get_user_status(username).await
    }

    async fn packages(&self) -> Result<Vec<PackageInfo>, ClientError> {
        Ok(vec![PackageInfo {
            name: "1 час".into(),
            seconds: 3600,
            price: 350,
        }])
    }
}

/// Terminator that records names, optionally failing on one or stalling.
#[derive(Debug, Default)]
pub(crate) struct RecordingTerminator {
    calls: Mutex<Vec<String>>,
    failing: Option<String>,
    delay: Option<Duration>,
}

impl RecordingTerminator {
    pub(crate) fn failing_on(name: &str) -> Self {
        Self {
            failing: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Terminator that takes `delay` per process, like a hung `taskkill`.
    pub(crate) fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessTerminator for RecordingTerminator {
    async fn terminate(&self, process_name: &str) -> io::Result<bool> {
        self.calls.lock().unwrap().push(process_name.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.as_deref() == Some(process_name) {
            return Err(io::Error::other("access denied"));
        }
        Ok(true)
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingShell {
    restores: AtomicUsize,
}

impl RecordingShell {
    pub(crate) fn restores(&self) -> usize {
        self.restores.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ShellControl for RecordingShell {
    async fn restore(&self) -> io::Result<()> {
        self.restores.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
