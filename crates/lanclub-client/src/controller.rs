//! Single owner of kiosk session state.
//!
//! The controller is the only place that mutates balance, countdown and
//! version bookkeeping. Timer ticks, sync results and finished background
//! calls arrive as messages, so every decision runs on one task and never
//! races another.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use lanclub_core::config::ClientConfig;
use thiserror::Error;
use tokio::sync::{Notify, mpsc, watch};
use tracing::{debug, info, warn};

use crate::api::BackendClient;
use crate::cache::{CachedStatus, StatusCache};
use crate::error::ClientError;
use crate::events::{ClientEvent, SessionSnapshot};
use crate::expiry::ExpiryHandler;
use crate::pool::TaskPool;
use crate::protocol::{LaunchReport, PurchaseBody, PurchaseReply, StatusReply, UpdateTimeBody};
use crate::reconcile::{Decision, SessionPhase, reconcile};
use crate::timer::{SessionTimer, TimerEvent, TimerEventKind};

const COMMAND_BUFFER: usize = 32;

/// A package the user picked on the kiosk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageChoice {
    /// Package label.
    pub name: String,
    /// Seconds granted.
    pub seconds: i64,
    /// Price.
    pub price: i64,
}

/// Requests from the UI.
#[derive(Debug, Clone)]
pub enum Command {
    /// Buy a package.
    Purchase(PackageChoice),
    /// Sync with the server now.
    SyncNow,
    /// Report that an application was started.
    RecordLaunch {
        /// Application name.
        app_name: String,
    },
    /// Write the countdown back and end the controller.
    Logout,
}

/// Notifications for the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// The countdown advanced.
    Tick { remaining: i64 },
    /// Time is running out.
    Warning { remaining: i64 },
    /// A countdown started from server time.
    SessionStarted { time_left: i64 },
    /// A running countdown was corrected to the server value.
    TimeAdjusted { time_left: i64 },
    /// The known balance changed.
    BalanceUpdated { balance: i64 },
    /// Purchase buttons should be enabled or disabled.
    PurchaseControls { enabled: bool },
    /// A purchase went through.
    PurchaseSucceeded { new_balance: i64, new_time: i64 },
    /// A purchase was refused.
    PurchaseFailed { message: String },
    /// The server is unreachable; counting down from the cache.
    Offline { time_left: i64 },
    /// A status pull failed.
    SyncFailed { message: String },
    /// The countdown hit zero and cleanup ran.
    SessionEnded,
    /// The user logged out.
    LoggedOut,
}

/// Why a purchase request was refused locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    /// Another purchase has not finished yet.
    #[error("a purchase is already in progress")]
    InFlight,
    /// The known balance does not cover the price.
    #[error("insufficient funds: balance {balance}, price {price}")]
    InsufficientFunds { balance: i64, price: i64 },
    /// The package has no time or a negative price.
    #[error("invalid package: {0}")]
    InvalidPackage(String),
}

/// Per-session settings taken from [`ClientConfig`].
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    /// Logged-in account.
    pub username: String,
    /// This machine.
    pub pc_name: String,
    /// Address reported in launch logs.
    pub ip_address: String,
    /// Allowed drift before a running countdown is corrected.
    pub drift_tolerance: i64,
    /// Remaining seconds at which the warning fires.
    pub warn_at: i64,
    /// Concurrent one-off backend calls.
    pub max_in_flight: usize,
    /// How long shutdown waits for pooled calls.
    pub shutdown_grace: Duration,
}

impl ControllerSettings {
    /// Settings for `username` on the machine described by `config`.
    pub fn from_config(config: &ClientConfig, username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            pc_name: config.pc_name.clone(),
            ip_address: config.ip_address.clone(),
            drift_tolerance: config.drift_tolerance_seconds.max(0),
            warn_at: config.warn_at_seconds,
            max_in_flight: config.max_in_flight,
            shutdown_grace: Duration::from_secs(config.request_timeout_seconds.max(1) + 1),
        }
    }
}

/// Channel ends handed to the UI and the background loops.
#[derive(Debug)]
pub struct ControllerLinks {
    /// Send commands to the controller.
    pub commands: mpsc::Sender<Command>,
    /// Receive UI notifications.
    pub ui: mpsc::UnboundedReceiver<UiEvent>,
    /// Session view for the sync and heartbeat loops.
    pub snapshot: watch::Receiver<SessionSnapshot>,
    /// Where background tasks post their results.
    pub client_events: mpsc::UnboundedSender<ClientEvent>,
    /// Wakes the sync loop for an immediate iteration.
    pub sync_now: Arc<Notify>,
}

/// Owns the countdown and everything the kiosk knows about the account.
pub struct SessionController {
    settings: ControllerSettings,
    backend: Arc<dyn BackendClient>,
    cache: StatusCache,
    expiry: Arc<ExpiryHandler>,
    timer: SessionTimer,
    timer_events: mpsc::UnboundedReceiver<TimerEvent>,
    client_tx: mpsc::UnboundedSender<ClientEvent>,
    client_events: mpsc::UnboundedReceiver<ClientEvent>,
    commands: mpsc::Receiver<Command>,
    ui: mpsc::UnboundedSender<UiEvent>,
    snapshot: watch::Sender<SessionSnapshot>,
    sync_now: Arc<Notify>,
    pool: TaskPool,

    phase: SessionPhase,
    balance: Option<i64>,
    applied_version: i64,
    expired_version: Option<i64>,
    purchase_in_flight: bool,
    offline: bool,
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("username", &self.settings.username)
            .field("phase", &self.phase)
            .field("balance", &self.balance)
            .field("applied_version", &self.applied_version)
            .field("timer", &self.timer)
            .finish()
    }
}

impl SessionController {
    /// Create a controller and the channel ends that drive it.
    pub fn new(
        settings: ControllerSettings,
        backend: Arc<dyn BackendClient>,
        cache: StatusCache,
        expiry: ExpiryHandler,
    ) -> (Self, ControllerLinks) {
        let (timer_tx, timer_events) = mpsc::unbounded_channel();
        let (client_tx, client_events) = mpsc::unbounded_channel();
        let (command_tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let (ui, ui_rx) = mpsc::unbounded_channel();
        let (snapshot, snapshot_rx) = watch::channel(SessionSnapshot {
            username: settings.username.clone(),
            ..SessionSnapshot::default()
        });
        let sync_now = Arc::new(Notify::new());

        let links = ControllerLinks {
            commands: command_tx,
            ui: ui_rx,
            snapshot: snapshot_rx,
            client_events: client_tx.clone(),
            sync_now: Arc::clone(&sync_now),
        };

        let controller = Self {
            timer: SessionTimer::new(timer_tx, settings.warn_at),
            pool: TaskPool::new(settings.max_in_flight),
            settings,
            backend,
            cache,
            expiry: Arc::new(expiry),
            timer_events,
            client_tx,
            client_events,
            commands,
            ui,
            snapshot,
            sync_now,
            phase: SessionPhase::NoSession,
            balance: None,
            applied_version: 0,
            expired_version: None,
            purchase_in_flight: false,
            offline: false,
        };

        (controller, links)
    }

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Last known balance.
    pub fn balance(&self) -> Option<i64> {
        self.balance
    }

    /// Last applied account version.
    pub fn applied_version(&self) -> i64 {
        self.applied_version
    }

    /// Seconds left on the countdown.
    pub fn remaining(&self) -> i64 {
        self.timer.remaining()
    }

    /// Seed the known balance from the offline cache so the purchase
    /// pre-check works before the first pull.
    pub async fn restore_from_cache(&mut self) {
        match self.cache.load(&self.settings.username).await {
            Ok(Some(cached)) => {
                self.balance = Some(cached.balance);
                self.emit(UiEvent::BalanceUpdated {
                    balance: cached.balance,
                });
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Ignoring unreadable status cache"),
        }
    }

    /// Start a purchase unless one is in flight or the known balance is
    /// too low. The result arrives later as a [`ClientEvent`].
    pub fn request_purchase(&mut self, choice: PackageChoice) -> Result<(), PurchaseError> {
        if self.purchase_in_flight {
            return Err(PurchaseError::InFlight);
        }
        if choice.seconds <= 0 || choice.price < 0 || choice.name.trim().is_empty() {
            return Err(PurchaseError::InvalidPackage(choice.name));
        }
        if let Some(balance) = self.balance {
            if balance < choice.price {
                return Err(PurchaseError::InsufficientFunds {
                    balance,
                    price: choice.price,
                });
            }
        }

        self.purchase_in_flight = true;
        self.emit(UiEvent::PurchaseControls { enabled: false });

        let body = PurchaseBody {
            username: self.settings.username.clone(),
            seconds: choice.seconds,
            price: choice.price,
            package_name: choice.name,
            pc_name: self.settings.pc_name.clone(),
        };
        let backend = Arc::clone(&self.backend);
        let events = self.client_tx.clone();
        self.pool.spawn(async move {
            let result = backend.buy_package(&body).await;
            let _ = events.send(ClientEvent::PurchaseFinished(result));
        });
        Ok(())
    }

    /// Handle the next incoming message. Returns `false` once the
    /// controller should stop (logout or all command senders dropped).
    pub async fn step(&mut self) -> bool {
        tokio::select! {
            Some(event) = self.timer_events.recv() => {
                self.on_timer(event);
                true
            }
            Some(event) = self.client_events.recv() => {
                self.on_client_event(event).await;
                true
            }
            command = self.commands.recv() => match command {
                Some(command) => self.on_command(command).await,
                None => false,
            },
        }
    }

    /// Process messages until logout, then shut down.
    pub async fn run(mut self) {
        self.restore_from_cache().await;
        self.sync_now.notify_one();
        while self.step().await {}
        self.shutdown().await;
    }

    /// Stop the countdown and wait for pooled calls.
    pub async fn shutdown(&mut self) {
        self.timer.stop().await;
        self.pool.drain(self.settings.shutdown_grace).await;
        info!(username = %self.settings.username, "Session controller stopped");
    }

    fn on_timer(&mut self, event: TimerEvent) {
        if event.generation != self.timer.generation() {
            return;
        }

        match event.kind {
            TimerEventKind::Tick { remaining } => {
                self.publish_snapshot();
                self.emit(UiEvent::Tick { remaining });
            }
            TimerEventKind::Warning { remaining } => {
                self.emit(UiEvent::Warning { remaining });
            }
            TimerEventKind::Expired => {
                if self.phase == SessionPhase::Expired {
                    return;
                }
                self.phase = SessionPhase::Expired;
                self.expired_version = Some(self.applied_version);
                self.publish_snapshot();

                let expiry = Arc::clone(&self.expiry);
                let events = self.client_tx.clone();
                let generation = event.generation;
                self.pool.spawn(async move {
                    if let Some(report) = expiry.handle(generation).await {
                        let _ = events.send(ClientEvent::ExpiryCompleted(report));
                    }
                });
            }
        }
    }

    async fn on_client_event(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::StatusPulled(status) => self.on_status(status).await,
            ClientEvent::PullFailed(err) => self.on_pull_failed(err).await,
            ClientEvent::TimePushed { version } => {
                self.applied_version = self.applied_version.max(version);
                self.publish_snapshot();
            }
            ClientEvent::PushFailed(err) => {
                debug!(error = %err, "Write-back refused, waiting for the next pull");
            }
            ClientEvent::PurchaseFinished(result) => self.on_purchase_finished(result).await,
            ClientEvent::ExpiryCompleted(report) => {
                if self.phase != SessionPhase::Expired
                    || report.generation != self.timer.generation()
                {
                    debug!(generation = report.generation, "Session restarted during cleanup");
                    return;
                }
                self.emit(UiEvent::SessionEnded);
                self.phase = SessionPhase::NoSession;
                self.publish_snapshot();
                self.save_cache(self.balance.unwrap_or(0), 0).await;
                self.push_zero();
            }
            ClientEvent::ZeroPushed(Ok(version)) => {
                self.applied_version = self.applied_version.max(version);
                self.expired_version = Some(self.expired_version.unwrap_or(0).max(version));
                self.publish_snapshot();
            }
            ClientEvent::ZeroPushed(Err(err)) => {
                warn!(error = %err, "Could not clear server time after expiry");
            }
        }
    }

    async fn on_status(&mut self, status: StatusReply) {
        if status.version < self.applied_version {
            debug!(
                version = status.version,
                applied = self.applied_version,
                "Ignoring stale status"
            );
            return;
        }
        self.applied_version = status.version;
        self.offline = false;

        if self.balance != Some(status.balance) {
            self.balance = Some(status.balance);
            self.emit(UiEvent::BalanceUpdated {
                balance: status.balance,
            });
        }
        self.save_cache(status.balance, status.time_left).await;

        match self.phase {
            SessionPhase::Expired => return,
            SessionPhase::NoSession
                if self
                    .expired_version
                    .is_some_and(|expired| status.version <= expired) =>
            {
                return;
            }
            _ => {}
        }

        let local = (self.phase == SessionPhase::Running).then(|| self.timer.remaining());
        match reconcile(local, status.time_left, self.settings.drift_tolerance) {
            Decision::Start(seconds) => {
                self.start_countdown(seconds).await;
                self.emit(UiEvent::SessionStarted { time_left: seconds });
            }
            Decision::Restart(seconds) => {
                info!(local = ?local, server = seconds, "Correcting drifted countdown");
                self.start_countdown(seconds).await;
                self.emit(UiEvent::TimeAdjusted { time_left: seconds });
            }
            Decision::Keep => {}
        }
        self.publish_snapshot();
    }

    async fn on_pull_failed(&mut self, err: ClientError) {
        self.emit(UiEvent::SyncFailed {
            message: err.to_string(),
        });

        if self.phase != SessionPhase::NoSession || self.offline {
            return;
        }

        let cached = match self.cache.load(&self.settings.username).await {
            Ok(Some(cached)) => cached,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "Status cache unreadable while offline");
                return;
            }
        };
        if cached.time_left <= 0
            || self
                .expired_version
                .is_some_and(|expired| cached.version <= expired)
        {
            return;
        }

        info!(time_left = cached.time_left, "Server unreachable, counting down from cache");
        self.offline = true;
        self.applied_version = self.applied_version.max(cached.version);
        self.balance = Some(cached.balance);
        self.start_countdown(cached.time_left).await;
        self.publish_snapshot();
        self.emit(UiEvent::Offline {
            time_left: cached.time_left,
        });
    }

    async fn on_purchase_finished(&mut self, result: Result<PurchaseReply, ClientError>) {
        self.purchase_in_flight = false;
        self.emit(UiEvent::PurchaseControls { enabled: true });

        let reply = match result {
            Ok(reply) => reply,
            Err(err) => {
                warn!(error = %err, "Purchase failed");
                self.emit(UiEvent::PurchaseFailed {
                    message: err.to_string(),
                });
                self.sync_now.notify_one();
                return;
            }
        };

        info!(
            new_balance = reply.new_balance,
            new_time = reply.new_time,
            version = reply.version,
            "Purchase applied"
        );

        if reply.version < self.applied_version {
            debug!(version = reply.version, "Purchase reply older than applied state");
        } else {
            let was_running = self.phase == SessionPhase::Running;
            self.applied_version = reply.version;
            self.expired_version = None;
            self.balance = Some(reply.new_balance);
            self.start_countdown(reply.new_time).await;
            self.save_cache(reply.new_balance, reply.new_time).await;
            self.publish_snapshot();
            self.emit(UiEvent::BalanceUpdated {
                balance: reply.new_balance,
            });
            if !was_running {
                self.emit(UiEvent::SessionStarted {
                    time_left: reply.new_time,
                });
            }
        }

        self.emit(UiEvent::PurchaseSucceeded {
            new_balance: reply.new_balance,
            new_time: reply.new_time,
        });
    }

    async fn on_command(&mut self, command: Command) -> bool {
        match command {
            Command::Purchase(choice) => {
                if let Err(err) = self.request_purchase(choice) {
                    self.emit(UiEvent::PurchaseFailed {
                        message: err.to_string(),
                    });
                }
                true
            }
            Command::SyncNow => {
                self.sync_now.notify_one();
                true
            }
            Command::RecordLaunch { app_name } => {
                let report = LaunchReport {
                    computer_name: self.settings.pc_name.clone(),
                    ip_address: self.settings.ip_address.clone(),
                    user: Some(self.settings.username.clone()),
                    app_name,
                };
                let backend = Arc::clone(&self.backend);
                self.pool.spawn(async move {
                    if let Err(e) = backend.log_launch(&report).await {
                        warn!(app = %report.app_name, error = %e, "Launch report failed");
                    }
                });
                true
            }
            Command::Logout => {
                self.logout().await;
                false
            }
        }
    }

    async fn logout(&mut self) {
        if self.phase == SessionPhase::Running {
            let time_left = self.timer.remaining();
            self.timer.stop().await;
            let body = UpdateTimeBody {
                username: self.settings.username.clone(),
                time_left,
                version: Some(self.applied_version),
            };
            let backend = Arc::clone(&self.backend);
            self.pool.spawn(async move {
                if let Err(e) = backend.update_time(&body).await {
                    warn!(error = %e, "Final write-back failed");
                }
            });
        }
        self.phase = SessionPhase::NoSession;
        self.publish_snapshot();
        self.emit(UiEvent::LoggedOut);
        info!(username = %self.settings.username, "Logged out");
    }

    async fn start_countdown(&mut self, seconds: i64) {
        self.timer.start(seconds).await;
        if seconds > 0 {
            self.phase = SessionPhase::Running;
        }
    }

    fn push_zero(&mut self) {
        let body = UpdateTimeBody {
            username: self.settings.username.clone(),
            time_left: 0,
            version: Some(self.applied_version),
        };
        let backend = Arc::clone(&self.backend);
        let events = self.client_tx.clone();
        self.pool.spawn(async move {
            let result = backend.update_time(&body).await.map(|reply| reply.version);
            let _ = events.send(ClientEvent::ZeroPushed(result));
        });
    }

    async fn save_cache(&self, balance: i64, time_left: i64) {
        let entry = CachedStatus {
            balance,
            time_left,
            version: self.applied_version,
            saved_at: Utc::now(),
        };
        if let Err(e) = self.cache.save(&self.settings.username, &entry).await {
            warn!(error = %e, "Failed to write status cache");
        }
    }

    fn publish_snapshot(&self) {
        let running_time_left =
            (self.phase == SessionPhase::Running).then(|| self.timer.remaining());
        self.snapshot.send_replace(SessionSnapshot {
            username: self.settings.username.clone(),
            phase: self.phase,
            running_time_left,
            version: self.applied_version,
        });
    }

    fn emit(&self, event: UiEvent) {
        let _ = self.ui.send(event);
    }
}
