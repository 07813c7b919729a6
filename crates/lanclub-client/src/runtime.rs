//! Wiring of the controller and its background loops.

use std::sync::Arc;
use std::time::Duration;

use lanclub_core::config::ClientConfig;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::api::BackendClient;
use crate::cache::StatusCache;
use crate::controller::{Command, ControllerSettings, SessionController, UiEvent};
use crate::expiry::ExpiryHandler;
use crate::heartbeat::run_heartbeat;
use crate::sync::SyncLoop;

/// A running kiosk session: controller, sync loop and heartbeat loop.
#[derive(Debug)]
pub struct ClientRuntime {
    commands: mpsc::Sender<Command>,
    shutdown: watch::Sender<bool>,
    controller: JoinHandle<()>,
    loops: Vec<JoinHandle<()>>,
}

impl ClientRuntime {
    /// Spawn the session for `username`. UI notifications arrive on the
    /// returned receiver.
    pub fn start(
        config: &ClientConfig,
        username: impl Into<String>,
        backend: Arc<dyn BackendClient>,
        expiry: ExpiryHandler,
    ) -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let settings = ControllerSettings::from_config(config, username);
        let username = settings.username.clone();
        let cache = StatusCache::new(&config.cache_dir);

        let (controller, links) =
            SessionController::new(settings, Arc::clone(&backend), cache, expiry);
        let (shutdown, shutdown_rx) = watch::channel(false);

        let sync = SyncLoop::new(
            Arc::clone(&backend),
            links.snapshot.clone(),
            links.client_events.clone(),
            Arc::clone(&links.sync_now),
            Duration::from_secs(config.sync_interval_seconds),
        );
        let loops = vec![
            tokio::spawn(sync.run(shutdown_rx.clone())),
            tokio::spawn(run_heartbeat(
                backend,
                config.pc_name.clone(),
                links.snapshot.clone(),
                Duration::from_secs(config.heartbeat_interval_seconds),
                shutdown_rx,
            )),
        ];
        let controller = tokio::spawn(controller.run());

        info!(username = %username, pc_name = %config.pc_name, "Kiosk session started");

        let runtime = Self {
            commands: links.commands,
            shutdown,
            controller,
            loops,
        };
        (runtime, links.ui)
    }

    /// Sender for UI commands.
    pub fn commands(&self) -> mpsc::Sender<Command> {
        self.commands.clone()
    }

    /// Send a command, ignoring it if the controller already stopped.
    pub async fn send(&self, command: Command) {
        if self.commands.send(command).await.is_err() {
            warn!("Session controller is no longer running");
        }
    }

    /// Log out, stop the loops and wait for everything to finish.
    pub async fn shutdown(self) {
        let _ = self.commands.send(Command::Logout).await;
        drop(self.commands);
        if let Err(e) = self.controller.await {
            warn!(error = %e, "Session controller task failed");
        }

        let _ = self.shutdown.send(true);
        for handle in self.loops {
            if let Err(e) = handle.await {
                warn!(error = %e, "Background loop task failed");
            }
        }
        info!("Kiosk session stopped");
    }
}
