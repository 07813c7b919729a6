//! Computer registry: heartbeats, the monitoring view and the liveness sweep.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info};

use lanclub_core::config::RegistryConfig;
use lanclub_core::error::AppError;
use lanclub_database::repositories::ComputerRepository;
use lanclub_entity::computer::{Computer, ComputerView, HeartbeatUpdate};

/// Tracks which machine is up and who is sitting at it.
#[derive(Debug, Clone)]
pub struct RegistryService {
    computer_repo: Arc<ComputerRepository>,
    liveness_timeout: Duration,
}

impl RegistryService {
    /// Creates a new registry service.
    pub fn new(computer_repo: Arc<ComputerRepository>, config: &RegistryConfig) -> Self {
        Self {
            computer_repo,
            liveness_timeout: Duration::seconds(config.liveness_timeout_seconds.max(1)),
        }
    }

    /// Window after which a silent machine counts as offline.
    pub fn liveness_timeout(&self) -> Duration {
        self.liveness_timeout
    }

    /// Records a liveness report from a machine.
    pub async fn heartbeat(&self, mut update: HeartbeatUpdate) -> Result<Computer, AppError> {
        update.pc_name = update.pc_name.trim().to_string();
        if update.pc_name.is_empty() {
            return Err(AppError::validation("pc_name must not be empty"));
        }
        update.time_remaining = update.time_remaining.max(0);
        update.current_user = update
            .current_user
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        let computer = self.computer_repo.record_heartbeat(&update, Utc::now()).await?;
        debug!(
            pc_name = %computer.pc_name,
            status = %computer.status,
            time_remaining = computer.time_remaining,
            "Heartbeat recorded"
        );
        Ok(computer)
    }

    /// All machines with liveness applied at read time.
    pub async fn list_computers(&self) -> Result<Vec<ComputerView>, AppError> {
        let now = Utc::now();
        Ok(self
            .computer_repo
            .find_all()
            .await?
            .iter()
            .map(|c| c.view(now, self.liveness_timeout))
            .collect())
    }

    /// Persists `disconnected` for machines that stopped reporting.
    pub async fn sweep_stale(&self) -> Result<u64, AppError> {
        let now = Utc::now();
        let swept = self
            .computer_repo
            .mark_stale(now - self.liveness_timeout, now)
            .await?;
        if swept > 0 {
            info!(count = swept, "Marked silent computers as disconnected");
        }
        Ok(swept)
    }
}
