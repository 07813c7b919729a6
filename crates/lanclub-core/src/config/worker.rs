//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Scheduled maintenance job configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the scheduler is started with the server.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cron expression for the registry liveness sweep.
    #[serde(default = "default_liveness_schedule")]
    pub liveness_sweep_schedule: String,
    /// Cron expression for launch-log retention.
    #[serde(default = "default_retention_schedule")]
    pub launch_log_retention_schedule: String,
    /// Launch-log entries older than this many days are purged.
    #[serde(default = "default_retention_days")]
    pub launch_log_retention_days: i64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            liveness_sweep_schedule: default_liveness_schedule(),
            launch_log_retention_schedule: default_retention_schedule(),
            launch_log_retention_days: default_retention_days(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_liveness_schedule() -> String {
    "*/30 * * * * *".to_string()
}

fn default_retention_schedule() -> String {
    "0 0 4 * * *".to_string()
}

fn default_retention_days() -> i64 {
    30
}
