//! Computer registry configuration.

use serde::{Deserialize, Serialize};

/// Liveness rules for the computer registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Seconds without a heartbeat after which a machine counts as offline.
    #[serde(default = "default_liveness_timeout")]
    pub liveness_timeout_seconds: i64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            liveness_timeout_seconds: default_liveness_timeout(),
        }
    }
}

fn default_liveness_timeout() -> i64 {
    60
}
