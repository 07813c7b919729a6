//! Kiosk client runtime configuration.

use serde::{Deserialize, Serialize};

/// Settings for the client that runs on each club machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the backend.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Name this machine reports to the registry.
    #[serde(default = "default_pc_name")]
    pub pc_name: String,
    /// Address reported with launch logs.
    #[serde(default)]
    pub ip_address: String,
    /// Seconds between push/pull sync iterations.
    #[serde(default = "default_sync_interval")]
    pub sync_interval_seconds: u64,
    /// Seconds between registry heartbeats.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_seconds: u64,
    /// Timeout for every backend call, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Allowed divergence between local and server time-left, in seconds.
    #[serde(default = "default_drift_tolerance")]
    pub drift_tolerance_seconds: i64,
    /// Remaining seconds at which the "time is running out" notice fires.
    #[serde(default = "default_warn_at")]
    pub warn_at_seconds: i64,
    /// Directory holding the per-user offline cache files.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
    /// Process names terminated when a session expires.
    #[serde(default = "default_process_denylist")]
    pub process_denylist: Vec<String>,
    /// Upper bound on concurrently outstanding one-off backend calls.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            pc_name: default_pc_name(),
            ip_address: String::new(),
            sync_interval_seconds: default_sync_interval(),
            heartbeat_interval_seconds: default_heartbeat_interval(),
            request_timeout_seconds: default_request_timeout(),
            drift_tolerance_seconds: default_drift_tolerance(),
            warn_at_seconds: default_warn_at(),
            cache_dir: default_cache_dir(),
            process_denylist: default_process_denylist(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

fn default_server_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_pc_name() -> String {
    "PC-01".to_string()
}

fn default_sync_interval() -> u64 {
    5
}

fn default_heartbeat_interval() -> u64 {
    15
}

fn default_request_timeout() -> u64 {
    5
}

fn default_drift_tolerance() -> i64 {
    5
}

fn default_warn_at() -> i64 {
    300
}

fn default_cache_dir() -> String {
    "./data/cache".to_string()
}

fn default_process_denylist() -> Vec<String> {
    ["chrome.exe", "firefox.exe", "opera.exe", "steam.exe", "notepad.exe", "game.exe"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_max_in_flight() -> usize {
    4
}
