//! Launch log model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One application launch reported by a kiosk.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LaunchLog {
    /// Row identifier.
    pub id: i64,
    /// Reporting machine.
    pub computer_name: String,
    /// Reporting machine address.
    pub ip_address: String,
    /// Account logged in at launch time.
    pub username: Option<String>,
    /// Launched application label.
    pub app_name: String,
    /// When the launch was recorded.
    pub created_at: DateTime<Utc>,
}

/// Launch report about to be stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLaunchLog {
    /// Reporting machine.
    pub computer_name: String,
    /// Reporting machine address.
    pub ip_address: String,
    /// Account logged in at launch time.
    pub username: Option<String>,
    /// Launched application label.
    pub app_name: String,
}
