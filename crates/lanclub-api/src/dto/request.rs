//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// `GET /api/get_user_status` query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusQuery {
    /// Account to read.
    #[serde(default)]
    pub username: String,
}

/// Time write-back from a running kiosk.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateTimeRequest {
    /// Account name.
    #[validate(length(min = 1, max = 64, message = "username is required"))]
    pub username: String,
    /// Locally counted seconds left.
    #[validate(range(min = 0, message = "time_left must not be negative"))]
    pub time_left: i64,
    /// Account version the client last applied; omitted by old clients.
    #[serde(default)]
    pub version: Option<i64>,
}

/// Package purchase request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BuyPackageRequest {
    /// Buyer.
    #[validate(length(min = 1, max = 64, message = "username is required"))]
    pub username: String,
    /// Seconds to add.
    #[validate(range(min = 1, max = 31_622_400, message = "seconds must be between 1 and 31622400"))]
    pub seconds: i64,
    /// Price to deduct.
    #[validate(range(min = 0, message = "price must not be negative"))]
    pub price: i64,
    /// Package label.
    #[validate(length(min = 1, max = 64, message = "package_name is required"))]
    pub package_name: String,
    /// Originating machine.
    #[validate(length(min = 1, max = 64, message = "pc_name is required"))]
    pub pc_name: String,
}

/// Liveness report.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HeartbeatRequest {
    /// Machine name.
    #[validate(length(min = 1, max = 64, message = "pc_name is required"))]
    pub pc_name: String,
    /// Reported status; `active` when omitted.
    #[serde(default)]
    pub status: Option<String>,
    /// Logged-in account.
    #[serde(default)]
    pub user: Option<String>,
    /// Client-side time-left.
    #[serde(default)]
    pub time_left: i64,
}

/// Admin balance top-up.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddBalanceRequest {
    /// Account to credit.
    #[validate(length(min = 1, max = 64, message = "username is required"))]
    pub username: String,
    /// Amount to add.
    #[validate(range(min = 1, message = "amount must be positive"))]
    pub amount: i64,
}

/// Admin time grant.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GrantTimeRequest {
    /// Account to credit.
    #[validate(length(min = 1, max = 64, message = "username is required"))]
    pub username: String,
    /// Seconds to add.
    #[validate(range(min = 1, max = 31_622_400, message = "seconds must be between 1 and 31622400"))]
    pub seconds: i64,
}

/// Registration and login body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CredentialsRequest {
    /// Username.
    #[validate(length(min = 1, max = 64, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Application launch report.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LaunchLogRequest {
    /// Reporting machine.
    #[validate(length(min = 1, max = 128, message = "computer_name is required"))]
    pub computer_name: String,
    /// Reporting machine address.
    #[serde(default)]
    pub ip_address: String,
    /// OS or club account that launched the application.
    #[serde(default)]
    pub user: Option<String>,
    /// Application label.
    #[validate(length(min = 1, max = 128, message = "app_name is required"))]
    pub app_name: String,
}
