//! JSON bodies exchanged with the backend.

use serde::{Deserialize, Serialize};

/// `GET /api/get_user_status` and `POST /api/login` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReply {
    /// Account name.
    #[serde(default)]
    pub username: String,
    /// Current balance.
    pub balance: i64,
    /// Server-side time-left in seconds.
    pub time_left: i64,
    /// Account version; servers without versioning report 0.
    #[serde(default)]
    pub version: i64,
}

/// `POST /api/update_time` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTimeBody {
    /// Account name.
    pub username: String,
    /// Locally counted seconds left.
    pub time_left: i64,
    /// Version the client last applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
}

/// `POST /api/update_time` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTimeReply {
    /// Account version after the write.
    #[serde(default)]
    pub version: i64,
}

/// `POST /api/buy_package` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseBody {
    /// Buyer.
    pub username: String,
    /// Seconds to add.
    pub seconds: i64,
    /// Price to deduct.
    pub price: i64,
    /// Package label.
    pub package_name: String,
    /// This machine.
    pub pc_name: String,
}

/// `POST /api/buy_package` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseReply {
    /// Balance after the purchase.
    pub new_balance: i64,
    /// Time-left after the purchase.
    pub new_time: i64,
    /// Account version after the purchase.
    #[serde(default)]
    pub version: i64,
}

/// `POST /api/heartbeat` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatBody {
    /// This machine.
    pub pc_name: String,
    /// `active` or `in_use`.
    pub status: String,
    /// Logged-in account.
    pub user: Option<String>,
    /// Running countdown, 0 when idle.
    pub time_left: i64,
}

/// `POST /log_launch` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchReport {
    /// This machine.
    pub computer_name: String,
    /// This machine's address.
    pub ip_address: String,
    /// Logged-in account.
    pub user: Option<String>,
    /// Launched application.
    pub app_name: String,
}

/// `POST /api/login` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsBody {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    /// Display label.
    pub name: String,
    /// Seconds granted.
    pub seconds: i64,
    /// Price.
    pub price: i64,
}

/// `GET /api/packages` reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackagesReply {
    /// Packages on sale.
    pub packages: Vec<PackageInfo>,
}

/// Error body `{status:"error", error, message}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable code, absent on older servers.
    #[serde(default)]
    pub error: Option<String>,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}
