//! Response DTOs.
//!
//! Every success body is `{"status": "success", ...fields}`; the kiosk
//! clients key off the `status` field.

use serde::{Deserialize, Serialize};

use lanclub_entity::computer::ComputerView;
use lanclub_entity::package::Package;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Always `"success"`.
    pub status: String,
    /// Response fields, flattened next to `status`.
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            status: "success".to_string(),
            data,
        }
    }
}

/// Result of a time write-back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTimeResponse {
    /// Account version after the write.
    pub version: i64,
}

/// Result of a balance credit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    /// Balance after the credit.
    pub new_balance: i64,
    /// Account version after the credit.
    pub version: i64,
}

/// Result of a time grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantTimeResponse {
    /// Account name.
    pub username: String,
    /// Time-left after the grant.
    pub new_time: i64,
    /// Current balance.
    pub balance: i64,
    /// Account version after the grant.
    pub version: i64,
}

/// Accepted heartbeat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatResponse {
    /// Machine name as stored.
    pub pc_name: String,
}

/// Package catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackagesResponse {
    /// Packages on sale, in display order.
    pub packages: Vec<Package>,
}

/// Registry snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputersResponse {
    /// Every known machine.
    pub computers: Vec<ComputerView>,
}

/// Stored launch report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchLoggedResponse {
    /// Row identifier.
    pub id: i64,
}

/// Generic confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable message.
    pub message: String,
}

/// Liveness probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Server version.
    pub version: String,
    /// `ok` or `unavailable`.
    pub database: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_are_flattened_next_to_status() {
        let body = serde_json::to_value(ApiResponse::ok(BalanceResponse {
            new_balance: 150,
            version: 3,
        }))
        .expect("serialize");
        assert_eq!(
            body,
            serde_json::json!({"status": "success", "new_balance": 150, "version": 3})
        );
    }
}
