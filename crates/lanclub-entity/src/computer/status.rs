//! Computer status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Registry status of a club machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ComputerStatus {
    /// Never reported.
    Unknown,
    /// Heartbeats stopped arriving.
    Disconnected,
    /// Online, nobody playing.
    Active,
    /// Online with a running paid session.
    InUse,
}

impl ComputerStatus {
    /// Return the status as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Disconnected => "disconnected",
            Self::Active => "active",
            Self::InUse => "in_use",
        }
    }
}

impl fmt::Display for ComputerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ComputerStatus {
    type Err = lanclub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "unknown" => Ok(Self::Unknown),
            "disconnected" | "offline" => Ok(Self::Disconnected),
            "active" | "online" => Ok(Self::Active),
            "in_use" | "busy" => Ok(Self::InUse),
            _ => Err(lanclub_core::AppError::validation(format!(
                "Invalid computer status: '{s}'. Expected one of: unknown, disconnected, active, in_use"
            ))),
        }
    }
}
