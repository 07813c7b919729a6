//! Ledger entry kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What caused a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Balance credited by the payment provider webhook.
    PaymentTopUp,
    /// Balance exchanged for time.
    PackagePurchase,
    /// Balance credited by an administrator.
    AdminTopUp,
    /// Time granted by an administrator.
    AdminGrant,
}

impl TransactionKind {
    /// Return the kind as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PaymentTopUp => "payment_top_up",
            Self::PackagePurchase => "package_purchase",
            Self::AdminTopUp => "admin_top_up",
            Self::AdminGrant => "admin_grant",
        }
    }

    /// Whether the entry moved money into an account.
    pub fn is_credit(&self) -> bool {
        matches!(self, Self::PaymentTopUp | Self::AdminTopUp)
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = lanclub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "payment_top_up" => Ok(Self::PaymentTopUp),
            "package_purchase" => Ok(Self::PackagePurchase),
            "admin_top_up" => Ok(Self::AdminTopUp),
            "admin_grant" => Ok(Self::AdminGrant),
            _ => Err(lanclub_core::AppError::validation(format!(
                "Invalid transaction kind: '{s}'"
            ))),
        }
    }
}
