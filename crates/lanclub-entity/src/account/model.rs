//! Account entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A customer account holding money and prepaid time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    /// Row identifier.
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Balance in currency units, never negative.
    pub balance: i64,
    /// Remaining paid time in seconds, never negative.
    pub time_left: i64,
    /// Incremented on every balance or time mutation.
    pub version: i64,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Public view of the account without credentials.
    pub fn status(&self) -> AccountStatus {
        AccountStatus {
            username: self.username.clone(),
            balance: self.balance,
            time_left: self.time_left,
            version: self.version,
        }
    }
}

/// Balance and time snapshot returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AccountStatus {
    /// Account name.
    pub username: String,
    /// Current balance.
    pub balance: i64,
    /// Current time-left in seconds.
    pub time_left: i64,
    /// Version of the row this snapshot was read at.
    pub version: i64,
}

/// Data required to create a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccount {
    /// Desired username.
    pub username: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Opening balance.
    pub balance: i64,
}

/// Largest amount of time one purchase or grant may add (366 days).
pub const MAX_TIME_DELTA_SECONDS: i64 = 31_622_400;

/// A package purchase requested from a club machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPurchase {
    /// Buyer.
    pub username: String,
    /// Seconds to add, strictly positive.
    pub seconds: i64,
    /// Price to deduct, never negative.
    pub price: i64,
    /// Package label recorded on the ledger and registry.
    pub package_name: String,
    /// Machine the purchase came from.
    pub pc_name: String,
}

/// Result of a committed package purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PurchaseOutcome {
    /// Balance after the price was deducted.
    pub new_balance: i64,
    /// Time-left after the package seconds were added.
    pub new_time: i64,
    /// Account version after the purchase.
    pub version: i64,
}
