//! Ledger entry model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::kind::TransactionKind;

/// One immutable ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    /// Row identifier.
    pub id: i64,
    /// Cause of the entry.
    pub kind: TransactionKind,
    /// Affected account.
    pub username: String,
    /// Money moved (price for purchases, credit for top-ups).
    pub amount: i64,
    /// Time moved, in seconds.
    pub seconds: i64,
    /// Payment provider order identifier, unique when present.
    pub order_id: Option<String>,
    /// Machine the entry originated from.
    pub pc_name: Option<String>,
    /// Free-form note (package label, admin name).
    pub description: Option<String>,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}

/// Ledger entry about to be appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    /// Cause of the entry.
    pub kind: TransactionKind,
    /// Affected account.
    pub username: String,
    /// Money moved.
    pub amount: i64,
    /// Time moved, in seconds.
    pub seconds: i64,
    /// Payment provider order identifier.
    pub order_id: Option<String>,
    /// Originating machine.
    pub pc_name: Option<String>,
    /// Free-form note.
    pub description: Option<String>,
}

impl NewTransaction {
    /// Ledger entry for a balance credit.
    pub fn credit(kind: TransactionKind, username: &str, amount: i64) -> Self {
        Self {
            kind,
            username: username.to_string(),
            amount,
            seconds: 0,
            order_id: None,
            pc_name: None,
            description: None,
        }
    }

    /// Attach a provider order identifier.
    pub fn with_order_id(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    /// Attach a note.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Result of a balance credit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditOutcome {
    /// Balance after the credit (or the unchanged balance on replay).
    pub new_balance: i64,
    /// Account version after the credit.
    pub version: i64,
    /// True when the order id was already recorded and nothing changed.
    pub duplicate: bool,
}
