//! Package catalog model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A purchasable block of time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Package {
    /// Row identifier.
    pub id: i64,
    /// Display label, unique ("1 час").
    pub name: String,
    /// Seconds added to the account.
    pub seconds: i64,
    /// Price in currency units.
    pub price: i64,
    /// Hidden packages stay in the table for history but cannot be bought.
    pub is_active: bool,
    /// Display order on the kiosk.
    pub sort_order: i64,
}

impl Package {
    /// Whether a client-supplied seconds/price pair matches this package.
    pub fn matches(&self, seconds: i64, price: i64) -> bool {
        self.seconds == seconds && self.price == price
    }
}
