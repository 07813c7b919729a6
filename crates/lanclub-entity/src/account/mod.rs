//! Customer accounts.

pub mod model;

pub use model::{
    Account, AccountStatus, CreateAccount, MAX_TIME_DELTA_SECONDS, NewPurchase, PurchaseOutcome,
};
