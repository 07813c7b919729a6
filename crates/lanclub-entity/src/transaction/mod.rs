//! Append-only money and time ledger.

pub mod kind;
pub mod model;

pub use kind::TransactionKind;
pub use model::{CreditOutcome, NewTransaction, Transaction};
