//! Repository implementations for all LanClub entities.

pub mod account;
pub mod computer;
pub mod launch_log;
pub mod package;
pub mod transaction;

pub use account::AccountRepository;
pub use computer::ComputerRepository;
pub use launch_log::LaunchLogRepository;
pub use package::PackageRepository;
pub use transaction::TransactionRepository;

/// Whether a sqlx error is a UNIQUE constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
