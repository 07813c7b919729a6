//! # lanclub-service
//!
//! Business logic service layer for LanClub. Each service validates its
//! input and orchestrates repositories to implement one application-level
//! use case; the HTTP layer only maps DTOs in and results out.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod account;
pub mod password;
pub mod payment;
pub mod purchase;
pub mod registry;
pub mod telemetry;

pub use account::{AccountService, AdminService};
pub use password::PasswordHasher;
pub use payment::{KaspiNotification, PaymentService};
pub use purchase::PurchaseService;
pub use registry::RegistryService;
pub use telemetry::TelemetryService;

#[cfg(test)]
pub(crate) mod test_support {
    use lanclub_core::config::DatabaseConfig;
    use lanclub_database::DatabasePool;
    use lanclub_database::migration::run_migrations;
    use sqlx::SqlitePool;

    pub async fn pool() -> SqlitePool {
        let db = DatabasePool::connect(&DatabaseConfig::in_memory())
            .await
            .expect("in-memory database");
        run_migrations(db.pool()).await.expect("migrations");
        db.into_pool()
    }
}
