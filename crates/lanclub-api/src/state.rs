//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::SqlitePool;

use lanclub_core::config::AppConfig;
use lanclub_service::{
    AccountService, AdminService, PaymentService, PurchaseService, RegistryService,
    TelemetryService,
};

/// Shared application state.
///
/// Cloned into every handler by Axum; every field is cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────────
    /// Loaded application configuration.
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────────
    /// SQLite connection pool.
    pub db_pool: SqlitePool,

    // ── Services ─────────────────────────────────────────────────
    /// Customer self-service.
    pub account_service: Arc<AccountService>,
    /// Administrator operations.
    pub admin_service: Arc<AdminService>,
    /// Package purchases.
    pub purchase_service: Arc<PurchaseService>,
    /// Payment webhook.
    pub payment_service: Arc<PaymentService>,
    /// Computer registry.
    pub registry_service: Arc<RegistryService>,
    /// Launch telemetry.
    pub telemetry_service: Arc<TelemetryService>,
}
