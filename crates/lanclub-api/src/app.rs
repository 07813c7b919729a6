//! Application builder: wires repositories, services, router, middleware
//! and the background scheduler into a running server.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use lanclub_core::config::AppConfig;
use lanclub_core::error::AppError;
use lanclub_database::repositories::{
    AccountRepository, ComputerRepository, LaunchLogRepository, PackageRepository,
    TransactionRepository,
};
use lanclub_service::{
    AccountService, AdminService, PasswordHasher, PaymentService, PurchaseService,
    RegistryService, TelemetryService,
};
use lanclub_worker::CronScheduler;

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds repositories and services on top of a migrated pool.
pub fn build_state(config: AppConfig, db_pool: SqlitePool) -> AppState {
    // ── Repositories ─────────────────────────────────────────────
    let account_repo = Arc::new(AccountRepository::new(db_pool.clone()));
    let transaction_repo = Arc::new(TransactionRepository::new(db_pool.clone()));
    let computer_repo = Arc::new(ComputerRepository::new(db_pool.clone()));
    let package_repo = Arc::new(PackageRepository::new(db_pool.clone()));
    let launch_repo = Arc::new(LaunchLogRepository::new(db_pool.clone()));

    // ── Services ─────────────────────────────────────────────────
    let hasher = Arc::new(PasswordHasher::new());
    let account_service = Arc::new(AccountService::new(
        Arc::clone(&account_repo),
        Arc::clone(&hasher),
    ));
    let admin_service = Arc::new(AdminService::new(
        Arc::clone(&account_repo),
        Arc::clone(&transaction_repo),
        Arc::clone(&hasher),
        config.admin.clone(),
    ));
    let purchase_service = Arc::new(PurchaseService::new(
        Arc::clone(&account_repo),
        Arc::clone(&package_repo),
    ));
    let payment_service = Arc::new(PaymentService::new(
        Arc::clone(&account_repo),
        config.payment.clone(),
    ));
    let registry_service = Arc::new(RegistryService::new(
        Arc::clone(&computer_repo),
        &config.registry,
    ));
    let telemetry_service = Arc::new(TelemetryService::new(Arc::clone(&launch_repo)));

    AppState {
        config: Arc::new(config),
        db_pool,
        account_service,
        admin_service,
        purchase_service,
        payment_service,
        registry_service,
        telemetry_service,
    }
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Runs the LanClub server until Ctrl+C / SIGTERM.
///
/// The pool must already be migrated.
pub async fn run_server(config: AppConfig, db_pool: SqlitePool) -> Result<(), AppError> {
    tracing::info!("Starting LanClub server...");

    // ── Step 1: Create data directories ──────────────────────────
    tokio::fs::create_dir_all(&config.server.data_root)
        .await
        .map_err(|e| {
            AppError::internal(format!(
                "Failed to create dir '{}': {e}",
                config.server.data_root
            ))
        })?;

    // ── Step 2: Repositories and services ────────────────────────
    let state = build_state(config.clone(), db_pool);
    if config.admin.password_hash.is_empty() {
        tracing::warn!("admin.password_hash is empty; admin endpoints will answer 503");
    }
    if !config.payment.enabled {
        tracing::info!("Payment webhook disabled");
    }

    // ── Step 3: Start background scheduler ───────────────────────
    let scheduler = if config.worker.enabled {
        let scheduler = CronScheduler::new(config.worker.clone()).await?;
        scheduler
            .register_default_tasks(
                Arc::clone(&state.registry_service),
                Arc::clone(&state.telemetry_service),
            )
            .await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Background worker disabled");
        None
    };

    // ── Step 4: Build and start HTTP server ──────────────────────
    let app = build_app(state.clone());
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("LanClub server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 5: Stop background tasks ────────────────────────────
    if let Some(scheduler) = scheduler {
        let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
        match tokio::time::timeout(grace, scheduler.shutdown()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "Scheduler shutdown failed"),
            Err(_) => tracing::warn!("Scheduler did not stop within the grace period"),
        }
    }
    state.db_pool.close().await;

    tracing::info!("LanClub server shut down gracefully");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
