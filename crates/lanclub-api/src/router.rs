//! Route definitions for the LanClub HTTP API.
//!
//! Kiosk, account and admin routes are mounted under `/api`; the launch
//! telemetry endpoint stays at `/log_launch` where deployed kiosks post it.

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the router with every route, plus request logging unless disabled.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(session_routes())
        .merge(auth_routes())
        .merge(admin_routes())
        .merge(payment_routes())
        .route("/health", get(handlers::health::health));

    let log_requests = state.config.logging.log_requests;
    let router = Router::new()
        .nest("/api", api_routes)
        .route("/log_launch", post(handlers::launch::log_launch));

    let router = if log_requests {
        router.layer(axum_middleware::from_fn(middleware::logging::request_logging))
    } else {
        router
    };
    router.with_state(state)
}

/// Kiosk session endpoints
fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/get_user_status", get(handlers::session::get_user_status))
        .route("/update_time", post(handlers::session::update_time))
        .route("/buy_package", post(handlers::session::buy_package))
        .route("/heartbeat", post(handlers::session::heartbeat))
        .route("/packages", get(handlers::session::packages))
}

/// Registration and login
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
}

/// Administrator endpoints (HTTP Basic)
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/add_balance", post(handlers::admin::add_balance))
        .route("/get_computers_status", get(handlers::admin::computers))
        .route("/admin/grant_time", post(handlers::admin::grant_time))
        .route("/admin/accounts", get(handlers::admin::list_accounts))
        .route(
            "/admin/accounts/{username}",
            delete(handlers::admin::delete_account),
        )
        .route("/admin/transactions", get(handlers::admin::list_transactions))
}

/// Payment provider callbacks
fn payment_routes() -> Router<AppState> {
    Router::new().route(
        "/payments/kaspi/webhook",
        post(handlers::payment::kaspi_webhook),
    )
}
