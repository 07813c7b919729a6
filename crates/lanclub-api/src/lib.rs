//! # lanclub-api
//!
//! HTTP API layer for the LanClub backend built on Axum.
//!
//! Provides the kiosk endpoints (status, time write-back, purchase,
//! heartbeat, launch telemetry), customer registration/login, the admin
//! surface guarded by HTTP Basic credentials, the signed payment webhook,
//! middleware (CORS, logging), extractors, DTOs and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state, run_server};
pub use state::AppState;
