//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let database = match sqlx::query("SELECT 1").execute(&state.db_pool).await {
        Ok(_) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            "unavailable"
        }
    };

    Json(ApiResponse::ok(HealthResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
    }))
}
