//! Application launch telemetry handler.

use axum::Json;
use axum::extract::State;

use lanclub_entity::launch::NewLaunchLog;

use crate::dto::request::LaunchLogRequest;
use crate::dto::response::{ApiResponse, LaunchLoggedResponse};
use crate::error::ApiResult;
use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// POST /log_launch
pub async fn log_launch(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LaunchLogRequest>,
) -> ApiResult<Json<ApiResponse<LaunchLoggedResponse>>> {
    let id = state
        .telemetry_service
        .record_launch(NewLaunchLog {
            computer_name: req.computer_name,
            ip_address: req.ip_address,
            username: req.user,
            app_name: req.app_name,
        })
        .await?;
    Ok(Json(ApiResponse::ok(LaunchLoggedResponse { id })))
}
