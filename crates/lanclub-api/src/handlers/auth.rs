//! Customer registration and login handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use lanclub_entity::account::AccountStatus;

use crate::dto::request::CredentialsRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CredentialsRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<AccountStatus>>)> {
    let status = state
        .account_service
        .register(&req.username, &req.password)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(status))))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CredentialsRequest>,
) -> ApiResult<Json<ApiResponse<AccountStatus>>> {
    let status = state
        .account_service
        .login(&req.username, &req.password)
        .await?;
    Ok(Json(ApiResponse::ok(status)))
}
