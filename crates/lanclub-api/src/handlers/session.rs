//! Kiosk session handlers: status, time write-back, purchase, heartbeat
//! and the package catalog.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Query, State};

use lanclub_entity::account::{AccountStatus, NewPurchase, PurchaseOutcome};
use lanclub_entity::computer::{ComputerStatus, HeartbeatUpdate};

use crate::dto::request::{BuyPackageRequest, HeartbeatRequest, StatusQuery, UpdateTimeRequest};
use crate::dto::response::{
    ApiResponse, HeartbeatResponse, PackagesResponse, UpdateTimeResponse,
};
use crate::error::ApiResult;
use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// GET /api/get_user_status?username=
pub async fn get_user_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> ApiResult<Json<ApiResponse<AccountStatus>>> {
    let status = state.account_service.status(&query.username).await?;
    Ok(Json(ApiResponse::ok(status)))
}

/// POST /api/update_time
pub async fn update_time(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<UpdateTimeRequest>,
) -> ApiResult<Json<ApiResponse<UpdateTimeResponse>>> {
    let version = state
        .account_service
        .update_time(&req.username, req.time_left, req.version)
        .await?;
    Ok(Json(ApiResponse::ok(UpdateTimeResponse { version })))
}

/// POST /api/buy_package
pub async fn buy_package(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<BuyPackageRequest>,
) -> ApiResult<Json<ApiResponse<PurchaseOutcome>>> {
    let outcome = state
        .purchase_service
        .buy(NewPurchase {
            username: req.username,
            seconds: req.seconds,
            price: req.price,
            package_name: req.package_name,
            pc_name: req.pc_name,
        })
        .await?;
    Ok(Json(ApiResponse::ok(outcome)))
}

/// POST /api/heartbeat
pub async fn heartbeat(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<HeartbeatRequest>,
) -> ApiResult<Json<ApiResponse<HeartbeatResponse>>> {
    let status = match req.status.as_deref() {
        Some(raw) => ComputerStatus::from_str(raw)?,
        None => ComputerStatus::Active,
    };

    let computer = state
        .registry_service
        .heartbeat(HeartbeatUpdate {
            pc_name: req.pc_name,
            status,
            current_user: req.user,
            time_remaining: req.time_left,
        })
        .await?;

    Ok(Json(ApiResponse::ok(HeartbeatResponse {
        pc_name: computer.pc_name,
    })))
}

/// GET /api/packages
pub async fn packages(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<PackagesResponse>>> {
    let packages = state.purchase_service.catalog().await?;
    Ok(Json(ApiResponse::ok(PackagesResponse { packages })))
}
