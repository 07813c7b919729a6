//! Administrator handlers. Every route here requires [`AdminUser`].

use axum::Json;
use axum::extract::{Path, Query, State};

use lanclub_core::types::pagination::PageResponse;
use lanclub_entity::account::Account;
use lanclub_entity::transaction::Transaction;

use crate::dto::request::{AddBalanceRequest, GrantTimeRequest};
use crate::dto::response::{
    ApiResponse, BalanceResponse, ComputersResponse, GrantTimeResponse, MessageResponse,
};
use crate::error::ApiResult;
use crate::extractors::{AdminUser, PaginationParams, ValidatedJson};
use crate::state::AppState;

/// POST /api/add_balance
pub async fn add_balance(
    State(state): State<AppState>,
    admin: AdminUser,
    ValidatedJson(req): ValidatedJson<AddBalanceRequest>,
) -> ApiResult<Json<ApiResponse<BalanceResponse>>> {
    let outcome = state
        .admin_service
        .top_up(&req.username, req.amount, &admin.username)
        .await?;
    Ok(Json(ApiResponse::ok(BalanceResponse {
        new_balance: outcome.new_balance,
        version: outcome.version,
    })))
}

/// POST /api/admin/grant_time
pub async fn grant_time(
    State(state): State<AppState>,
    admin: AdminUser,
    ValidatedJson(req): ValidatedJson<GrantTimeRequest>,
) -> ApiResult<Json<ApiResponse<GrantTimeResponse>>> {
    let status = state
        .admin_service
        .grant_time(&req.username, req.seconds, &admin.username)
        .await?;
    Ok(Json(ApiResponse::ok(GrantTimeResponse {
        username: status.username,
        new_time: status.time_left,
        balance: status.balance,
        version: status.version,
    })))
}

/// GET /api/get_computers_status
pub async fn computers(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<ApiResponse<ComputersResponse>>> {
    let computers = state.registry_service.list_computers().await?;
    Ok(Json(ApiResponse::ok(ComputersResponse { computers })))
}

/// GET /api/admin/accounts
pub async fn list_accounts(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<Account>>>> {
    let page = state
        .admin_service
        .list_accounts(params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// DELETE /api/admin/accounts/{username}
pub async fn delete_account(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(username): Path<String>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state
        .admin_service
        .delete_account(&username, &admin.username)
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse {
        message: format!("Account '{username}' deleted"),
    })))
}

/// GET /api/admin/transactions
pub async fn list_transactions(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<Transaction>>>> {
    let page = state
        .admin_service
        .list_transactions(params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}
