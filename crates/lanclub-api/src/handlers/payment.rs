//! Kaspi payment webhook handler.
//!
//! Takes the raw body so the signature is checked over the exact bytes
//! the provider sent.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;

use lanclub_entity::transaction::CreditOutcome;

use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/payments/kaspi/webhook
pub async fn kaspi_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<ApiResponse<CreditOutcome>>> {
    let signature = headers
        .get(state.payment_service.signature_header())
        .and_then(|v| v.to_str().ok());

    let outcome = state
        .payment_service
        .handle_webhook(&body, signature)
        .await?;
    Ok(Json(ApiResponse::ok(outcome)))
}
