//! `AdminUser` extractor: HTTP Basic credentials checked against the
//! configured primary administrator.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use lanclub_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// An authenticated administrator.
#[derive(Debug, Clone)]
pub struct AdminUser {
    /// Administrator name, recorded on ledger entries.
    pub username: String,
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;

        let (username, password) = parse_basic(header)?;
        state.admin_service.verify_credentials(&username, &password)?;

        Ok(AdminUser { username })
    }
}

/// Decode `Basic base64(user:password)`.
pub fn parse_basic(header: &str) -> Result<(String, String), AppError> {
    let encoded = header
        .strip_prefix("Basic ")
        .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))?;
    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| AppError::authentication("Invalid Basic credentials encoding"))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| AppError::authentication("Invalid Basic credentials encoding"))?;
    let (username, password) = decoded
        .split_once(':')
        .ok_or_else(|| AppError::authentication("Invalid Basic credentials"))?;
    Ok((username.to_string(), password.to_string()))
}
