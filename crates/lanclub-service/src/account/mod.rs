//! Customer self-service and administrator account operations.

pub mod admin;
pub mod service;

pub use admin::AdminService;
pub use service::AccountService;

use lanclub_core::error::AppError;

/// Longest accepted username.
pub const MAX_USERNAME_LEN: usize = 64;

/// Trim and check a username supplied by a client.
pub(crate) fn normalize_username(username: &str) -> Result<&str, AppError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::validation("Username must not be empty"));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(AppError::validation(format!(
            "Username must be at most {MAX_USERNAME_LEN} characters"
        )));
    }
    Ok(username)
}
