//! Customer-facing account operations: registration, login, status and
//! the client's time write-back.

use std::sync::Arc;

use tracing::{debug, info};

use lanclub_core::error::AppError;
use lanclub_database::repositories::AccountRepository;
use lanclub_entity::account::{AccountStatus, CreateAccount};

use super::normalize_username;
use crate::password::PasswordHasher;

/// Shortest accepted password.
pub const MIN_PASSWORD_LEN: usize = 3;

/// Handles operations a customer performs on their own account.
#[derive(Debug, Clone)]
pub struct AccountService {
    /// Account repository.
    account_repo: Arc<AccountRepository>,
    /// Password hasher.
    hasher: Arc<PasswordHasher>,
}

impl AccountService {
    /// Creates a new account service.
    pub fn new(account_repo: Arc<AccountRepository>, hasher: Arc<PasswordHasher>) -> Self {
        Self {
            account_repo,
            hasher,
        }
    }

    /// Creates an account with a zero balance.
    pub async fn register(&self, username: &str, password: &str) -> Result<AccountStatus, AppError> {
        let username = normalize_username(username)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let password_hash = self.hasher.hash_password(password)?;
        let account = self
            .account_repo
            .create(&CreateAccount {
                username: username.to_string(),
                password_hash,
                balance: 0,
            })
            .await?;

        info!(username = %account.username, "Account registered");
        Ok(account.status())
    }

    /// Checks credentials and returns the account snapshot.
    ///
    /// Unknown users and wrong passwords produce the same error.
    pub async fn login(&self, username: &str, password: &str) -> Result<AccountStatus, AppError> {
        let username = normalize_username(username)?;
        let account = self
            .account_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::authentication("Invalid username or password"))?;

        if !self.hasher.verify_password(password, &account.password_hash)? {
            return Err(AppError::authentication("Invalid username or password"));
        }

        debug!(username, "Login succeeded");
        Ok(account.status())
    }

    /// Current balance, time-left and version of an account.
    pub async fn status(&self, username: &str) -> Result<AccountStatus, AppError> {
        let username = normalize_username(username)?;
        self.account_repo
            .find_status(username)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User '{username}' not found")))
    }

    /// Stores the time-left reported by a running client.
    ///
    /// Returns the new account version. A stale `version` is rejected with
    /// `Conflict` and nothing is written.
    pub async fn update_time(
        &self,
        username: &str,
        time_left: i64,
        version: Option<i64>,
    ) -> Result<i64, AppError> {
        let username = normalize_username(username)?;
        if time_left < 0 {
            return Err(AppError::validation("time_left must not be negative"));
        }
        self.account_repo
            .update_time(username, time_left, version)
            .await
    }
}
