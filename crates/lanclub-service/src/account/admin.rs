//! Administrator operations: credential check, top-ups, time grants,
//! account listing/deletion and the ledger view.

use std::sync::Arc;

use tracing::{info, warn};

use lanclub_core::config::AdminConfig;
use lanclub_core::error::AppError;
use lanclub_core::types::pagination::{PageRequest, PageResponse};
use lanclub_database::repositories::{AccountRepository, TransactionRepository};
use lanclub_entity::account::{Account, AccountStatus, MAX_TIME_DELTA_SECONDS};
use lanclub_entity::transaction::{CreditOutcome, NewTransaction, Transaction, TransactionKind};

use super::normalize_username;
use crate::password::PasswordHasher;

/// Handles administrative account management.
#[derive(Debug, Clone)]
pub struct AdminService {
    /// Account repository.
    account_repo: Arc<AccountRepository>,
    /// Ledger repository.
    transaction_repo: Arc<TransactionRepository>,
    /// Password hasher.
    hasher: Arc<PasswordHasher>,
    /// Primary administrator credentials.
    admin: AdminConfig,
}

impl AdminService {
    /// Creates a new admin service.
    pub fn new(
        account_repo: Arc<AccountRepository>,
        transaction_repo: Arc<TransactionRepository>,
        hasher: Arc<PasswordHasher>,
        admin: AdminConfig,
    ) -> Self {
        Self {
            account_repo,
            transaction_repo,
            hasher,
            admin,
        }
    }

    /// Checks HTTP Basic credentials against the configured administrator.
    pub fn verify_credentials(&self, username: &str, password: &str) -> Result<(), AppError> {
        if self.admin.password_hash.is_empty() {
            return Err(AppError::service_unavailable(
                "Administrator credentials are not configured",
            ));
        }
        let password_ok = self
            .hasher
            .verify_password(password, &self.admin.password_hash)?;
        if username != self.admin.username || !password_ok {
            warn!(username, "Rejected administrator credentials");
            return Err(AppError::authentication("Invalid administrator credentials"));
        }
        Ok(())
    }

    /// Adds money to an account.
    pub async fn top_up(
        &self,
        username: &str,
        amount: i64,
        performed_by: &str,
    ) -> Result<CreditOutcome, AppError> {
        let username = normalize_username(username)?;
        if amount <= 0 {
            return Err(AppError::validation("Amount must be positive"));
        }

        let entry = NewTransaction::credit(TransactionKind::AdminTopUp, username, amount)
            .with_description(format!("top-up by {performed_by}"));
        let outcome = self.account_repo.credit(&entry).await?;

        info!(
            username,
            amount,
            new_balance = outcome.new_balance,
            admin = performed_by,
            "Balance topped up"
        );
        Ok(outcome)
    }

    /// Adds time to an account.
    pub async fn grant_time(
        &self,
        username: &str,
        seconds: i64,
        performed_by: &str,
    ) -> Result<AccountStatus, AppError> {
        let username = normalize_username(username)?;
        if seconds <= 0 {
            return Err(AppError::validation("Seconds must be positive"));
        }
        if seconds > MAX_TIME_DELTA_SECONDS {
            return Err(AppError::validation(format!(
                "Seconds must not exceed {MAX_TIME_DELTA_SECONDS}"
            )));
        }

        let status = self
            .account_repo
            .grant_time(username, seconds, performed_by)
            .await?;

        info!(
            username,
            seconds,
            new_time = status.time_left,
            admin = performed_by,
            "Time granted"
        );
        Ok(status)
    }

    /// Lists accounts, newest first.
    pub async fn list_accounts(&self, page: PageRequest) -> Result<PageResponse<Account>, AppError> {
        self.account_repo.find_all(page).await
    }

    /// Deletes an account. The primary administrator's account is protected.
    pub async fn delete_account(&self, username: &str, performed_by: &str) -> Result<(), AppError> {
        let username = normalize_username(username)?;
        if username == self.admin.username {
            return Err(AppError::authorization(
                "The primary administrator account cannot be deleted",
            ));
        }
        if !self.account_repo.delete(username).await? {
            return Err(AppError::not_found(format!("User '{username}' not found")));
        }
        info!(username, admin = performed_by, "Account deleted");
        Ok(())
    }

    /// Lists ledger entries, newest first.
    pub async fn list_transactions(
        &self,
        page: PageRequest,
    ) -> Result<PageResponse<Transaction>, AppError> {
        self.transaction_repo.find_all(page).await
    }
}
