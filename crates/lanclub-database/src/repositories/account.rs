//! Account repository implementation.
//!
//! Every balance/time mutation is a single conditional `UPDATE` on the
//! account row, so concurrent writers (kiosks, admin, webhooks) can never
//! interleave between the balance check and the write.

use chrono::{DateTime, TimeDelta, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use lanclub_core::error::{AppError, ErrorKind};
use lanclub_core::result::AppResult;
use lanclub_core::types::pagination::{PageRequest, PageResponse};
use lanclub_entity::account::{Account, AccountStatus, CreateAccount, NewPurchase, PurchaseOutcome};
use lanclub_entity::computer::SessionWindow;
use lanclub_entity::transaction::{CreditOutcome, NewTransaction, TransactionKind};

use super::computer::ComputerRepository;
use super::is_unique_violation;
use super::transaction::TransactionRepository;

/// Repository for account CRUD and the atomic balance/time mutations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    /// Create a new account repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find an account by username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find account by username", e)
            })
    }

    /// Read the balance/time snapshot of an account.
    pub async fn find_status(&self, username: &str) -> AppResult<Option<AccountStatus>> {
        sqlx::query_as::<_, AccountStatus>(
            "SELECT username, balance, time_left, version FROM accounts WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read account status", e))
    }

    /// Insert a new account.
    pub async fn create(&self, data: &CreateAccount) -> AppResult<Account> {
        let now = Utc::now();
        sqlx::query_as::<_, Account>(
            "INSERT INTO accounts (username, password_hash, balance, time_left, version, created_at, updated_at) \
             VALUES (?, ?, ?, 0, 0, ?, ?) RETURNING *",
        )
        .bind(&data.username)
        .bind(&data.password_hash)
        .bind(data.balance)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict(format!("Username '{}' is already taken", data.username))
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create account", e)
            }
        })
    }

    /// List accounts with pagination, newest first.
    pub async fn find_all(&self, page: PageRequest) -> AppResult<PageResponse<Account>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count accounts", e))?;

        let accounts = sqlx::query_as::<_, Account>(
            "SELECT * FROM accounts ORDER BY id DESC LIMIT ? OFFSET ?",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list accounts", e))?;

        Ok(PageResponse::new(accounts, page, total as u64))
    }

    /// Delete an account. Returns whether a row was removed.
    pub async fn delete(&self, username: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM accounts WHERE username = ?")
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete account", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Overwrite the time-left reported by a client.
    ///
    /// With `expected_version` the write only happens when the row is still
    /// at that version; otherwise it fails with `Conflict` and nothing is
    /// written. Without it the write is last-write-wins. Returns the new
    /// version.
    pub async fn update_time(
        &self,
        username: &str,
        time_left: i64,
        expected_version: Option<i64>,
    ) -> AppResult<i64> {
        let version: Option<i64> = sqlx::query_scalar(
            "UPDATE accounts SET time_left = ?, version = version + 1, updated_at = ? \
             WHERE username = ? AND (? IS NULL OR version = ?) \
             RETURNING version",
        )
        .bind(time_left)
        .bind(Utc::now())
        .bind(username)
        .bind(expected_version)
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update time", e))?;

        match version {
            Some(v) => Ok(v),
            None => match self.find_status(username).await? {
                Some(current) => Err(AppError::conflict(format!(
                    "Stale version {} for '{username}', current is {}",
                    expected_version.unwrap_or_default(),
                    current.version
                ))),
                None => Err(AppError::not_found(format!("User '{username}' not found"))),
            },
        }
    }

    /// Exchange balance for time in one transaction.
    ///
    /// Deducts the price only if the balance covers it, appends the
    /// `package_purchase` ledger entry and opens the session window on the
    /// originating machine. On any failure nothing is written.
    pub async fn purchase(
        &self,
        purchase: &NewPurchase,
        now: DateTime<Utc>,
    ) -> AppResult<PurchaseOutcome> {
        let end = TimeDelta::try_seconds(purchase.seconds)
            .and_then(|length| now.checked_add_signed(length))
            .ok_or_else(|| {
                AppError::validation(format!(
                    "Package length of {} seconds is out of range",
                    purchase.seconds
                ))
            })?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin purchase", e)
        })?;

        let outcome = sqlx::query_as::<_, PurchaseOutcome>(
            "UPDATE accounts \
             SET balance = balance - ?, time_left = time_left + ?, version = version + 1, updated_at = ? \
             WHERE username = ? AND balance >= ? \
             RETURNING balance AS new_balance, time_left AS new_time, version",
        )
        .bind(purchase.price)
        .bind(purchase.seconds)
        .bind(now)
        .bind(&purchase.username)
        .bind(purchase.price)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to charge account", e))?;

        let Some(outcome) = outcome else {
            let balance: Option<i64> =
                sqlx::query_scalar("SELECT balance FROM accounts WHERE username = ?")
                    .bind(&purchase.username)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(|e| {
                        AppError::with_source(ErrorKind::Database, "Failed to read balance", e)
                    })?;
            tx.rollback().await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to roll back purchase", e)
            })?;

            return Err(match balance {
                Some(balance) => AppError::insufficient_funds(format!(
                    "Insufficient funds: balance {balance}, price {}",
                    purchase.price
                )),
                None => AppError::not_found(format!("User '{}' not found", purchase.username)),
            });
        };

        let entry = NewTransaction {
            kind: TransactionKind::PackagePurchase,
            username: purchase.username.clone(),
            amount: purchase.price,
            seconds: purchase.seconds,
            order_id: None,
            pc_name: Some(purchase.pc_name.clone()),
            description: Some(purchase.package_name.clone()),
        };
        TransactionRepository::append(&mut *tx, &entry).await?;

        let window = SessionWindow {
            pc_name: purchase.pc_name.clone(),
            username: purchase.username.clone(),
            session_name: purchase.package_name.clone(),
            start: now,
            end,
            time_remaining: outcome.new_time,
        };
        ComputerRepository::upsert_session(&mut *tx, &window).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit purchase", e)
        })?;

        debug!(
            username = %purchase.username,
            price = purchase.price,
            seconds = purchase.seconds,
            new_balance = outcome.new_balance,
            "Purchase committed"
        );
        Ok(outcome)
    }

    /// Credit money to an account and record the ledger entry.
    ///
    /// When the entry carries an `order_id` that is already on the ledger,
    /// nothing changes and the current balance is returned with
    /// `duplicate = true`.
    pub async fn credit(&self, entry: &NewTransaction) -> AppResult<CreditOutcome> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin credit", e)
        })?;

        let inserted = TransactionRepository::append(&mut *tx, entry).await?;
        if inserted.is_none() {
            tx.rollback().await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to roll back credit", e)
            })?;
            let current = self.find_status(&entry.username).await?.ok_or_else(|| {
                AppError::not_found(format!("User '{}' not found", entry.username))
            })?;
            return Ok(CreditOutcome {
                new_balance: current.balance,
                version: current.version,
                duplicate: true,
            });
        }

        let updated: Option<(i64, i64)> = sqlx::query_as(
            "UPDATE accounts SET balance = balance + ?, version = version + 1, updated_at = ? \
             WHERE username = ? RETURNING balance, version",
        )
        .bind(entry.amount)
        .bind(Utc::now())
        .bind(&entry.username)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to credit account", e))?;

        let Some((new_balance, version)) = updated else {
            tx.rollback().await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to roll back credit", e)
            })?;
            return Err(AppError::not_found(format!(
                "User '{}' not found",
                entry.username
            )));
        };

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit credit", e)
        })?;

        Ok(CreditOutcome {
            new_balance,
            version,
            duplicate: false,
        })
    }

    /// Add time to an account and record an `admin_grant` ledger entry.
    pub async fn grant_time(
        &self,
        username: &str,
        seconds: i64,
        granted_by: &str,
    ) -> AppResult<AccountStatus> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin grant", e)
        })?;

        let status = sqlx::query_as::<_, AccountStatus>(
            "UPDATE accounts SET time_left = time_left + ?, version = version + 1, updated_at = ? \
             WHERE username = ? RETURNING username, balance, time_left, version",
        )
        .bind(seconds)
        .bind(Utc::now())
        .bind(username)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to grant time", e))?
        .ok_or_else(|| AppError::not_found(format!("User '{username}' not found")))?;

        let entry = NewTransaction {
            kind: TransactionKind::AdminGrant,
            username: username.to_string(),
            amount: 0,
            seconds,
            order_id: None,
            pc_name: None,
            description: Some(format!("granted by {granted_by}")),
        };
        TransactionRepository::append(&mut *tx, &entry).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit grant", e)
        })?;

        Ok(status)
    }
}
