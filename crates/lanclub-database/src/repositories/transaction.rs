//! Ledger repository implementation.

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};

use lanclub_core::error::{AppError, ErrorKind};
use lanclub_core::result::AppResult;
use lanclub_core::types::pagination::{PageRequest, PageResponse};
use lanclub_entity::transaction::{NewTransaction, Transaction};

/// Repository for the append-only transaction ledger.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Create a new transaction repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append an entry on any executor (pool or open transaction).
    ///
    /// Returns the new row id, or `None` when the entry carries an
    /// `order_id` that is already recorded.
    pub async fn append<'e, E>(executor: E, entry: &NewTransaction) -> AppResult<Option<i64>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "INSERT INTO transactions \
             (kind, username, amount, seconds, order_id, pc_name, description, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT (order_id) DO NOTHING",
        )
        .bind(entry.kind)
        .bind(&entry.username)
        .bind(entry.amount)
        .bind(entry.seconds)
        .bind(&entry.order_id)
        .bind(&entry.pc_name)
        .bind(&entry.description)
        .bind(Utc::now())
        .execute(executor)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append transaction", e))?;

        if result.rows_affected() == 0 {
            Ok(None)
        } else {
            Ok(Some(result.last_insert_rowid()))
        }
    }

    /// Append an entry outside any surrounding transaction.
    pub async fn insert(&self, entry: &NewTransaction) -> AppResult<Option<i64>> {
        Self::append(&self.pool, entry).await
    }

    /// List all entries, newest first.
    pub async fn find_all(&self, page: PageRequest) -> AppResult<PageResponse<Transaction>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count transactions", e)
            })?;

        let items = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions ORDER BY id DESC LIMIT ? OFFSET ?",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list transactions", e))?;

        Ok(PageResponse::new(items, page, total as u64))
    }

    /// Latest entries for one account, newest first.
    pub async fn find_by_username(&self, username: &str, limit: i64) -> AppResult<Vec<Transaction>> {
        sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE username = ? ORDER BY id DESC LIMIT ?",
        )
        .bind(username)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to list transactions by username",
                e,
            )
        })
    }

    /// Find the entry recorded for a payment provider order.
    pub async fn find_by_order_id(&self, order_id: &str) -> AppResult<Option<Transaction>> {
        sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE order_id = ?")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find transaction by order", e)
            })
    }
}
