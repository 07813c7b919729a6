//! Computer registry repository implementation.

use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};

use lanclub_core::error::{AppError, ErrorKind};
use lanclub_core::result::AppResult;
use lanclub_entity::computer::{Computer, ComputerStatus, HeartbeatUpdate, SessionWindow};

/// Repository for the per-machine registry.
#[derive(Debug, Clone)]
pub struct ComputerRepository {
    pool: SqlitePool,
}

impl ComputerRepository {
    /// Create a new computer repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Upsert the row for a heartbeat and return it.
    pub async fn record_heartbeat(
        &self,
        update: &HeartbeatUpdate,
        now: DateTime<Utc>,
    ) -> AppResult<Computer> {
        sqlx::query_as::<_, Computer>(
            "INSERT INTO computers \
             (pc_name, status, current_username, time_remaining, last_heartbeat, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT (pc_name) DO UPDATE SET \
                status = excluded.status, \
                current_username = excluded.current_username, \
                time_remaining = excluded.time_remaining, \
                last_heartbeat = excluded.last_heartbeat, \
                updated_at = excluded.updated_at \
             RETURNING *",
        )
        .bind(&update.pc_name)
        .bind(update.status)
        .bind(&update.current_user)
        .bind(update.time_remaining)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record heartbeat", e))
    }

    /// Upsert the session window opened by a purchase, on any executor.
    pub async fn upsert_session<'e, E>(executor: E, window: &SessionWindow) -> AppResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            "INSERT INTO computers \
             (pc_name, status, current_username, time_remaining, session_name, \
              session_start_time, session_end_time, last_heartbeat, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT (pc_name) DO UPDATE SET \
                status = excluded.status, \
                current_username = excluded.current_username, \
                time_remaining = excluded.time_remaining, \
                session_name = excluded.session_name, \
                session_start_time = excluded.session_start_time, \
                session_end_time = excluded.session_end_time, \
                last_heartbeat = excluded.last_heartbeat, \
                updated_at = excluded.updated_at",
        )
        .bind(&window.pc_name)
        .bind(ComputerStatus::InUse)
        .bind(&window.username)
        .bind(window.time_remaining)
        .bind(&window.session_name)
        .bind(window.start)
        .bind(window.end)
        .bind(window.start)
        .bind(window.start)
        .execute(executor)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to upsert session window", e)
        })?;
        Ok(())
    }

    /// Find a machine by name.
    pub async fn find_by_name(&self, pc_name: &str) -> AppResult<Option<Computer>> {
        sqlx::query_as::<_, Computer>("SELECT * FROM computers WHERE pc_name = ?")
            .bind(pc_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find computer", e))
    }

    /// List every known machine ordered by name.
    pub async fn find_all(&self) -> AppResult<Vec<Computer>> {
        sqlx::query_as::<_, Computer>("SELECT * FROM computers ORDER BY pc_name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list computers", e))
    }

    /// Mark machines whose last heartbeat is older than `cutoff` as disconnected.
    ///
    /// Returns the number of rows changed.
    pub async fn mark_stale(&self, cutoff: DateTime<Utc>, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE computers \
             SET status = ?, current_username = NULL, updated_at = ? \
             WHERE status IN (?, ?) AND last_heartbeat < ?",
        )
        .bind(ComputerStatus::Disconnected)
        .bind(now)
        .bind(ComputerStatus::Active)
        .bind(ComputerStatus::InUse)
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to mark stale computers", e)
        })?;

        Ok(result.rows_affected())
    }
}
