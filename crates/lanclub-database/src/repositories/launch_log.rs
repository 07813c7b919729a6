//! Launch telemetry repository implementation.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use lanclub_core::error::{AppError, ErrorKind};
use lanclub_core::result::AppResult;
use lanclub_entity::launch::{LaunchLog, NewLaunchLog};

/// Repository for application launch reports.
#[derive(Debug, Clone)]
pub struct LaunchLogRepository {
    pool: SqlitePool,
}

impl LaunchLogRepository {
    /// Create a new launch log repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store one launch report.
    pub async fn insert(&self, entry: &NewLaunchLog, now: DateTime<Utc>) -> AppResult<i64> {
        let result = sqlx::query(
            "INSERT INTO launch_logs (computer_name, ip_address, username, app_name, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&entry.computer_name)
        .bind(&entry.ip_address)
        .bind(&entry.username)
        .bind(&entry.app_name)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to store launch log", e))?;

        Ok(result.last_insert_rowid())
    }

    /// Most recent reports, newest first.
    pub async fn find_recent(&self, limit: i64) -> AppResult<Vec<LaunchLog>> {
        sqlx::query_as::<_, LaunchLog>("SELECT * FROM launch_logs ORDER BY id DESC LIMIT ?")
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list launch logs", e))
    }

    /// Delete reports older than `cutoff`, returning how many were removed.
    pub async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM launch_logs WHERE created_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to purge launch logs", e)
            })?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn launch(app: &str) -> NewLaunchLog {
        NewLaunchLog {
            computer_name: "PC-03".to_string(),
            ip_address: "192.168.0.13".to_string(),
            username: Some("alice".to_string()),
            app_name: app.to_string(),
        }
    }

    #[tokio::test]
    async fn test_purge_removes_only_old_rows() {
        let repo = LaunchLogRepository::new(crate::test_support::pool().await);
        let now = Utc::now();
        repo.insert(&launch("Dota 2"), now - Duration::days(40))
            .await
            .expect("old");
        repo.insert(&launch("CS2"), now).await.expect("new");

        let removed = repo
            .delete_older_than(now - Duration::days(30))
            .await
            .expect("purge");
        assert_eq!(removed, 1);

        let left = repo.find_recent(10).await.expect("list");
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].app_name, "CS2");
    }
}
