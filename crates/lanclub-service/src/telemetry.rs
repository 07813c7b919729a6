//! Application launch telemetry.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;

use lanclub_core::error::AppError;
use lanclub_database::repositories::LaunchLogRepository;
use lanclub_entity::launch::{LaunchLog, NewLaunchLog};

/// Stores and prunes launch reports sent by kiosks.
#[derive(Debug, Clone)]
pub struct TelemetryService {
    launch_repo: Arc<LaunchLogRepository>,
}

impl TelemetryService {
    /// Creates a new telemetry service.
    pub fn new(launch_repo: Arc<LaunchLogRepository>) -> Self {
        Self { launch_repo }
    }

    /// Stores one launch report.
    pub async fn record_launch(&self, mut entry: NewLaunchLog) -> Result<i64, AppError> {
        entry.computer_name = entry.computer_name.trim().to_string();
        entry.app_name = entry.app_name.trim().to_string();
        if entry.computer_name.is_empty() || entry.app_name.is_empty() {
            return Err(AppError::validation(
                "computer_name and app_name must not be empty",
            ));
        }
        entry.username = entry.username.filter(|u| !u.trim().is_empty());
        self.launch_repo.insert(&entry, Utc::now()).await
    }

    /// Most recent launches, newest first.
    pub async fn recent(&self, limit: i64) -> Result<Vec<LaunchLog>, AppError> {
        self.launch_repo.find_recent(limit.clamp(1, 500)).await
    }

    /// Deletes launches older than `days` days.
    pub async fn purge_older_than(&self, days: i64) -> Result<u64, AppError> {
        if days <= 0 {
            return Err(AppError::validation("Retention must be at least one day"));
        }
        let removed = self
            .launch_repo
            .delete_older_than(Utc::now() - Duration::days(days))
            .await?;
        info!(removed, days, "Launch log retention applied");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_and_purge() {
        let pool = crate::test_support::pool().await;
        let svc = TelemetryService::new(Arc::new(LaunchLogRepository::new(pool.clone())));

        svc.record_launch(NewLaunchLog {
            computer_name: "PC-03".to_string(),
            ip_address: "192.168.100.23".to_string(),
            username: Some(String::new()),
            app_name: "CS2".to_string(),
        })
        .await
        .expect("record");

        let recent = svc.recent(10).await.expect("recent");
        assert_eq!(recent.len(), 1);
        assert!(recent[0].username.is_none());

        sqlx::query("UPDATE launch_logs SET created_at = ?")
            .bind(Utc::now() - Duration::days(40))
            .execute(&pool)
            .await
            .expect("age row");
        assert_eq!(svc.purge_older_than(30).await.expect("purge"), 1);
        assert!(svc.recent(10).await.expect("recent").is_empty());
    }

    #[tokio::test]
    async fn test_blank_app_name_is_rejected() {
        let pool = crate::test_support::pool().await;
        let svc = TelemetryService::new(Arc::new(LaunchLogRepository::new(pool)));
        let err = svc
            .record_launch(NewLaunchLog {
                computer_name: "PC-03".to_string(),
                ip_address: String::new(),
                username: None,
                app_name: " ".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, lanclub_core::error::ErrorKind::Validation);
    }
}
