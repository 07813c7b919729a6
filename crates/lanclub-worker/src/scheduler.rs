//! Cron scheduler for periodic maintenance tasks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use lanclub_core::config::WorkerConfig;
use lanclub_core::error::AppError;
use lanclub_service::{RegistryService, TelemetryService};

use crate::executor::{JobHandler, run_once};
use crate::jobs::{LaunchLogRetentionJobHandler, LivenessJobHandler};

/// Cron-based scheduler for periodic background tasks
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Schedules and retention settings
    config: WorkerConfig,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler")
            .field("config", &self.config)
            .finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new(config: WorkerConfig) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self { scheduler, config })
    }

    /// Register all default scheduled tasks
    pub async fn register_default_tasks(
        &self,
        registry: Arc<RegistryService>,
        telemetry: Arc<TelemetryService>,
    ) -> Result<(), AppError> {
        self.register_liveness_sweep(registry).await?;
        self.register_launch_log_retention(telemetry).await?;

        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&self) -> Result<(), AppError> {
        let mut scheduler = self.scheduler.clone();
        scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }

    /// Registry liveness sweep (default every 30 seconds)
    pub async fn register_liveness_sweep(
        &self,
        registry: Arc<RegistryService>,
    ) -> Result<(), AppError> {
        let schedule = self.config.liveness_sweep_schedule.clone();
        self.register(&schedule, Arc::new(LivenessJobHandler::new(registry)))
            .await
    }

    /// Launch log retention (default daily at 4 AM)
    pub async fn register_launch_log_retention(
        &self,
        telemetry: Arc<TelemetryService>,
    ) -> Result<(), AppError> {
        let schedule = self.config.launch_log_retention_schedule.clone();
        let handler =
            LaunchLogRetentionJobHandler::new(telemetry, self.config.launch_log_retention_days);
        self.register(&schedule, Arc::new(handler)).await
    }

    /// Run `handler` on a six-field cron `schedule`.
    pub async fn register(
        &self,
        schedule: &str,
        handler: Arc<dyn JobHandler>,
    ) -> Result<(), AppError> {
        let job_type = handler.job_type().to_string();
        let job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                run_once(handler).await;
            })
        })
        .map_err(|e| {
            AppError::internal(format!("Failed to create {job_type} schedule: {e}"))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add {job_type} schedule: {e}"))
        })?;

        tracing::info!("Registered: {} ({})", job_type, schedule);
        Ok(())
    }
}
