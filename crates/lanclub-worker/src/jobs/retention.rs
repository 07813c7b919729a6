//! Launch log retention.

use std::sync::Arc;

use async_trait::async_trait;

use lanclub_service::TelemetryService;

use crate::executor::{JobExecutionError, JobHandler};

/// Deletes launch reports older than the retention window
#[derive(Debug)]
pub struct LaunchLogRetentionJobHandler {
    telemetry: Arc<TelemetryService>,
    retention_days: i64,
}

impl LaunchLogRetentionJobHandler {
    /// Create a new retention job handler
    pub fn new(telemetry: Arc<TelemetryService>, retention_days: i64) -> Self {
        Self {
            telemetry,
            retention_days,
        }
    }
}

#[async_trait]
impl JobHandler for LaunchLogRetentionJobHandler {
    fn job_type(&self) -> &str {
        "launch_log_retention"
    }

    async fn execute(&self) -> Result<u64, JobExecutionError> {
        Ok(self.telemetry.purge_older_than(self.retention_days).await?)
    }
}
