//! Job handler contract and the single-run wrapper used by the scheduler.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use lanclub_core::error::AppError;

/// Trait for job handler implementations
#[async_trait]
pub trait JobHandler: Send + Sync + std::fmt::Debug {
    /// Stable job name used in logs
    fn job_type(&self) -> &str;

    /// Run the job once, returning the number of rows it touched
    async fn execute(&self) -> Result<u64, JobExecutionError>;
}

/// Error from job execution
#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    /// Failure that the next scheduled run may not hit
    #[error("Transient job failure: {0}")]
    Transient(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

/// Run a handler once and log the outcome. Failures never propagate.
pub async fn run_once(handler: Arc<dyn JobHandler>) -> Option<u64> {
    let started = Instant::now();
    match handler.execute().await {
        Ok(affected) => {
            tracing::debug!(
                job = handler.job_type(),
                affected,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Job finished"
            );
            Some(affected)
        }
        Err(e) => {
            tracing::error!(job = handler.job_type(), error = %e, "Job failed");
            None
        }
    }
}
