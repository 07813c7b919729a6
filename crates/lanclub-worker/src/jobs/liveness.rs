//! Registry liveness sweep: persists `disconnected` for silent machines.

use std::sync::Arc;

use async_trait::async_trait;

use lanclub_service::RegistryService;

use crate::executor::{JobExecutionError, JobHandler};

/// Marks machines whose heartbeat is older than the liveness window
#[derive(Debug)]
pub struct LivenessJobHandler {
    registry: Arc<RegistryService>,
}

impl LivenessJobHandler {
    /// Create a new liveness job handler
    pub fn new(registry: Arc<RegistryService>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl JobHandler for LivenessJobHandler {
    fn job_type(&self) -> &str {
        "registry_liveness"
    }

    async fn execute(&self) -> Result<u64, JobExecutionError> {
        self.registry
            .sweep_stale()
            .await
            .map_err(|e| JobExecutionError::Transient(format!("Liveness sweep failed: {e}")))
    }
}
