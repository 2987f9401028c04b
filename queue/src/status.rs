use std::sync::Arc;

use crate::backend::QueueBackend;
use crate::envelope::JobStatus;
use crate::error::QueueError;

/// Read-side view of per-token job status.
///
/// Every call is a fresh read against the shared store; producers and workers
/// run in separate processes, so nothing here is cached.
#[derive(Clone)]
pub struct StatusTracker {
    backend: Arc<dyn QueueBackend>,
}

impl StatusTracker {
    pub fn new(backend: Arc<dyn QueueBackend>) -> Self {
        Self { backend }
    }

    pub async fn status(&self, token: &str) -> Result<Option<JobStatus>, QueueError> {
        self.backend.get_status(token).await
    }

    pub async fn is_waiting(&self, token: &str) -> Result<bool, QueueError> {
        Ok(self.status(token).await? == Some(JobStatus::Waiting))
    }

    pub async fn is_running(&self, token: &str) -> Result<bool, QueueError> {
        Ok(self.status(token).await? == Some(JobStatus::Running))
    }

    pub async fn is_complete(&self, token: &str) -> Result<bool, QueueError> {
        Ok(self.status(token).await? == Some(JobStatus::Complete))
    }

    pub async fn is_failed(&self, token: &str) -> Result<bool, QueueError> {
        Ok(self.status(token).await? == Some(JobStatus::Failed))
    }
}
