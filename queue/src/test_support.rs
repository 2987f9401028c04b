use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::backend::{QueueBackend, Schedule};
use crate::envelope::{Envelope, JobStatus};
use crate::error::QueueError;
use resq_config::ResqSettings;

pub fn test_settings() -> ResqSettings {
    ResqSettings::default()
}

/// One recorded delayed enqueue, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayedEntry {
    pub queue_name: String,
    /// `Some` for `Schedule::In`, `None` for point-in-time schedules.
    pub delay_seconds: Option<i64>,
    pub raw_body: String,
}

#[derive(Default)]
struct MemoryState {
    queues: HashMap<String, Vec<String>>,
    statuses: HashMap<String, JobStatus>,
    delayed: Vec<DelayedEntry>,
}

/// In-process stand-in for the shared store.
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    delayed_enabled: bool,
}

impl MemoryBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(MemoryState::default()),
            delayed_enabled: true,
        })
    }

    pub fn without_delayed_lane() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(MemoryState::default()),
            delayed_enabled: false,
        })
    }

    pub async fn queue_len(&self, queue: &str) -> usize {
        let state = self.state.lock().await;
        state.queues.get(queue).map_or(0, Vec::len)
    }

    pub async fn delayed_entries(&self) -> Vec<DelayedEntry> {
        self.state.lock().await.delayed.clone()
    }

    pub async fn status_of(&self, token: &str) -> Option<JobStatus> {
        self.state.lock().await.statuses.get(token).copied()
    }

    pub async fn status_count(&self) -> usize {
        self.state.lock().await.statuses.len()
    }

    /// Simulate an externally driven status transition.
    pub async fn force_status(&self, token: &str, status: JobStatus) {
        self.state
            .lock()
            .await
            .statuses
            .insert(token.to_string(), status);
    }
}

#[async_trait]
impl QueueBackend for MemoryBackend {
    async fn enqueue_now(&self, queue: &str, envelope: &Envelope) -> Result<(), QueueError> {
        let raw = envelope.raw_body()?;
        let mut state = self.state.lock().await;
        state.queues.entry(queue.to_string()).or_default().push(raw);
        Ok(())
    }

    async fn enqueue_after(
        &self,
        queue: &str,
        when: Schedule,
        raw_body: &str,
    ) -> Result<(), QueueError> {
        let mut state = self.state.lock().await;
        state.delayed.push(DelayedEntry {
            queue_name: queue.to_string(),
            delay_seconds: match when {
                Schedule::In(seconds) => Some(seconds),
                Schedule::At(_) => None,
            },
            raw_body: raw_body.to_string(),
        });
        Ok(())
    }

    async fn dequeue(&self, queue: &str) -> Result<Option<Envelope>, QueueError> {
        let mut state = self.state.lock().await;
        let raw = match state.queues.get_mut(queue) {
            Some(entries) if !entries.is_empty() => entries.remove(0),
            _ => return Ok(None),
        };
        let mut envelope = Envelope::from_raw_body(&raw)?;
        envelope.queue_name = Some(queue.to_string());
        Ok(Some(envelope))
    }

    async fn get_status(&self, token: &str) -> Result<Option<JobStatus>, QueueError> {
        Ok(self.state.lock().await.statuses.get(token).copied())
    }

    async fn set_status(&self, token: &str, status: JobStatus) -> Result<(), QueueError> {
        self.state
            .lock()
            .await
            .statuses
            .insert(token.to_string(), status);
        Ok(())
    }

    fn supports_delayed(&self) -> bool {
        self.delayed_enabled
    }
}
