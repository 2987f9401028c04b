use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};

use crate::backend::{QueueBackend, Schedule};
use crate::envelope::{Envelope, JobStatus};
use crate::error::QueueError;
use crate::status::StatusTracker;
use resq_config::{normalize_queue_name, ResqSettings};

/// Producer-side entry point: immediate vs delayed enqueue, plus token-based
/// deduplication of submissions.
#[derive(Clone)]
pub struct SchedulingGateway {
    backend: Arc<dyn QueueBackend>,
    tracker: StatusTracker,
    default_queue_name: String,
}

impl SchedulingGateway {
    pub fn new(backend: Arc<dyn QueueBackend>, settings: &ResqSettings) -> Self {
        let tracker = StatusTracker::new(backend.clone());
        Self {
            backend,
            tracker,
            default_queue_name: settings.default_queue_name.clone(),
        }
    }

    pub fn tracker(&self) -> &StatusTracker {
        &self.tracker
    }

    fn resolve_queue(&self, queue: Option<&str>) -> String {
        normalize_queue_name(queue.unwrap_or(&self.default_queue_name))
    }

    /// Push a new job onto the ready lane.
    ///
    /// Returns the freshly assigned token when `track` is set, `None` for
    /// fire-and-forget submissions.
    pub async fn submit(
        &self,
        handler_ref: &str,
        args: Map<String, Value>,
        queue: Option<&str>,
        track: bool,
    ) -> Result<Option<String>, QueueError> {
        let token = if track { Some(Envelope::new_token()) } else { None };
        self.push(token, handler_ref, args, queue).await
    }

    /// Push under `token` only if no live submission exists for it.
    ///
    /// Absent, `Complete` and `Failed` statuses clear the way; `Waiting` and
    /// `Running` return `None` without enqueuing. The enqueue reuses the
    /// caller's token, so status tracking stays continuous across calls.
    ///
    /// The status read and the enqueue are two separate round trips; a
    /// concurrent producer can slip a duplicate in between. Callers needing
    /// strict exclusivity must bring their own locking.
    pub async fn submit_if_absent(
        &self,
        token: &str,
        handler_ref: &str,
        args: Map<String, Value>,
        queue: Option<&str>,
    ) -> Result<Option<String>, QueueError> {
        match self.tracker.status(token).await? {
            Some(status) if status.is_live() => {
                tracing::debug!(token, status = status.as_str(), "submission skipped, job is live");
                Ok(None)
            }
            _ => self.push(Some(token.to_string()), handler_ref, args, queue).await,
        }
    }

    /// Push a new job onto the delayed lane.
    pub async fn schedule(
        &self,
        when: Schedule,
        handler_ref: &str,
        args: Map<String, Value>,
        queue: Option<&str>,
    ) -> Result<(), QueueError> {
        self.ensure_delayed_lane()?;
        let queue_name = self.resolve_queue(queue);
        let delay_seconds = match when {
            Schedule::In(seconds) => seconds.max(0),
            Schedule::At(at) => at.signed_duration_since(Utc::now()).num_seconds().max(0),
        };
        let envelope = Envelope {
            token: None,
            handler_ref: handler_ref.to_string(),
            args,
            attempts: 1,
            delay_seconds,
            queue_name: Some(queue_name.clone()),
        };
        let raw = envelope.raw_body()?;
        self.backend.enqueue_after(&queue_name, when, &raw).await?;
        tracing::info!(
            handler = handler_ref,
            queue = %queue_name,
            delay_seconds,
            "job scheduled"
        );
        Ok(())
    }

    /// Push an already-serialized envelope onto the delayed lane.
    ///
    /// Used for retry re-submissions whose attempt count is already baked in;
    /// the payload is validated but never re-stamped.
    pub async fn schedule_raw(
        &self,
        when: Schedule,
        raw_body: &str,
        queue: Option<&str>,
    ) -> Result<(), QueueError> {
        self.ensure_delayed_lane()?;
        let envelope = Envelope::from_raw_body(raw_body)?;
        let queue_name = self.resolve_queue(queue);
        self.backend.enqueue_after(&queue_name, when, raw_body).await?;
        tracing::info!(
            handler = %envelope.handler_ref,
            token = ?envelope.token,
            attempts = envelope.attempts,
            queue = %queue_name,
            "raw payload scheduled"
        );
        Ok(())
    }

    async fn push(
        &self,
        token: Option<String>,
        handler_ref: &str,
        args: Map<String, Value>,
        queue: Option<&str>,
    ) -> Result<Option<String>, QueueError> {
        let queue_name = self.resolve_queue(queue);
        let envelope = Envelope {
            token,
            handler_ref: handler_ref.to_string(),
            args,
            attempts: 1,
            delay_seconds: 0,
            queue_name: Some(queue_name.clone()),
        };

        let span = tracing::info_span!(
            "resq.submit",
            handler = handler_ref,
            queue = %queue_name,
            token = tracing::field::Empty
        );
        if let Some(token) = envelope.token.as_deref() {
            span.record("token", token);
        }
        let _enter = span.enter();

        // status first: a worker grabbing the job immediately afterwards must
        // not have its RUNNING overwritten by our WAITING
        if let Some(token) = envelope.token.as_deref() {
            self.backend.set_status(token, JobStatus::Waiting).await?;
        }
        self.backend.enqueue_now(&queue_name, &envelope).await?;
        tracing::info!("job enqueued");
        Ok(envelope.token)
    }

    fn ensure_delayed_lane(&self) -> Result<(), QueueError> {
        if self.backend.supports_delayed() {
            Ok(())
        } else {
            Err(QueueError::BackendMisconfigured(
                "backend has no delayed-execution lane; enable the scheduler".to_string(),
            ))
        }
    }
}
