use std::sync::Arc;

use crate::backend::Schedule;
use crate::backoff::next_delay_seconds;
use crate::envelope::Envelope;
use crate::error::QueueError;
use crate::gateway::SchedulingGateway;

/// Turns an execution failure into exactly one delayed re-submission.
///
/// No cap on total attempts is enforced here: a permanently failing job
/// retries forever with its delay capped at two hours. Capping the retry
/// count belongs to an outer supervisor with a dead-letter store.
#[derive(Clone)]
pub struct FailureHandler {
    gateway: Arc<SchedulingGateway>,
}

impl FailureHandler {
    pub fn new(gateway: Arc<SchedulingGateway>) -> Self {
        Self { gateway }
    }

    /// Re-submit `envelope` with an incremented attempt count after the
    /// backoff delay computed from its pre-retry attempts.
    ///
    /// A backend failure here is fatal for this retry attempt: the error
    /// propagates and the job is not re-enqueued.
    pub async fn on_failure(
        &self,
        envelope: &Envelope,
        original_delay_seconds: i64,
    ) -> Result<(), QueueError> {
        let attempts = envelope.attempts;
        let delay_seconds = next_delay_seconds(attempts, original_delay_seconds);

        let mut retry = envelope.clone();
        retry.attempts = attempts + 1;
        retry.delay_seconds = delay_seconds;
        let raw = retry.raw_body()?;

        tracing::warn!(
            token = ?envelope.token,
            handler = %envelope.handler_ref,
            attempts = retry.attempts,
            delay_seconds,
            "execution failed, re-submitting with backoff"
        );
        self.gateway
            .schedule_raw(
                Schedule::In(delay_seconds),
                &raw,
                envelope.queue_name.as_deref(),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_settings, MemoryBackend};
    use serde_json::Map;

    fn envelope(attempts: i64, delay_seconds: i64) -> Envelope {
        Envelope {
            token: Some("tok-retry".to_string()),
            handler_ref: "mail.send".to_string(),
            args: Map::new(),
            attempts,
            delay_seconds,
            queue_name: Some("resq:queue:mail".to_string()),
        }
    }

    fn handler_under_test(backend: Arc<MemoryBackend>) -> FailureHandler {
        let gateway = Arc::new(SchedulingGateway::new(backend, &test_settings()));
        FailureHandler::new(gateway)
    }

    #[tokio::test]
    async fn first_failure_waits_thirty_seconds() {
        let backend = MemoryBackend::new();
        let handler = handler_under_test(backend.clone());

        handler.on_failure(&envelope(1, 0), 0).await.unwrap();
        let entries = backend.delayed_entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].delay_seconds, Some(30));
        assert_eq!(entries[0].queue_name, "resq:queue:mail");

        let retry = Envelope::from_raw_body(&entries[0].raw_body).unwrap();
        assert_eq!(retry.attempts, 2);
        assert_eq!(retry.delay_seconds, 30);
        assert_eq!(retry.token.as_deref(), Some("tok-retry"));
    }

    #[tokio::test]
    async fn later_failures_back_off_exponentially() {
        let backend = MemoryBackend::new();
        let handler = handler_under_test(backend.clone());

        handler.on_failure(&envelope(4, 30), 30).await.unwrap();
        let entries = backend.delayed_entries().await;
        assert_eq!(entries[0].delay_seconds, Some(120));
        let retry = Envelope::from_raw_body(&entries[0].raw_body).unwrap();
        assert_eq!(retry.attempts, 5);
        assert_eq!(retry.delay_seconds, 120);
    }

    #[tokio::test]
    async fn n_consecutive_failures_reach_attempts_n_plus_one() {
        let backend = MemoryBackend::new();
        let handler = handler_under_test(backend.clone());

        let mut current = envelope(1, 30);
        for failures in 1..=6 {
            handler
                .on_failure(&current, current.delay_seconds)
                .await
                .unwrap();
            let entries = backend.delayed_entries().await;
            let mut retry = Envelope::from_raw_body(&entries[failures - 1].raw_body).unwrap();
            assert_eq!(retry.attempts, failures as i64 + 1);
            retry.queue_name = current.queue_name.clone();
            current = retry;
        }
    }

    #[tokio::test]
    async fn backend_failure_propagates_and_drops_the_retry() {
        let backend = MemoryBackend::without_delayed_lane();
        let handler = handler_under_test(backend.clone());

        let err = handler.on_failure(&envelope(1, 0), 0).await.unwrap_err();
        assert!(matches!(err, QueueError::BackendMisconfigured(_)));
        assert!(backend.delayed_entries().await.is_empty());
    }
}
