use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::backend::QueueBackend;
use crate::envelope::{Envelope, JobStatus};
use crate::error::QueueError;
use crate::failure::FailureHandler;
use crate::gateway::SchedulingGateway;
use resq_config::ResqSettings;

/// Execution context handed into every handler run.
///
/// Handlers get everything they need passed in here; there is no ambient
/// container to reach into.
#[derive(Debug, Clone)]
pub struct FireContext {
    pub token: Option<String>,
    pub attempt: i64,
    pub queue_name: String,
}

/// A unit of executable work, resolved by name at fire time.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn run(&self, args: &Map<String, Value>, ctx: &FireContext) -> anyhow::Result<()>;
}

#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn Handler>) {
        self.handlers.insert(name.into(), handler);
    }

    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(name).cloned()
    }
}

/// Result of one execution attempt, as seen by the worker loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FireOutcome {
    Success,
    /// The handler raised (or could not be resolved). The failure has already
    /// been fed into the retry cycle by the time this is returned.
    Failure { reason: String },
}

/// Worker-side execution wrapper around dequeued envelopes.
pub struct Executor {
    backend: Arc<dyn QueueBackend>,
    registry: HandlerRegistry,
    failure: FailureHandler,
    default_queue_name: String,
}

impl Executor {
    pub fn new(
        backend: Arc<dyn QueueBackend>,
        registry: HandlerRegistry,
        gateway: Arc<SchedulingGateway>,
        settings: &ResqSettings,
    ) -> Self {
        Self {
            backend,
            registry,
            failure: FailureHandler::new(gateway),
            default_queue_name: settings.default_queue_name.clone(),
        }
    }

    /// Execute one envelope.
    ///
    /// Handler errors never escape: they are recorded, fed to the failure
    /// handler for re-submission, and folded into
    /// [`FireOutcome::Failure`] so the caller's loop keeps going. Only
    /// backend errors (status write, retry enqueue) return `Err`.
    pub async fn fire(&self, envelope: &Envelope) -> Result<FireOutcome, QueueError> {
        let queue_name = envelope
            .queue_name
            .clone()
            .unwrap_or_else(|| self.default_queue_name.clone());
        let span = tracing::info_span!(
            "resq.job",
            handler = %envelope.handler_ref,
            attempt = envelope.attempts,
            queue = %queue_name,
            token = tracing::field::Empty,
            outcome = tracing::field::Empty
        );
        if let Some(token) = envelope.token.as_deref() {
            span.record("token", token);
        }
        let _enter = span.enter();

        if let Some(token) = envelope.token.as_deref() {
            self.backend.set_status(token, JobStatus::Running).await?;
        }

        let outcome = match self.registry.resolve(&envelope.handler_ref) {
            Some(handler) => {
                let ctx = FireContext {
                    token: envelope.token.clone(),
                    attempt: envelope.attempts,
                    queue_name: queue_name.clone(),
                };
                match handler.run(&envelope.args, &ctx).await {
                    Ok(()) => FireOutcome::Success,
                    Err(err) => FireOutcome::Failure {
                        reason: err.to_string(),
                    },
                }
            }
            None => FireOutcome::Failure {
                reason: format!("no handler registered for '{}'", envelope.handler_ref),
            },
        };

        match &outcome {
            FireOutcome::Success => {
                if let Some(token) = envelope.token.as_deref() {
                    self.backend.set_status(token, JobStatus::Complete).await?;
                }
                span.record("outcome", "success");
                tracing::info!(outcome = "success", "job completed");
            }
            FireOutcome::Failure { reason } => {
                if let Some(token) = envelope.token.as_deref() {
                    self.backend.set_status(token, JobStatus::Failed).await?;
                }
                span.record("outcome", "failure");
                tracing::error!(outcome = "failure", error_message = %reason, "job failed");
                self.failure
                    .on_failure(envelope, envelope.delay_seconds)
                    .await?;
            }
        }

        Ok(outcome)
    }
}
