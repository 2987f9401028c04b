use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::QueueError;

/// Status of a tracked job as recorded in the shared store.
///
/// Absence of a status (no token issued, or the key expired) is modelled as
/// `None` at the read site, never as a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Waiting,
    Running,
    Complete,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Waiting => "WAITING",
            JobStatus::Running => "RUNNING",
            JobStatus::Complete => "COMPLETE",
            JobStatus::Failed => "FAILED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "WAITING" => Some(JobStatus::Waiting),
            "RUNNING" => Some(JobStatus::Running),
            "COMPLETE" => Some(JobStatus::Complete),
            "FAILED" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    /// Terminal states, plus absence, permit a fresh submission under the
    /// same token.
    pub fn is_live(&self) -> bool {
        matches!(self, JobStatus::Waiting | JobStatus::Running)
    }
}

/// The serializable unit of work.
///
/// The wire shape is `{ "handler": …, "args": {…}, "attempts": n,
/// "delay": n, "id"?: … }`. The destination queue travels out of band (the
/// dequeuer knows which lane it read from), so `queue_name` is not part of
/// the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Tracking token; present only when the producer asked for tracking.
    /// Once assigned it is reused verbatim across every re-submission of the
    /// same logical job.
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(rename = "handler")]
    pub handler_ref: String,
    #[serde(default)]
    pub args: Map<String, Value>,
    /// >= 1 always; incremented by exactly one per failure-driven
    /// re-submission.
    pub attempts: i64,
    /// The delay that produced this envelope's current scheduling, in
    /// seconds; 0 for immediate.
    #[serde(rename = "delay", default)]
    pub delay_seconds: i64,
    #[serde(skip)]
    pub queue_name: Option<String>,
}

impl Envelope {
    pub fn new_token() -> String {
        Uuid::new_v4().to_string()
    }

    /// Canonical serialization for transport.
    pub fn raw_body(&self) -> Result<String, QueueError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_raw_body(raw: &str) -> Result<Self, QueueError> {
        let envelope: Envelope = serde_json::from_str(raw)?;
        if envelope.attempts < 1 {
            return Err(QueueError::InvalidPayload(format!(
                "attempts must be >= 1, got {}",
                envelope.attempts
            )));
        }
        if envelope.delay_seconds < 0 {
            return Err(QueueError::InvalidPayload(format!(
                "delay must be >= 0, got {}",
                envelope.delay_seconds
            )));
        }
        Ok(envelope)
    }
}
