use thiserror::Error;

/// Backend-level failures visible to callers.
///
/// Handler execution failures are not part of this taxonomy: they are absorbed
/// into the retry cycle and reported as [`crate::worker::FireOutcome::Failure`].
#[derive(Debug, Error)]
pub enum QueueError {
    /// The shared store could not be reached for a status read or an enqueue.
    /// Never retried internally.
    #[error("queue backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A delayed enqueue was requested but the backend has no delayed lane.
    /// Never silently downgraded to immediate execution.
    #[error("delayed scheduling unavailable: {0}")]
    BackendMisconfigured(String),

    /// A raw payload did not round-trip into a valid envelope.
    #[error("invalid job payload: {0}")]
    InvalidPayload(String),
}

impl From<redis::RedisError> for QueueError {
    fn from(err: redis::RedisError) -> Self {
        QueueError::BackendUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for QueueError {
    fn from(err: serde_json::Error) -> Self {
        QueueError::InvalidPayload(err.to_string())
    }
}
