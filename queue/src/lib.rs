pub mod backend;
pub mod backoff;
pub mod constants;
pub mod envelope;
pub mod error;
pub mod failure;
pub mod gateway;
pub mod status;
pub mod telemetry;
pub mod worker;

#[cfg(test)]
mod test_support;

pub use backend::{QueueBackend, RedisBackend, Schedule};
pub use backoff::{next_delay_seconds, FIRST_FAILURE_DELAY_SECONDS, MAX_DELAY_SECONDS};
pub use envelope::{Envelope, JobStatus};
pub use error::QueueError;
pub use failure::FailureHandler;
pub use gateway::SchedulingGateway;
pub use status::StatusTracker;
pub use worker::{Executor, FireContext, FireOutcome, Handler, HandlerRegistry};
pub use resq_config::defaults::{DEFAULT_QUEUE_NAME, DEFAULT_REDIS_DSN, DEFAULT_STATUS_TTL_SECONDS};
