pub const DEFAULT_REDIS_DSN: &str = "redis://localhost:6379/0";
pub const DEFAULT_QUEUE_NAME: &str = "resq:queue:default";
pub const QUEUE_KEY_PREFIX: &str = "resq:queue:";

pub const DEFAULT_STATUS_TTL_SECONDS: i64 = 60 * 60 * 24;
