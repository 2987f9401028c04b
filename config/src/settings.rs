use serde::{Deserialize, Serialize};

use crate::defaults::{DEFAULT_QUEUE_NAME, DEFAULT_REDIS_DSN, DEFAULT_STATUS_TTL_SECONDS};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ResqSettings {
    pub redis_dsn: String,
    pub default_queue_name: String,
    /// TTL applied to per-token status keys; expired statuses read as absent.
    pub status_ttl_seconds: i64,
    /// Whether the delayed-execution lane is available on the backend.
    pub scheduler_enabled: bool,
}

impl Default for ResqSettings {
    fn default() -> Self {
        Self {
            redis_dsn: DEFAULT_REDIS_DSN.to_string(),
            default_queue_name: DEFAULT_QUEUE_NAME.to_string(),
            status_ttl_seconds: DEFAULT_STATUS_TTL_SECONDS,
            scheduler_enabled: true,
        }
    }
}
