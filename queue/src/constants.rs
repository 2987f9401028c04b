pub const QUEUE_KEY_PREFIX: &str = "resq:queue:";
pub const DELAYED_KEY_PREFIX: &str = "resq:delayed:";
pub const STATUS_KEY_PREFIX: &str = "resq:status:";
