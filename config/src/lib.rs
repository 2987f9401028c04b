pub mod config;
pub mod defaults;
pub mod queue;
pub mod settings;

pub use config::{load_toml_settings, resolve_config_source, DEFAULT_CONFIG_FILENAME, ENV_CONFIG_KEY};
pub use defaults::*;
pub use queue::normalize_queue_name;
pub use settings::ResqSettings;
