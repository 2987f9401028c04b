use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::settings::ResqSettings;

pub const DEFAULT_CONFIG_FILENAME: &str = "resq.toml";
pub const ENV_CONFIG_KEY: &str = "RESQ_CONFIG";

pub fn resolve_config_source(config_path: Option<&str>) -> (Option<String>, String) {
    if let Some(path) = config_path {
        return (Some(path.to_string()), "--config parameter".to_string());
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG_KEY) {
        if !env_path.is_empty() {
            return (Some(env_path), format!("{ENV_CONFIG_KEY} env var"));
        }
    }

    let default_path = Path::new(DEFAULT_CONFIG_FILENAME);
    if default_path.is_file() {
        return (
            Some(default_path.to_string_lossy().to_string()),
            format!("{DEFAULT_CONFIG_FILENAME} in cwd"),
        );
    }

    (None, "not found".to_string())
}

/// Load settings from TOML, then apply `RESQ_*` environment overrides.
///
/// The file may either be a bare settings table or nest everything under a
/// `[resq]` table.
pub fn load_toml_settings(config_path: Option<&str>) -> Result<ResqSettings> {
    dotenvy::dotenv().ok();

    let (path, _) = resolve_config_source(config_path);
    let path = path.ok_or_else(|| {
        anyhow::anyhow!(
            "resq config not found. Provide --config, set RESQ_CONFIG, or add resq.toml."
        )
    })?;

    let payload = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config at {path}"))?;
    let toml_value: toml::Value =
        toml::from_str(&payload).with_context(|| format!("failed to parse TOML at {path}"))?;
    let mut json_value =
        serde_json::to_value(toml_value).context("failed to convert TOML to JSON")?;

    json_value = normalize_toml_payload(json_value)?;
    let env_overrides = env_overrides()?;
    let merged = deep_merge(json_value, env_overrides);

    let settings: ResqSettings = serde_json::from_value(merged).context("invalid resq config")?;
    Ok(settings)
}

fn normalize_toml_payload(mut payload: Value) -> Result<Value> {
    if let Value::Object(mut map) = payload {
        if let Some(resq_value) = map.remove("resq") {
            payload = resq_value;
        } else {
            payload = Value::Object(map);
        }
    }

    match payload {
        Value::Object(map) => Ok(Value::Object(map)),
        _ => Err(anyhow::anyhow!("resq config must be a TOML table")),
    }
}

fn env_overrides() -> Result<Value> {
    let mut payload = Map::new();

    set_env_string(&mut payload, "redis_dsn", "RESQ_REDIS_DSN");
    set_env_string(&mut payload, "default_queue_name", "RESQ_DEFAULT_QUEUE_NAME");
    set_env_int(&mut payload, "status_ttl_seconds", "RESQ_STATUS_TTL_SECONDS")?;
    set_env_bool(&mut payload, "scheduler_enabled", "RESQ_SCHEDULER_ENABLED")?;

    Ok(Value::Object(payload))
}

fn set_env_string(map: &mut Map<String, Value>, key: &str, env: &str) {
    if let Ok(value) = std::env::var(env) {
        if !value.is_empty() {
            map.insert(key.to_string(), Value::String(value));
        }
    }
}

fn set_env_int(map: &mut Map<String, Value>, key: &str, env: &str) -> Result<()> {
    if let Ok(value) = std::env::var(env) {
        if value.is_empty() {
            return Ok(());
        }
        let parsed: i64 = value
            .parse()
            .with_context(|| format!("Invalid {env} value: {value}"))?;
        map.insert(key.to_string(), Value::Number(parsed.into()));
    }
    Ok(())
}

fn set_env_bool(map: &mut Map<String, Value>, key: &str, env: &str) -> Result<()> {
    if let Ok(value) = std::env::var(env) {
        if value.is_empty() {
            return Ok(());
        }
        let parsed = match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" => true,
            "0" | "false" | "no" => false,
            _ => return Err(anyhow::anyhow!("Invalid {env} value: {value}")),
        };
        map.insert(key.to_string(), Value::Bool(parsed));
    }
    Ok(())
}

fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                let entry = base_map.remove(&key);
                let merged = match entry {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay_value) => overlay_value,
    }
}
