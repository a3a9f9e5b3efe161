use std::fs;
use std::path::Path;
use std::time::Duration;

use serde_json::{json, Map, Value};

pub const SETTINGS_PATH_ENV: &str = "FEEDBACK_SETTINGS";

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub persistence_timeout: Duration,
    pub log_level: String,
    pub cors_max_age: Duration,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        config_from_settings(&default_settings())
    }
}

pub fn load_server_config() -> Result<ServerConfig, String> {
    let settings = match std::env::var(SETTINGS_PATH_ENV) {
        Ok(path) => load_settings_from_disk(Path::new(&path))?,
        Err(_) => migrate_settings(json!({})),
    };

    let mut config = config_from_settings(&settings);
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

pub fn load_settings_from_disk(path: &Path) -> Result<Value, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let parsed = serde_json::from_str::<Value>(&raw)
        .map_err(|e| format!("Failed to parse {}: {e}", path.display()))?;

    Ok(migrate_settings(parsed))
}

pub fn config_from_settings(settings: &Value) -> ServerConfig {
    let defaults = default_settings();
    let str_key = |key: &str| {
        settings
            .get(key)
            .or_else(|| defaults.get(key))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let u64_key = |key: &str| {
        settings
            .get(key)
            .or_else(|| defaults.get(key))
            .and_then(Value::as_u64)
            .unwrap_or_default()
    };

    ServerConfig {
        host: str_key("host"),
        port: u16::try_from(u64_key("port")).unwrap_or(8080),
        database_path: str_key("databasePath"),
        persistence_timeout: Duration::from_millis(u64_key("persistenceTimeoutMs")),
        log_level: str_key("logLevel"),
        cors_max_age: Duration::from_secs(u64_key("corsMaxAgeSecs")),
    }
}

// `DATABASE_URL` may carry a `sqlite://` prefix.
pub fn apply_env_overrides<F>(config: &mut ServerConfig, lookup: F) -> Result<(), String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()) {
        let path = url.trim();
        config.database_path = path.strip_prefix("sqlite://").unwrap_or(path).to_string();
    }

    if let Some(port) = lookup("PORT") {
        config.port = port
            .trim()
            .parse::<u16>()
            .ok()
            .filter(|p| *p > 0)
            .ok_or_else(|| format!("Invalid PORT value: {port}"))?;
    }

    Ok(())
}

fn migrate_settings(input: Value) -> Value {
    let mut out = match input {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    if let Value::Object(defaults) = default_settings() {
        merge_defaults(&mut out, defaults);
    }
    let mut out = Value::Object(out);
    sanitize_settings(&mut out);
    out
}

fn default_settings() -> Value {
    json!({
        "host": "0.0.0.0",
        "port": 8080,
        "databasePath": "feedback.db",
        "persistenceTimeoutMs": 5000,
        "logLevel": "info",
        "corsMaxAgeSecs": 3600
    })
}

fn merge_defaults(target: &mut Map<String, Value>, defaults: Map<String, Value>) {
    for (key, default_value) in defaults {
        target.entry(key).or_insert(default_value);
    }
}

fn sanitize_settings(settings: &mut Value) {
    let Some(obj) = settings.as_object_mut() else {
        return;
    };

    clamp_u64(obj, "port", 1, 65535, 8080);
    clamp_u64(obj, "persistenceTimeoutMs", 100, 60_000, 5000);
    clamp_u64(obj, "corsMaxAgeSecs", 0, 86_400, 3600);

    sanitize_enum(obj, "logLevel", LOG_LEVELS, "info");

    ensure_non_empty_str(obj, "host", "0.0.0.0");
    ensure_non_empty_str(obj, "databasePath", "feedback.db");
}

fn clamp_u64(map: &mut Map<String, Value>, key: &str, min: u64, max: u64, default: u64) {
    let raw = map.get(key).and_then(Value::as_u64).unwrap_or(default);
    map.insert(key.to_string(), json!(raw.clamp(min, max)));
}

fn sanitize_enum(map: &mut Map<String, Value>, key: &str, allowed: &[&str], default: &str) {
    let valid = map
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| allowed.contains(value))
        .unwrap_or(default);
    map.insert(key.to_string(), json!(valid));
}

fn ensure_non_empty_str(map: &mut Map<String, Value>, key: &str, default: &str) {
    let value = map
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(default);
    map.insert(key.to_string(), json!(value));
}
