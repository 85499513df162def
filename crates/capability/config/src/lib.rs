//! 应用运行配置加载。

use std::env;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 主存储后端。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    /// 进程内存储，仅用于本地演示与测试。
    Memory,
}

/// 冷却状态（最新位置）存储后端。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownBackend {
    /// 与主存储相同。
    Store,
    Redis,
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub cooldown_backend: CooldownBackend,
    pub redis_url: String,
    /// 一般位置冷却窗口（毫秒）。
    pub cooldown_ms: i64,
    /// 边界警报冷却窗口（毫秒），与一般冷却独立。
    pub boundary_cooldown_ms: i64,
    pub boundary_scan_limit: usize,
    pub notify_enabled: bool,
    pub notify_timeout_seconds: u64,
    pub notify_max_retries: u64,
    pub notify_backoff_ms: u64,
    pub line_api_base: String,
    pub fcm_endpoint: String,
    pub fcm_server_key: Option<String>,
}

/// 默认冷却窗口：5 分钟。
pub const DEFAULT_COOLDOWN_MS: i64 = 5 * 60 * 1000;

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_addr =
            env::var("BEACON_HTTP_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let storage = match read_optional("BEACON_STORAGE")
            .map(|value| value.to_ascii_lowercase())
            .as_deref()
        {
            None | Some("postgres") => StorageBackend::Postgres,
            Some("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid(
                    "BEACON_STORAGE".to_string(),
                    other.to_string(),
                ));
            }
        };
        let database_url = read_optional("BEACON_DATABASE_URL");
        if storage == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("BEACON_DATABASE_URL".to_string()));
        }
        let cooldown_backend = match read_optional("BEACON_COOLDOWN_BACKEND")
            .map(|value| value.to_ascii_lowercase())
            .as_deref()
        {
            None | Some("store") => CooldownBackend::Store,
            Some("redis") => CooldownBackend::Redis,
            Some(other) => {
                return Err(ConfigError::Invalid(
                    "BEACON_COOLDOWN_BACKEND".to_string(),
                    other.to_string(),
                ));
            }
        };
        let redis_url = env::var("BEACON_REDIS_URL")
            .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
        let cooldown_ms = read_positive_i64_with_default("BEACON_COOLDOWN_MS", DEFAULT_COOLDOWN_MS)?;
        let boundary_cooldown_ms =
            read_positive_i64_with_default("BEACON_BOUNDARY_COOLDOWN_MS", DEFAULT_COOLDOWN_MS)?;
        let boundary_scan_limit = read_u64_with_default("BEACON_BOUNDARY_SCAN_LIMIT", 10)?.max(1);
        let notify_enabled = read_bool_with_default("BEACON_NOTIFY", true);
        let notify_timeout_seconds =
            read_u64_with_default("BEACON_NOTIFY_TIMEOUT_SECONDS", 10)?.clamp(1, 60);
        let notify_max_retries = read_u64_with_default("BEACON_NOTIFY_MAX_RETRIES", 1)?;
        let notify_backoff_ms = read_u64_with_default("BEACON_NOTIFY_BACKOFF_MS", 200)?;
        let line_api_base = env::var("BEACON_LINE_API_BASE")
            .unwrap_or_else(|_| "https://api.line.me".to_string());
        let fcm_endpoint = env::var("BEACON_FCM_ENDPOINT")
            .unwrap_or_else(|_| "https://fcm.googleapis.com/fcm/send".to_string());
        let fcm_server_key = read_optional("BEACON_FCM_SERVER_KEY");

        Ok(Self {
            http_addr,
            storage,
            database_url,
            cooldown_backend,
            redis_url,
            cooldown_ms,
            boundary_cooldown_ms,
            boundary_scan_limit: boundary_scan_limit as usize,
            notify_enabled,
            notify_timeout_seconds,
            notify_max_retries,
            notify_backoff_ms,
            line_api_base,
            fcm_endpoint,
            fcm_server_key,
        })
    }
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_positive_i64_with_default(key: &str, default: i64) -> Result<i64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    match value.parse::<i64>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(ConfigError::Invalid(key.to_string(), value)),
    }
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => None,
    }
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}
