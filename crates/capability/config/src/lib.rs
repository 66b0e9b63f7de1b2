//! 应用运行配置加载。

use std::env;

/// 秘密参数缓存 TTL 上限（秒）。设备地址可能被轮换，缓存不得过长。
pub const SECRET_CACHE_TTL_CEILING_SECONDS: u64 = 60;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 命令执行器类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorKind {
    /// 模拟执行器（总是报告成功，当前系统的默认行为）。
    Simulated,
    /// MQTT 执行器（向解析出的主题发布命令信封）。
    Mqtt,
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    /// 缺省时使用内存存储（本地演示/测试）。
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_access_ttl_seconds: u64,
    pub jwt_refresh_ttl_seconds: u64,
    pub parameter_prefix: String,
    /// 0 表示不缓存；非 0 时按秒缓存，上限 60。
    pub secret_cache_ttl_seconds: u64,
    pub audit_log_group: String,
    pub command_timeout_seconds: u64,
    pub executor: ExecutorKind,
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_username: Option<String>,
    pub mqtt_password: Option<String>,
    pub mqtt_qos: u8,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = env::var("PLC_JWT_SECRET")
            .map_err(|_| ConfigError::Missing("PLC_JWT_SECRET".to_string()))?;
        let jwt_access_ttl_seconds = read_u64("PLC_JWT_ACCESS_TTL_SECONDS")?;
        let jwt_refresh_ttl_seconds = read_u64("PLC_JWT_REFRESH_TTL_SECONDS")?;
        let http_addr = env::var("PLC_HTTP_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let database_url = read_optional("PLC_DATABASE_URL");
        let parameter_prefix =
            env::var("PLC_PARAMETER_PREFIX").unwrap_or_else(|_| "/plc/secure".to_string());
        let secret_cache_ttl_seconds = read_u64_with_default("PLC_SECRET_CACHE_TTL_SECONDS", 0)?
            .min(SECRET_CACHE_TTL_CEILING_SECONDS);
        let audit_log_group =
            env::var("PLC_AUDIT_LOG_GROUP").unwrap_or_else(|_| "plc-control-audit".to_string());
        let command_timeout_seconds = read_u64_with_default("PLC_COMMAND_TIMEOUT_SECONDS", 30)?;
        let executor = read_executor_kind("PLC_EXECUTOR")?;
        let mqtt_host = env::var("PLC_MQTT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let mqtt_port = read_u16_with_default("PLC_MQTT_PORT", 1883)?;
        let mqtt_username = read_optional("PLC_MQTT_USERNAME");
        let mqtt_password = read_optional("PLC_MQTT_PASSWORD");
        let mqtt_qos = read_u8_with_default("PLC_MQTT_QOS", 1)?;

        Ok(Self {
            http_addr,
            database_url,
            jwt_secret,
            jwt_access_ttl_seconds,
            jwt_refresh_ttl_seconds,
            parameter_prefix,
            secret_cache_ttl_seconds,
            audit_log_group,
            command_timeout_seconds,
            executor,
            mqtt_host,
            mqtt_port,
            mqtt_username,
            mqtt_password,
            mqtt_qos,
        })
    }
}

/// 读取 u64 类型环境变量。
fn read_u64(key: &str) -> Result<u64, ConfigError> {
    let value = env::var(key).map_err(|_| ConfigError::Missing(key.to_string()))?;
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
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

fn read_u16_with_default(key: &str, default: u16) -> Result<u16, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u8_with_default(key: &str, default: u8) -> Result<u8, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u8>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn read_executor_kind(key: &str) -> Result<ExecutorKind, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(ExecutorKind::Simulated),
    };
    match value.to_ascii_lowercase().as_str() {
        "simulated" => Ok(ExecutorKind::Simulated),
        "mqtt" => Ok(ExecutorKind::Mqtt),
        _ => Err(ConfigError::Invalid(key.to_string(), value)),
    }
}
