//! 安全参数解析能力：设备寻址所需的三个秘密参数。
//!
//! 参数按名称存放在参数存储中（约定前缀 + 固定后缀），请求时批量获取并
//! 即时解密。解析结果是请求作用域的短生命周期值：不持久化，日志中不以
//! 明文出现。
//!
//! 默认不做跨请求缓存——操作员可能轮换设备地址，正确性要求即时新鲜；
//! 可选开启短 TTL 缓存（上限 60 秒）以收敛解析延迟。

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// 设备地址参数名后缀。
pub const PARAM_DEVICE_ADDRESS: &str = "ip-address";
/// 命令主题参数名后缀。
pub const PARAM_TOPIC: &str = "mqtt-topic";
/// 网关标识参数名后缀。
pub const PARAM_GATEWAY_ID: &str = "gateway-id";

/// 安全参数解析错误。
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("missing parameter: {0}")]
    MissingParameter(String),
    #[error("parameter store error: {0}")]
    Store(String),
}

/// 设备寻址参数。
///
/// 请求作用域值；Debug 输出脱敏，避免经由日志泄露。
#[derive(Clone)]
pub struct SecureParameters {
    pub device_address: String,
    pub topic: String,
    pub gateway_id: String,
}

impl std::fmt::Debug for SecureParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureParameters")
            .field("device_address", &"<redacted>")
            .field("topic", &"<redacted>")
            .field("gateway_id", &"<redacted>")
            .finish()
    }
}

/// 参数存储抽象：按名称批量读取，返回已解密的明文值。
///
/// 解密是存储侧取值时的副作用，不是解析器的职责。
#[async_trait]
pub trait ParameterStore: Send + Sync {
    async fn get_parameters(
        &self,
        names: &[String],
    ) -> Result<HashMap<String, String>, SecretError>;
}

/// 环境变量参数存储。
///
/// 参数名 `/plc/secure/ip-address` 映射为环境变量 `PLC_SECURE_IP_ADDRESS`。
#[derive(Debug, Default)]
pub struct EnvParameterStore;

impl EnvParameterStore {
    pub fn new() -> Self {
        Self
    }

    fn env_key(name: &str) -> String {
        name.trim_matches('/')
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() {
                    ch.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect()
    }
}

#[async_trait]
impl ParameterStore for EnvParameterStore {
    async fn get_parameters(
        &self,
        names: &[String],
    ) -> Result<HashMap<String, String>, SecretError> {
        let mut values = HashMap::new();
        for name in names {
            if let Ok(value) = std::env::var(Self::env_key(name)) {
                if !value.is_empty() {
                    values.insert(name.clone(), value);
                }
            }
        }
        Ok(values)
    }
}

/// 内存参数存储（测试和本地演示用）。
pub struct InMemoryParameterStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryParameterStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// 写入参数。
    pub fn put(&self, name: impl Into<String>, value: impl Into<String>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(name.into(), value.into());
        }
    }

    /// 删除参数（模拟缺失配置）。
    pub fn remove(&self, name: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(name);
        }
    }
}

#[async_trait]
impl ParameterStore for InMemoryParameterStore {
    async fn get_parameters(
        &self,
        names: &[String],
    ) -> Result<HashMap<String, String>, SecretError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| SecretError::Store("lock failed".to_string()))?;
        let mut values = HashMap::new();
        for name in names {
            if let Some(value) = entries.get(name) {
                values.insert(name.clone(), value.clone());
            }
        }
        Ok(values)
    }
}

/// 秘密参数解析器：单次批量调用取回三个参数。
pub struct SecretResolver {
    store: Arc<dyn ParameterStore>,
    prefix: String,
    cache_ttl: Duration,
    cache: Mutex<Option<(Instant, SecureParameters)>>,
}

impl SecretResolver {
    /// 创建不缓存的解析器。
    pub fn new(store: Arc<dyn ParameterStore>, prefix: impl Into<String>) -> Self {
        Self::with_cache_ttl(store, prefix, Duration::ZERO)
    }

    /// 创建带短 TTL 缓存的解析器（TTL 为零时等价于不缓存）。
    pub fn with_cache_ttl(
        store: Arc<dyn ParameterStore>,
        prefix: impl Into<String>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            store,
            prefix: prefix.into().trim_end_matches('/').to_string(),
            cache_ttl,
            cache: Mutex::new(None),
        }
    }

    fn parameter_name(&self, suffix: &str) -> String {
        format!("{}/{}", self.prefix, suffix)
    }

    /// 解析设备寻址参数。
    ///
    /// 三个参数缺一不可；取值后任何名称缺失都报 `MissingParameter`。
    pub async fn resolve(&self) -> Result<SecureParameters, SecretError> {
        if !self.cache_ttl.is_zero() {
            if let Ok(cache) = self.cache.lock() {
                if let Some((fetched_at, params)) = cache.as_ref() {
                    if fetched_at.elapsed() < self.cache_ttl {
                        return Ok(params.clone());
                    }
                }
            }
        }

        let names = vec![
            self.parameter_name(PARAM_DEVICE_ADDRESS),
            self.parameter_name(PARAM_TOPIC),
            self.parameter_name(PARAM_GATEWAY_ID),
        ];
        let values = self.store.get_parameters(&names).await?;
        let params = SecureParameters {
            device_address: require(&values, &names[0])?,
            topic: require(&values, &names[1])?,
            gateway_id: require(&values, &names[2])?,
        };

        if !self.cache_ttl.is_zero() {
            if let Ok(mut cache) = self.cache.lock() {
                *cache = Some((Instant::now(), params.clone()));
            }
        }
        Ok(params)
    }
}

fn require(values: &HashMap<String, String>, name: &str) -> Result<String, SecretError> {
    values
        .get(name)
        .cloned()
        .ok_or_else(|| SecretError::MissingParameter(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_key_maps_parameter_path() {
        assert_eq!(
            EnvParameterStore::env_key("/plc/secure/ip-address"),
            "PLC_SECURE_IP_ADDRESS"
        );
    }

    #[test]
    fn secure_parameters_debug_is_redacted() {
        let params = SecureParameters {
            device_address: "192.0.2.1".to_string(),
            topic: "plant/line-1/plc".to_string(),
            gateway_id: "gw-01".to_string(),
        };
        let debug = format!("{params:?}");
        assert!(!debug.contains("192.0.2.1"));
        assert!(debug.contains("<redacted>"));
    }
}
