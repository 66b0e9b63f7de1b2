//! 控制能力：命令执行器与命令网关编排。
//!
//! 命令网关是唯一关心正确性、顺序与故障隔离的地方：
//! 校验输入 → 解析设备参数 → 执行一次 → 持久化记录 → 尽力审计。

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use domain::{PlcCommand, Principal};
use plc_audit::{AuditEvent, AuditSink};
use plc_secrets::{SecretError, SecretResolver, SecureParameters};
use plc_storage::{CommandRecord, CommandRecordStore};
use plc_telemetry::{
    record_command_failed, record_command_latency_ms, record_command_received,
    record_command_succeeded, record_configuration_failure, record_execution_failure,
    record_persistence_failure, record_validation_failure,
};
use rumqttc::{AsyncClient, MqttOptions, QoS};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// 执行器报告的成功状态。
pub const STATUS_SUCCESS: &str = "success";
/// 执行器报告的失败状态。
pub const STATUS_ERROR: &str = "error";

/// 命令下发请求（未经校验的原始输入）。
#[derive(Debug, Clone)]
pub struct CommandInput {
    pub command: String,
    pub value: String,
    pub area: Option<String>,
    pub address: Option<String>,
}

/// 一次设备操作的结构化结果。
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    /// "success" | "error"
    pub status: String,
    /// 设备返回的结果载荷
    pub result: serde_json::Value,
    pub timestamp: String,
}

/// 执行器错误。
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("payload error: {0}")]
    Payload(String),
}

/// 设备命令执行器抽象。
///
/// 可插拔能力：真实传输（现场总线/工业协议客户端）可以替换
/// 当前实现而不触碰网关。读操作可安全重试；写操作绝不允许在
/// 调用方不知情时重试——网关每个请求只执行一次。
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(
        &self,
        params: &SecureParameters,
        command: &PlcCommand,
    ) -> Result<ExecutionOutcome, ExecutorError>;
}

/// 模拟执行器：总是报告成功（当前系统的默认行为）。
#[derive(Debug, Default)]
pub struct SimulatedExecutor;

#[async_trait]
impl CommandExecutor for SimulatedExecutor {
    async fn execute(
        &self,
        params: &SecureParameters,
        command: &PlcCommand,
    ) -> Result<ExecutionOutcome, ExecutorError> {
        info!(
            target: "plc.control",
            gateway_id = %params.gateway_id,
            command = %command.command,
            "simulated_execute"
        );
        Ok(ExecutionOutcome {
            status: STATUS_SUCCESS.to_string(),
            result: serde_json::json!({
                "value": "OK",
                "message": "Command executed successfully",
            }),
            timestamp: now_rfc3339(),
        })
    }
}

/// MQTT 执行器配置。
#[derive(Debug, Clone)]
pub struct MqttExecutorConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub qos: u8,
}

/// MQTT 执行器：向解析出的主题发布命令信封。
///
/// 发布成功即视为执行成功；设备侧回执不在本能力范围内。
#[derive(Clone)]
pub struct MqttExecutor {
    client: AsyncClient,
    qos: QoS,
}

impl MqttExecutor {
    pub fn connect(
        config: MqttExecutorConfig,
    ) -> Result<(Self, tokio::task::JoinHandle<()>), ExecutorError> {
        let client_id = format!("plc-control-{}", uuid::Uuid::new_v4());
        let mut options = MqttOptions::new(client_id, config.host, config.port);
        options.set_keep_alive(Duration::from_secs(30));
        if let (Some(username), Some(password)) = (config.username, config.password) {
            options.set_credentials(username, password);
        }
        let (client, mut eventloop) = AsyncClient::new(options, 10);
        let handle = tokio::spawn(async move {
            loop {
                if let Err(err) = eventloop.poll().await {
                    warn!(target: "plc.control", "mqtt eventloop error: {}", err);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        });
        Ok((
            Self {
                client,
                qos: qos_from_u8(config.qos),
            },
            handle,
        ))
    }
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct CommandEnvelope<'a> {
    gateway_id: &'a str,
    issued_at_ms: i64,
    command: &'a PlcCommand,
}

#[async_trait]
impl CommandExecutor for MqttExecutor {
    async fn execute(
        &self,
        params: &SecureParameters,
        command: &PlcCommand,
    ) -> Result<ExecutionOutcome, ExecutorError> {
        let envelope = CommandEnvelope {
            gateway_id: &params.gateway_id,
            issued_at_ms: now_epoch_ms(),
            command,
        };
        let payload =
            serde_json::to_vec(&envelope).map_err(|err| ExecutorError::Payload(err.to_string()))?;
        let topic = params.topic.trim_matches('/').to_string();
        info!(
            target: "plc.control",
            topic = %topic,
            payload_size = payload.len(),
            "command_publish"
        );
        self.client
            .publish(topic, self.qos, false, payload)
            .await
            .map_err(|err| ExecutorError::Transport(err.to_string()))?;
        Ok(ExecutionOutcome {
            status: STATUS_SUCCESS.to_string(),
            result: serde_json::json!({
                "value": "OK",
                "message": "Command published to device topic",
            }),
            timestamp: now_rfc3339(),
        })
    }
}

/// 命令网关错误。
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// 输入不合法：未经任何下游调用即拒绝，不产生审计事件。
    #[error("validation error: {0}")]
    Validation(String),
    /// 秘密参数解析失败：审计后上抛。
    #[error("configuration error: {0}")]
    Configuration(#[from] SecretError),
    /// 设备调用失败或超时：审计后上抛。
    #[error("execution error: {0}")]
    Execution(String),
    /// 命令记录写入失败：审计后上抛（与审计写入失败不同，属于主操作失败）。
    #[error("persistence error: {0}")]
    Persistence(String),
}

/// 命令网关配置。
#[derive(Debug, Clone)]
pub struct CommandGatewayConfig {
    /// 单次设备调用的墙钟上限（毫秒），超时以执行错误上抛。
    pub execute_timeout_ms: u64,
}

impl Default for CommandGatewayConfig {
    fn default() -> Self {
        Self {
            execute_timeout_ms: 30_000,
        }
    }
}

/// 命令网关（编排器）。
///
/// 每次调用是独立、无状态、短生命周期的工作单元；协作方都是
/// 进程启动时构造一次、可被并发请求共享的注入客户端。
#[derive(Clone)]
pub struct CommandGateway {
    secrets: Arc<SecretResolver>,
    executor: Arc<dyn CommandExecutor>,
    record_store: Arc<dyn CommandRecordStore>,
    audit: Arc<AuditSink>,
    config: CommandGatewayConfig,
}

impl CommandGateway {
    pub fn new(
        secrets: Arc<SecretResolver>,
        executor: Arc<dyn CommandExecutor>,
        record_store: Arc<dyn CommandRecordStore>,
        audit: Arc<AuditSink>,
    ) -> Self {
        Self::new_with_config(
            secrets,
            executor,
            record_store,
            audit,
            CommandGatewayConfig::default(),
        )
    }

    pub fn new_with_config(
        secrets: Arc<SecretResolver>,
        executor: Arc<dyn CommandExecutor>,
        record_store: Arc<dyn CommandRecordStore>,
        audit: Arc<AuditSink>,
        config: CommandGatewayConfig,
    ) -> Self {
        Self {
            secrets,
            executor,
            record_store,
            audit,
            config,
        }
    }

    /// 执行一条命令：成功返回已持久化的命令记录，失败返回结构化错误。
    ///
    /// 除校验失败外，任何致命错误在上抛前都会尽力追加一条
    /// 失败形态的审计事件。
    pub async fn execute_command(
        &self,
        principal: &Principal,
        input: CommandInput,
    ) -> Result<CommandRecord, GatewayError> {
        record_command_received();
        let started_at = Instant::now();

        // 校验失败不触发任何下游调用，也不产生审计事件
        let command =
            match PlcCommand::validated(input.command, input.value, input.area, input.address) {
                Ok(command) => command,
                Err(err) => {
                    record_validation_failure();
                    record_command_failed();
                    return Err(GatewayError::Validation(err.to_string()));
                }
            };
        info!(
            target: "plc.control",
            user_id = %principal.user_id,
            source_ip = %principal.source_address,
            command = %command.command,
            "command_received"
        );

        let params = match self.secrets.resolve().await {
            Ok(params) => params,
            Err(err) => {
                record_configuration_failure();
                return Err(self
                    .fail(principal, Some(&command), GatewayError::Configuration(err))
                    .await);
            }
        };

        // 每个请求恰好执行一次；写命令重试必须由调用方显式发起新请求
        let timeout = Duration::from_millis(self.config.execute_timeout_ms);
        let outcome = match tokio::time::timeout(timeout, self.executor.execute(&params, &command))
            .await
        {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => {
                record_execution_failure();
                return Err(self
                    .fail(
                        principal,
                        Some(&command),
                        GatewayError::Execution(err.to_string()),
                    )
                    .await);
            }
            Err(_) => {
                record_execution_failure();
                return Err(self
                    .fail(
                        principal,
                        Some(&command),
                        GatewayError::Execution(format!(
                            "device call timed out after {}ms",
                            self.config.execute_timeout_ms
                        )),
                    )
                    .await);
            }
        };

        let now_ms = now_epoch_ms();
        let now = now_rfc3339();
        let record = CommandRecord {
            id: new_command_id(now_ms),
            user_id: principal.user_id.clone(),
            timestamp: now.clone(),
            command: command.command.clone(),
            value: command.value.clone(),
            area: command.area.clone(),
            address: command.address.clone(),
            status: outcome.status.clone(),
            result: Some(outcome.result.to_string()),
            created_at: now.clone(),
            updated_at: now,
            owner: principal.user_id.clone(),
        };
        let record = match self
            .record_store
            .create_command_record(principal, record)
            .await
        {
            Ok(record) => record,
            Err(err) => {
                record_persistence_failure();
                return Err(self
                    .fail(
                        principal,
                        Some(&command),
                        GatewayError::Persistence(err.to_string()),
                    )
                    .await);
            }
        };

        // 成功审计：尽力而为，失败由写入端吞掉
        self.audit
            .append(&AuditEvent::command(principal, &command, record.status.clone()))
            .await;
        record_command_succeeded();
        record_command_latency_ms(started_at.elapsed().as_millis() as u64);
        info!(
            target: "plc.control",
            user_id = %principal.user_id,
            record_id = %record.id,
            status = %record.status,
            "command_completed"
        );
        Ok(record)
    }

    /// 致命错误统一出口：尽力追加失败审计事件后原样上抛。
    async fn fail(
        &self,
        principal: &Principal,
        command: Option<&PlcCommand>,
        err: GatewayError,
    ) -> GatewayError {
        record_command_failed();
        warn!(
            target: "plc.control",
            user_id = %principal.user_id,
            error = %err,
            "command_failed"
        );
        self.audit
            .append(&AuditEvent::command_error(principal, command, err.to_string()))
            .await;
        err
    }
}

/// 生成时间有序的命令记录 id：`<epoch_ms>-<随机后缀>`。
///
/// 毫秒前缀保证按时间排序，随机后缀让碰撞在概率上不可能，
/// 无需中心序列。
pub fn new_command_id(ts_ms: i64) -> String {
    let suffix: String = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", ts_ms, &suffix[..9])
}

fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn qos_from_u8(value: u8) -> QoS {
    match value {
        0 => QoS::AtMostOnce,
        1 => QoS::AtLeastOnce,
        2 => QoS::ExactlyOnce,
        _ => QoS::AtLeastOnce,
    }
}
