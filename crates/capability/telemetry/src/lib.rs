//! 追踪与请求 ID 生成。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 基础指标快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub commands_received: u64,
    pub commands_succeeded: u64,
    pub commands_failed: u64,
    pub validation_failures: u64,
    pub configuration_failures: u64,
    pub execution_failures: u64,
    pub persistence_failures: u64,
    pub audit_events_appended: u64,
    pub audit_append_failures: u64,
    pub audit_queries: u64,
    pub command_latency_ms_total: u64,
    pub command_latency_ms_count: u64,
}

/// 基础指标。
pub struct TelemetryMetrics {
    commands_received: AtomicU64,
    commands_succeeded: AtomicU64,
    commands_failed: AtomicU64,
    validation_failures: AtomicU64,
    configuration_failures: AtomicU64,
    execution_failures: AtomicU64,
    persistence_failures: AtomicU64,
    audit_events_appended: AtomicU64,
    audit_append_failures: AtomicU64,
    audit_queries: AtomicU64,
    command_latency_ms_total: AtomicU64,
    command_latency_ms_count: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            commands_received: AtomicU64::new(0),
            commands_succeeded: AtomicU64::new(0),
            commands_failed: AtomicU64::new(0),
            validation_failures: AtomicU64::new(0),
            configuration_failures: AtomicU64::new(0),
            execution_failures: AtomicU64::new(0),
            persistence_failures: AtomicU64::new(0),
            audit_events_appended: AtomicU64::new(0),
            audit_append_failures: AtomicU64::new(0),
            audit_queries: AtomicU64::new(0),
            command_latency_ms_total: AtomicU64::new(0),
            command_latency_ms_count: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            commands_received: self.commands_received.load(Ordering::Relaxed),
            commands_succeeded: self.commands_succeeded.load(Ordering::Relaxed),
            commands_failed: self.commands_failed.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            configuration_failures: self.configuration_failures.load(Ordering::Relaxed),
            execution_failures: self.execution_failures.load(Ordering::Relaxed),
            persistence_failures: self.persistence_failures.load(Ordering::Relaxed),
            audit_events_appended: self.audit_events_appended.load(Ordering::Relaxed),
            audit_append_failures: self.audit_append_failures.load(Ordering::Relaxed),
            audit_queries: self.audit_queries.load(Ordering::Relaxed),
            command_latency_ms_total: self.command_latency_ms_total.load(Ordering::Relaxed),
            command_latency_ms_count: self.command_latency_ms_count.load(Ordering::Relaxed),
        }
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录网关收到命令次数。
pub fn record_command_received() {
    metrics().commands_received.fetch_add(1, Ordering::Relaxed);
}

/// 记录命令处理成功次数（命令记录已持久化）。
pub fn record_command_succeeded() {
    metrics().commands_succeeded.fetch_add(1, Ordering::Relaxed);
}

/// 记录命令处理失败次数（任意致命阶段）。
pub fn record_command_failed() {
    metrics().commands_failed.fetch_add(1, Ordering::Relaxed);
}

/// 记录输入校验失败次数。
pub fn record_validation_failure() {
    metrics().validation_failures.fetch_add(1, Ordering::Relaxed);
}

/// 记录秘密参数解析失败次数。
pub fn record_configuration_failure() {
    metrics()
        .configuration_failures
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录设备执行失败次数（含超时）。
pub fn record_execution_failure() {
    metrics().execution_failures.fetch_add(1, Ordering::Relaxed);
}

/// 记录命令记录写入失败次数。
pub fn record_persistence_failure() {
    metrics()
        .persistence_failures
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录审计事件写入成功次数。
pub fn record_audit_event_appended() {
    metrics()
        .audit_events_appended
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录审计事件写入失败次数（被吞掉、仅本地可见）。
pub fn record_audit_append_failure() {
    metrics()
        .audit_append_failures
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录审计查询次数。
pub fn record_audit_query() {
    metrics().audit_queries.fetch_add(1, Ordering::Relaxed);
}

/// 记录命令处理耗时（毫秒，包含参数解析+执行+写库+审计）。
pub fn record_command_latency_ms(latency_ms: u64) {
    let metrics = metrics();
    metrics
        .command_latency_ms_total
        .fetch_add(latency_ms, Ordering::Relaxed);
    metrics
        .command_latency_ms_count
        .fetch_add(1, Ordering::Relaxed);
}
