//! 审计写入端：尽力而为的追加，绝不向调用方抛错。

use crate::event::AuditEvent;
use crate::store::{AuditStoreError, AuditStreamStore, RawAuditEntry};
use chrono::{DateTime, Utc};
use plc_telemetry::{record_audit_append_failure, record_audit_event_appended};
use std::sync::Arc;
use tracing::warn;

/// 审计写入端。
///
/// 流名由写入时刻的 UTC 日期决定（`YYYY-MM-DD`），惰性创建；
/// "已存在"按成功处理——同日并发请求的创建竞态是预期行为。
pub struct AuditSink {
    store: Arc<dyn AuditStreamStore>,
    log_group: String,
}

impl AuditSink {
    /// 创建审计写入端。
    pub fn new(store: Arc<dyn AuditStreamStore>, log_group: impl Into<String>) -> Self {
        Self {
            store,
            log_group: log_group.into(),
        }
    }

    /// 追加一个审计事件。
    ///
    /// 任何失败都被吞掉：本地日志 + 指标计数。主操作的成败
    /// 永远不取决于审计写入是否成功。
    pub async fn append(&self, event: &AuditEvent) {
        match self.try_append(event).await {
            Ok(()) => record_audit_event_appended(),
            Err(err) => {
                record_audit_append_failure();
                warn!(
                    target: "plc.audit",
                    action = %event.action,
                    error = %err,
                    "audit append failed"
                );
            }
        }
    }

    async fn try_append(&self, event: &AuditEvent) -> Result<(), AuditStoreError> {
        let ts_ms = Utc::now().timestamp_millis();
        let stream = stream_name_for(ts_ms);
        match self.store.create_stream(&self.log_group, &stream).await {
            Ok(()) => {}
            // 同日已有请求创建过流
            Err(AuditStoreError::StreamAlreadyExists(_)) => {}
            Err(err) => return Err(err),
        }
        let message = serde_json::to_string(event)
            .map_err(|err| AuditStoreError::Serialization(err.to_string()))?;
        self.store
            .append(&self.log_group, &stream, RawAuditEntry { ts_ms, message })
            .await
    }
}

/// 由写入时间戳推导当日流名（UTC 日期）。
pub fn stream_name_for(ts_ms: i64) -> String {
    let at = DateTime::<Utc>::from_timestamp_millis(ts_ms).unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    at.format("%Y-%m-%d").to_string()
}
