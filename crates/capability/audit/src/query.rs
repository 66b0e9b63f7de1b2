//! 审计查询端：限流、容错解析的时间范围读取。

use crate::event::AuditEvent;
use crate::store::{AuditStoreError, AuditStreamStore, RawAuditEntry};
use chrono::{DateTime, SecondsFormat, Utc};
use plc_telemetry::record_audit_query;
use serde::Serialize;
use std::sync::Arc;

/// 未指定时的默认返回条数。
pub const DEFAULT_QUERY_LIMIT: i64 = 100;
/// 服务端硬上限：无论调用方要求多少，最多返回这么多条。
pub const MAX_QUERY_LIMIT: i64 = 1000;

/// 查询结果中的一条日志。
///
/// 能解析为结构化事件的行原样返回；解析失败的行降级为
/// `{timestamp, message}`，绝不让单条坏行拖垮整个查询。
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AuditLogEntry {
    Event(AuditEvent),
    #[serde(rename_all = "camelCase")]
    Raw { timestamp: String, message: String },
}

/// 审计查询结果页。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogPage {
    pub logs: Vec<AuditLogEntry>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// 审计查询服务。
pub struct AuditQueryService {
    store: Arc<dyn AuditStreamStore>,
    log_group: String,
}

impl AuditQueryService {
    /// 创建审计查询服务。
    pub fn new(store: Arc<dyn AuditStreamStore>, log_group: impl Into<String>) -> Self {
        Self {
            store,
            log_group: log_group.into(),
        }
    }

    /// 按时间范围查询审计日志（闭区间，保持存储的原生时间序）。
    pub async fn query(
        &self,
        from_ms: Option<i64>,
        to_ms: Option<i64>,
        limit: Option<i64>,
    ) -> Result<AuditLogPage, AuditStoreError> {
        record_audit_query();
        let limit = limit.unwrap_or(DEFAULT_QUERY_LIMIT).clamp(1, MAX_QUERY_LIMIT);
        let page = self
            .store
            .filter(&self.log_group, from_ms, to_ms, limit)
            .await?;
        let logs: Vec<AuditLogEntry> = page.entries.into_iter().map(parse_entry).collect();
        Ok(AuditLogPage {
            count: logs.len(),
            logs,
            next_token: page.next_token,
        })
    }
}

fn parse_entry(entry: RawAuditEntry) -> AuditLogEntry {
    match serde_json::from_str::<AuditEvent>(&entry.message) {
        Ok(event) => AuditLogEntry::Event(event),
        Err(_) => AuditLogEntry::Raw {
            timestamp: rfc3339_from_ms(entry.ts_ms),
            message: entry.message,
        },
    }
}

fn rfc3339_from_ms(ts_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ts_ms)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}
