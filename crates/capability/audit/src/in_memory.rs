//! 审计流内存实现
//!
//! 仅用于本地测试和占位。

use crate::store::{AuditPage, AuditStoreError, AuditStreamStore, RawAuditEntry};
use std::collections::HashMap;
use std::sync::RwLock;

/// 审计流内存存储
///
/// 以 `(日志组, 流名)` 为键保存日志行。
pub struct InMemoryAuditStreamStore {
    groups: RwLock<HashMap<String, HashMap<String, Vec<RawAuditEntry>>>>,
}

impl InMemoryAuditStreamStore {
    /// 创建新的审计流存储
    pub fn new() -> Self {
        Self {
            groups: RwLock::new(HashMap::new()),
        }
    }

    /// 列出日志组内的流名（测试用）
    pub fn stream_names(&self, log_group: &str) -> Vec<String> {
        match self.groups.read() {
            Ok(groups) => groups
                .get(log_group)
                .map(|streams| {
                    let mut names: Vec<String> = streams.keys().cloned().collect();
                    names.sort();
                    names
                })
                .unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }
}

#[async_trait::async_trait]
impl AuditStreamStore for InMemoryAuditStreamStore {
    async fn create_stream(&self, log_group: &str, stream: &str) -> Result<(), AuditStoreError> {
        let mut groups = self
            .groups
            .write()
            .map_err(|_| AuditStoreError::Store("lock failed".to_string()))?;
        let streams = groups.entry(log_group.to_string()).or_default();
        if streams.contains_key(stream) {
            return Err(AuditStoreError::StreamAlreadyExists(stream.to_string()));
        }
        streams.insert(stream.to_string(), Vec::new());
        Ok(())
    }

    async fn append(
        &self,
        log_group: &str,
        stream: &str,
        entry: RawAuditEntry,
    ) -> Result<(), AuditStoreError> {
        let mut groups = self
            .groups
            .write()
            .map_err(|_| AuditStoreError::Store("lock failed".to_string()))?;
        let streams = groups
            .get_mut(log_group)
            .ok_or_else(|| AuditStoreError::StreamNotFound(stream.to_string()))?;
        let entries = streams
            .get_mut(stream)
            .ok_or_else(|| AuditStoreError::StreamNotFound(stream.to_string()))?;
        entries.push(entry);
        Ok(())
    }

    async fn filter(
        &self,
        log_group: &str,
        from_ms: Option<i64>,
        to_ms: Option<i64>,
        limit: i64,
    ) -> Result<AuditPage, AuditStoreError> {
        let limit = limit.max(0) as usize;
        let groups = self
            .groups
            .read()
            .map_err(|_| AuditStoreError::Store("lock failed".to_string()))?;
        let mut entries: Vec<RawAuditEntry> = groups
            .get(log_group)
            .map(|streams| {
                streams
                    .values()
                    .flatten()
                    .filter(|entry| match from_ms {
                        Some(from) => entry.ts_ms >= from,
                        None => true,
                    })
                    .filter(|entry| match to_ms {
                        Some(to) => entry.ts_ms <= to,
                        None => true,
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        // 原生时间序（升序），查询端不再重排
        entries.sort_by(|a, b| a.ts_ms.cmp(&b.ts_ms));
        let truncated = limit > 0 && entries.len() > limit;
        if truncated {
            entries.truncate(limit);
        }
        let next_token = if truncated {
            entries.last().map(|entry| entry.ts_ms.to_string())
        } else {
            None
        };
        Ok(AuditPage {
            entries,
            next_token,
        })
    }
}
