//! 命令记录存储内存实现
//!
//! 仅用于本地测试和占位。

use crate::error::StorageError;
use crate::models::CommandRecord;
use crate::traits::CommandRecordStore;
use crate::validation::{ensure_owner, ensure_principal};
use domain::Principal;
use std::sync::RwLock;

/// 命令记录内存存储
pub struct InMemoryCommandRecordStore {
    records: RwLock<Vec<CommandRecord>>,
}

impl InMemoryCommandRecordStore {
    /// 创建新的命令记录存储
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl CommandRecordStore for InMemoryCommandRecordStore {
    async fn create_command_record(
        &self,
        principal: &Principal,
        record: CommandRecord,
    ) -> Result<CommandRecord, StorageError> {
        ensure_owner(principal, &record)?;
        let mut records = self
            .records
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if records.iter().any(|item| item.id == record.id) {
            return Err(StorageError::new("duplicate record id"));
        }
        records.push(record.clone());
        Ok(record)
    }

    async fn list_command_records(
        &self,
        principal: &Principal,
        limit: i64,
    ) -> Result<Vec<CommandRecord>, StorageError> {
        ensure_principal(principal)?;
        let limit = limit.max(0) as usize;
        let records = self
            .records
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut items: Vec<CommandRecord> = records
            .iter()
            .filter(|item| item.owner == principal.user_id)
            .cloned()
            .collect();
        // RFC 3339 UTC 时间戳的字典序即时间序
        items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if limit > 0 && items.len() > limit {
            items.truncate(limit);
        }
        Ok(items)
    }
}
