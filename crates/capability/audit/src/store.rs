//! 审计流存储抽象。
//!
//! 流按日命名，在日志组下惰性创建。同日并发创建会产生
//! `StreamAlreadyExists` 竞态，由写入端按成功处理。

use async_trait::async_trait;

/// 审计流存储错误。
#[derive(Debug, thiserror::Error)]
pub enum AuditStoreError {
    #[error("stream already exists: {0}")]
    StreamAlreadyExists(String),
    #[error("stream not found: {0}")]
    StreamNotFound(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("store error: {0}")]
    Store(String),
}

/// 原始审计日志行：写入时间戳 + JSON 文本。
#[derive(Debug, Clone)]
pub struct RawAuditEntry {
    pub ts_ms: i64,
    pub message: String,
}

/// 过滤结果页。
#[derive(Debug, Clone)]
pub struct AuditPage {
    pub entries: Vec<RawAuditEntry>,
    pub next_token: Option<String>,
}

/// 审计流存储接口。
#[async_trait]
pub trait AuditStreamStore: Send + Sync {
    /// 创建流；流已存在时返回 `StreamAlreadyExists`
    async fn create_stream(&self, log_group: &str, stream: &str) -> Result<(), AuditStoreError>;

    /// 向已存在的流追加一行
    async fn append(
        &self,
        log_group: &str,
        stream: &str,
        entry: RawAuditEntry,
    ) -> Result<(), AuditStoreError>;

    /// 按时间范围过滤日志组内所有流（闭区间，原生时间序）
    async fn filter(
        &self,
        log_group: &str,
        from_ms: Option<i64>,
        to_ms: Option<i64>,
        limit: i64,
    ) -> Result<AuditPage, AuditStoreError>;
}
