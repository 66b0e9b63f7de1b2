//! 审计能力：按天分流的追加写入与时间范围查询。
//!
//! ## 架构设计
//!
//! - `event.rs`：审计事件模型（成功/失败两种形态，JSON 行序列化）
//! - `store.rs`：审计流存储抽象（创建流、追加、按时间过滤）
//! - `in_memory.rs`：内存流存储（测试和本地演示）
//! - `postgres.rs`：PostgreSQL 流存储（生产环境）
//! - `sink.rs`：审计写入端——绝不向调用方抛错
//! - `query.rs`：审计查询端——限流、容错解析
//!
//! ## 核心契约
//!
//! - 每次命令网关调用恰好尝试一次审计写入（尽力而为，送达不保证）
//! - 写入失败只在本地记录，绝不影响主操作结果
//! - 流按事件 UTC 日期命名，同日并发创建竞态按成功处理
//! - 查询时单条损坏的日志行降级为 `{timestamp, message}`，不拖垮整个查询

pub mod event;
pub mod in_memory;
pub mod postgres;
pub mod query;
pub mod sink;
pub mod store;

pub use event::{ACTION_COMMAND, ACTION_COMMAND_ERROR, AuditEvent};
pub use in_memory::InMemoryAuditStreamStore;
pub use postgres::PgAuditStreamStore;
pub use query::{
    AuditLogEntry, AuditLogPage, AuditQueryService, DEFAULT_QUERY_LIMIT, MAX_QUERY_LIMIT,
};
pub use sink::AuditSink;
pub use store::{AuditPage, AuditStoreError, AuditStreamStore, RawAuditEntry};
