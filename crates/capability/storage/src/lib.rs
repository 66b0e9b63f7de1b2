//! # PLC Storage 模块
//!
//! 本模块提供统一的数据存储抽象层，支持多种存储后端实现。
//!
//! ## 架构设计
//!
//! 该模块采用分层架构，遵循以下原则：
//!
//! 1. **接口抽象层** (`traits.rs`)：定义用户与命令记录存储的异步 Trait 接口
//! 2. **数据模型层** (`models.rs`)：定义存储相关的数据结构
//! 3. **错误处理层** (`error.rs`)：统一的存储错误类型
//! 4. **验证辅助层** (`validation.rs`)：请求主体与归属校验
//! 5. **连接管理层** (`connection.rs`)：数据库连接池管理
//! 6. **实现层**：
//!    - `in_memory/`：内存存储实现（用于测试和本地演示）
//!    - `postgres/`：PostgreSQL 存储实现（生产环境使用）
//!
//! ## 核心特性
//!
//! - **显式主体**：所有命令记录操作显式接收 `Principal`，归属校验在存储层强制
//! - **追加语义**：命令记录只写一次，无更新路径，不被本系统删除
//! - **类型安全**：使用 sqlx 的参数化查询，防止 SQL 注入
//! - **可扩展性**：通过 Trait 接口支持多种存储后端
//!
//! ## 数据模型
//!
//! - **UserRecord**：用户记录（user_id, username, email, password, refresh_jti）
//! - **CommandRecord**：命令记录（id, user_id, timestamp, command, value, area,
//!   address, status, result, created_at, updated_at, owner）
//!
//! ## 设计约束
//!
//! - **禁止直接 SQL**：Handler 层禁止直接写 SQL，统一通过 storage 层
//! - **命令记录 id**：`<epoch_ms>-<随机后缀>`，时间有序，按 id/时间戳排序即按时间排序

pub mod connection;
pub mod error;
pub mod in_memory;
pub mod models;
pub mod postgres;
pub mod traits;
pub mod validation;

pub use connection::connect_pool;
pub use error::StorageError;
pub use in_memory::{InMemoryCommandRecordStore, InMemoryUserStore};
pub use models::{CommandRecord, UserRecord};
pub use postgres::{PgCommandRecordStore, PgUserStore};
pub use traits::{CommandRecordStore, UserStore};
