//! PostgreSQL 存储实现模块
//!
//! 生产环境使用。所有查询均为参数化查询。
//!
//! 包含以下实现：
//! - UserStore: PgUserStore
//! - CommandRecordStore: PgCommandRecordStore

pub mod command;
pub mod user;

pub use command::*;
pub use user::*;
