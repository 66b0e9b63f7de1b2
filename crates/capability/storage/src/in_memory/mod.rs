//! 内存存储实现模块
//!
//! 仅用于本地演示和测试。
//!
//! 包含以下实现：
//! - UserStore: InMemoryUserStore
//! - CommandRecordStore: InMemoryCommandRecordStore

pub mod command;
pub mod user;

pub use command::*;
pub use user::*;
