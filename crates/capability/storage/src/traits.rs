//! 存储接口 Trait 定义
//!
//! 定义所有资源存储的异步接口：
//! - UserStore：用户存储
//! - CommandRecordStore：命令记录存储
//!
//! 设计原则：
//! - 命令记录接口显式接收 Principal
//! - 所有接口返回 StorageError
//! - 使用 async_trait 支持动态分发

use crate::error::StorageError;
use crate::models::{CommandRecord, UserRecord};
use async_trait::async_trait;
use domain::Principal;

/// 用户存储接口
///
/// 提供用户查询和 token 轮换状态维护（禁止在 handler 中直接连 SQL）。
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 根据用户名查找用户
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StorageError>;

    /// 更新口令哈希（旧格式登录成功后升级）
    async fn update_password_hash(
        &self,
        user_id: &str,
        password_hash: &str,
    ) -> Result<bool, StorageError>;

    /// 绑定/轮换 refresh token jti
    async fn set_refresh_jti(
        &self,
        user_id: &str,
        jti: Option<&str>,
    ) -> Result<bool, StorageError>;

    /// 读取当前绑定的 refresh token jti
    async fn get_refresh_jti(&self, user_id: &str) -> Result<Option<String>, StorageError>;
}

/// 命令记录存储接口
///
/// 单次写入、按 id 键控；该记录类型没有原地更新路径。
#[async_trait]
pub trait CommandRecordStore: Send + Sync {
    /// 写入命令记录（追加语义）
    async fn create_command_record(
        &self,
        principal: &Principal,
        record: CommandRecord,
    ) -> Result<CommandRecord, StorageError>;

    /// 列出请求主体自己的命令记录（时间倒序）
    async fn list_command_records(
        &self,
        principal: &Principal,
        limit: i64,
    ) -> Result<Vec<CommandRecord>, StorageError>;
}
