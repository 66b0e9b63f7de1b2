//! 用户存储内存实现
//!
//! 仅用于本地测试和占位。

use crate::error::StorageError;
use crate::models::UserRecord;
use crate::traits::UserStore;
use std::sync::RwLock;

/// 用户内存存储
pub struct InMemoryUserStore {
    users: RwLock<Vec<UserRecord>>,
}

impl InMemoryUserStore {
    /// 创建空的用户存储
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
        }
    }

    /// 创建带默认操作员账户的存储（本地演示用）
    ///
    /// 默认口令为旧格式明文，首次登录成功后自动升级为 argon2 哈希。
    pub fn with_default_operator() -> Self {
        Self {
            users: RwLock::new(vec![UserRecord {
                user_id: "operator".to_string(),
                username: "operator".to_string(),
                email: "operator@example.com".to_string(),
                password: "operator123".to_string(),
                refresh_jti: None,
            }]),
        }
    }

    /// 插入用户（测试用）
    pub fn insert(&self, record: UserRecord) -> Result<(), StorageError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        users.push(record);
        Ok(())
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StorageError> {
        let users = self
            .users
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(users.iter().find(|user| user.username == username).cloned())
    }

    async fn update_password_hash(
        &self,
        user_id: &str,
        password_hash: &str,
    ) -> Result<bool, StorageError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        for user in users.iter_mut() {
            if user.user_id == user_id {
                user.password = password_hash.to_string();
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn set_refresh_jti(
        &self,
        user_id: &str,
        jti: Option<&str>,
    ) -> Result<bool, StorageError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        for user in users.iter_mut() {
            if user.user_id == user_id {
                user.refresh_jti = jti.map(|value| value.to_string());
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn get_refresh_jti(&self, user_id: &str) -> Result<Option<String>, StorageError> {
        let users = self
            .users
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(users
            .iter()
            .find(|user| user.user_id == user_id)
            .and_then(|user| user.refresh_jti.clone()))
    }
}
