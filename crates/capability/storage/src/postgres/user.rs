//! Postgres 用户存储实现

use crate::connection::connect_pool;
use crate::error::StorageError;
use crate::models::UserRecord;
use crate::traits::UserStore;
use sqlx::{PgPool, Row};

pub struct PgUserStore {
    pub pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 直接从数据库 URL 建立连接池并创建存储
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = connect_pool(database_url).await?;
        Ok(Self::new(pool))
    }
}

#[async_trait::async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StorageError> {
        let row = sqlx::query(
            "select user_id, username, email, password, refresh_jti \
             from users where username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|row| UserRecord {
            user_id: row.get("user_id"),
            username: row.get("username"),
            email: row.get("email"),
            password: row.get("password"),
            refresh_jti: row.get("refresh_jti"),
        }))
    }

    async fn update_password_hash(
        &self,
        user_id: &str,
        password_hash: &str,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query("update users set password = $2 where user_id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_refresh_jti(
        &self,
        user_id: &str,
        jti: Option<&str>,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query("update users set refresh_jti = $2 where user_id = $1")
            .bind(user_id)
            .bind(jti)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_refresh_jti(&self, user_id: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("select refresh_jti from users where user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.and_then(|row| row.get::<Option<String>, _>("refresh_jti")))
    }
}
