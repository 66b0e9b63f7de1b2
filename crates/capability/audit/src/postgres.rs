//! Postgres 审计流实现

use crate::store::{AuditPage, AuditStoreError, AuditStreamStore, RawAuditEntry};
use sqlx::{PgPool, Row};

pub struct PgAuditStreamStore {
    pub pool: PgPool,
}

impl PgAuditStreamStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AuditStreamStore for PgAuditStreamStore {
    async fn create_stream(&self, log_group: &str, stream: &str) -> Result<(), AuditStoreError> {
        let result = sqlx::query(
            "insert into audit_streams (log_group, stream_name) values ($1, $2)",
        )
        .bind(log_group)
        .bind(stream)
        .execute(&self.pool)
        .await;
        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(AuditStoreError::StreamAlreadyExists(stream.to_string()))
            }
            Err(err) => Err(AuditStoreError::Store(err.to_string())),
        }
    }

    async fn append(
        &self,
        log_group: &str,
        stream: &str,
        entry: RawAuditEntry,
    ) -> Result<(), AuditStoreError> {
        sqlx::query(
            "insert into audit_entries (log_group, stream_name, ts_ms, message) \
             values ($1, $2, $3, $4)",
        )
        .bind(log_group)
        .bind(stream)
        .bind(entry.ts_ms)
        .bind(&entry.message)
        .execute(&self.pool)
        .await
        .map_err(|err| AuditStoreError::Store(err.to_string()))?;
        Ok(())
    }

    async fn filter(
        &self,
        log_group: &str,
        from_ms: Option<i64>,
        to_ms: Option<i64>,
        limit: i64,
    ) -> Result<AuditPage, AuditStoreError> {
        let rows = sqlx::query(
            "select ts_ms, message from audit_entries \
             where log_group = $1 \
             and ($2::bigint is null or ts_ms >= $2) \
             and ($3::bigint is null or ts_ms <= $3) \
             order by ts_ms asc \
             limit $4",
        )
        .bind(log_group)
        .bind(from_ms)
        .bind(to_ms)
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await
        .map_err(|err| AuditStoreError::Store(err.to_string()))?;
        let entries = rows
            .into_iter()
            .map(|row| RawAuditEntry {
                ts_ms: row.get("ts_ms"),
                message: row.get("message"),
            })
            .collect();
        Ok(AuditPage {
            entries,
            next_token: None,
        })
    }
}
