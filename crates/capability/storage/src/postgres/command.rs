//! Postgres 命令记录实现

use crate::error::StorageError;
use crate::models::CommandRecord;
use crate::traits::CommandRecordStore;
use crate::validation::{ensure_owner, ensure_principal};
use domain::Principal;
use sqlx::{PgPool, Row};

pub struct PgCommandRecordStore {
    pub pool: PgPool,
}

impl PgCommandRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CommandRecordStore for PgCommandRecordStore {
    async fn create_command_record(
        &self,
        principal: &Principal,
        record: CommandRecord,
    ) -> Result<CommandRecord, StorageError> {
        ensure_owner(principal, &record)?;
        sqlx::query(
            "insert into command_records \
             (id, user_id, ts, command, value, area, address, status, result, \
              created_at, updated_at, owner) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.timestamp)
        .bind(&record.command)
        .bind(&record.value)
        .bind(&record.area)
        .bind(&record.address)
        .bind(&record.status)
        .bind(&record.result)
        .bind(&record.created_at)
        .bind(&record.updated_at)
        .bind(&record.owner)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    async fn list_command_records(
        &self,
        principal: &Principal,
        limit: i64,
    ) -> Result<Vec<CommandRecord>, StorageError> {
        ensure_principal(principal)?;
        let rows = sqlx::query(
            "select id, user_id, ts, command, value, area, address, status, result, \
             created_at, updated_at, owner \
             from command_records \
             where owner = $1 \
             order by ts desc \
             limit $2",
        )
        .bind(&principal.user_id)
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(CommandRecord {
                id: row.get("id"),
                user_id: row.get("user_id"),
                timestamp: row.get("ts"),
                command: row.get("command"),
                value: row.get("value"),
                area: row.get("area"),
                address: row.get("address"),
                status: row.get("status"),
                result: row.get("result"),
                created_at: row.get("created_at"),
                updated_at: row.get("updated_at"),
                owner: row.get("owner"),
            });
        }
        Ok(items)
    }
}
