//! Postgres 错误日志存储实现

use crate::error::StorageError;
use crate::models::ErrorLogRecord;
use crate::postgres::{parse_json, sql_limit};
use crate::traits::ErrorLogStore;
use sqlx::{PgPool, Row};

pub struct PgErrorLogStore {
    pub pool: PgPool,
}

impl PgErrorLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ErrorLogStore for PgErrorLogStore {
    async fn create_error_log(&self, record: ErrorLogRecord) -> Result<(), StorageError> {
        let payload = serde_json::to_string(&record.payload)?;
        sqlx::query(
            "insert into error_logs (log_id, source, message, payload, request_id, created_at_ms) \
             values ($1, $2, $3, $4::jsonb, $5, $6)",
        )
        .bind(&record.log_id)
        .bind(&record.source)
        .bind(&record.message)
        .bind(payload)
        .bind(&record.request_id)
        .bind(record.created_at_ms)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_error_logs(&self, limit: usize) -> Result<Vec<ErrorLogRecord>, StorageError> {
        let rows = sqlx::query(
            "select log_id, source, message, payload::text as payload, request_id, created_at_ms \
             from error_logs order by created_at_ms desc limit $1",
        )
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;
        let mut logs = Vec::with_capacity(rows.len());
        for row in rows {
            logs.push(ErrorLogRecord {
                log_id: row.try_get("log_id")?,
                source: row.try_get("source")?,
                message: row.try_get("message")?,
                payload: parse_json(row.try_get("payload")?)?,
                request_id: row.try_get("request_id")?,
                created_at_ms: row.try_get("created_at_ms")?,
            });
        }
        Ok(logs)
    }
}
