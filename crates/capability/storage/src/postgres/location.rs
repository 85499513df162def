//! Postgres 冷却状态（最新位置）存储实现

use crate::error::StorageError;
use crate::models::LocationStateRecord;
use crate::traits::LocationStateStore;
use crate::validation::ensure_non_empty;
use sqlx::{PgPool, Row};

pub struct PgLocationStateStore {
    pub pool: PgPool,
}

impl PgLocationStateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl LocationStateStore for PgLocationStateStore {
    async fn get_state(&self, subject: &str) -> Result<Option<LocationStateRecord>, StorageError> {
        let row = sqlx::query(
            "select subject, gateway_id, gateway_name, latitude, longitude, timestamp_ms \
             from location_states where subject = $1",
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(LocationStateRecord {
            subject: row.try_get("subject")?,
            gateway_id: row.try_get("gateway_id")?,
            gateway_name: row.try_get("gateway_name")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            timestamp_ms: row.try_get("timestamp_ms")?,
        }))
    }

    async fn save_state(&self, state: &LocationStateRecord) -> Result<bool, StorageError> {
        ensure_non_empty("subject", &state.subject)?;
        // 条件 upsert：库中时间戳更新时不覆盖
        let result = sqlx::query(
            "insert into location_states (subject, gateway_id, gateway_name, latitude, longitude, timestamp_ms) \
             values ($1, $2, $3, $4, $5, $6) \
             on conflict (subject) do update set \
             gateway_id = excluded.gateway_id, \
             gateway_name = excluded.gateway_name, \
             latitude = excluded.latitude, \
             longitude = excluded.longitude, \
             timestamp_ms = excluded.timestamp_ms \
             where location_states.timestamp_ms <= excluded.timestamp_ms",
        )
        .bind(&state.subject)
        .bind(&state.gateway_id)
        .bind(&state.gateway_name)
        .bind(state.latitude)
        .bind(state.longitude)
        .bind(state.timestamp_ms)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
