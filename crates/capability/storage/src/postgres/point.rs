//! Postgres 通知点存储实现

use crate::error::StorageError;
use crate::models::NotificationPointRecord;
use crate::traits::NotificationPointStore;
use crate::validation::ensure_non_empty;
use sqlx::{PgPool, Row};

pub struct PgNotificationPointStore {
    pub pool: PgPool,
}

impl PgNotificationPointStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl NotificationPointStore for PgNotificationPointStore {
    async fn list_active_points(
        &self,
        owner_id: &str,
        gateway_id: &str,
    ) -> Result<Vec<NotificationPointRecord>, StorageError> {
        let rows = sqlx::query(
            "select point_id, owner_id, gateway_id, name, message, is_active \
             from notification_points \
             where owner_id = $1 and gateway_id = $2 and is_active = true \
             order by point_id",
        )
        .bind(owner_id)
        .bind(gateway_id)
        .fetch_all(&self.pool)
        .await?;
        let mut points = Vec::with_capacity(rows.len());
        for row in rows {
            points.push(NotificationPointRecord {
                point_id: row.try_get("point_id")?,
                owner_id: row.try_get("owner_id")?,
                gateway_id: row.try_get("gateway_id")?,
                name: row.try_get("name")?,
                message: row.try_get("message")?,
                is_active: row.try_get("is_active")?,
            });
        }
        Ok(points)
    }

    async fn create_point(
        &self,
        record: NotificationPointRecord,
    ) -> Result<NotificationPointRecord, StorageError> {
        ensure_non_empty("point_id", &record.point_id)?;
        ensure_non_empty("owner_id", &record.owner_id)?;
        ensure_non_empty("gateway_id", &record.gateway_id)?;
        sqlx::query(
            "insert into notification_points (point_id, owner_id, gateway_id, name, message, is_active) \
             values ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&record.point_id)
        .bind(&record.owner_id)
        .bind(&record.gateway_id)
        .bind(&record.name)
        .bind(&record.message)
        .bind(record.is_active)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }
}
