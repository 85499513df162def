//! Postgres 设备活动存储实现（只追加，无 update/delete）

use crate::error::StorageError;
use crate::models::ActivityRecord;
use crate::postgres::{parse_json, sql_limit};
use crate::traits::ActivityStore;
use crate::validation::ensure_non_empty;
use domain::{Binding, NotificationChannel};
use sqlx::{PgPool, Row};

pub struct PgActivityStore {
    pub pool: PgPool,
}

impl PgActivityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ActivityStore for PgActivityStore {
    async fn append_activity(&self, record: ActivityRecord) -> Result<(), StorageError> {
        ensure_non_empty("activity_id", &record.activity_id)?;
        ensure_non_empty("device_id", &record.device_id)?;
        let details = serde_json::to_string(&record.details)?;
        sqlx::query(
            "insert into device_activities (activity_id, device_id, timestamp_ms, gateway_id, \
             gateway_name, gateway_type, latitude, longitude, rssi, binding_type, bound_to, \
             triggered_notification, notification_type, notification_point_id, details) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15::jsonb)",
        )
        .bind(&record.activity_id)
        .bind(&record.device_id)
        .bind(record.timestamp_ms)
        .bind(&record.gateway_id)
        .bind(&record.gateway_name)
        .bind(record.gateway_type.as_str())
        .bind(record.latitude)
        .bind(record.longitude)
        .bind(record.rssi)
        .bind(record.binding.binding_type())
        .bind(record.binding.bound_to())
        .bind(record.triggered_notification)
        .bind(record.notification_type.map(|channel| channel.as_str()))
        .bind(&record.notification_point_id)
        .bind(details)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_activities(
        &self,
        device_id: &str,
        limit: usize,
    ) -> Result<Vec<ActivityRecord>, StorageError> {
        let rows = sqlx::query(
            "select activity_id, device_id, timestamp_ms, gateway_id, gateway_name, gateway_type, \
             latitude, longitude, rssi, binding_type, bound_to, triggered_notification, \
             notification_type, notification_point_id, details::text as details \
             from device_activities where device_id = $1 \
             order by timestamp_ms desc limit $2",
        )
        .bind(device_id)
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;
        let mut activities = Vec::with_capacity(rows.len());
        for row in rows {
            let gateway_type: String = row.try_get("gateway_type")?;
            let binding_type: String = row.try_get("binding_type")?;
            let bound_to: Option<String> = row.try_get("bound_to")?;
            let notification_type: Option<String> = row.try_get("notification_type")?;
            activities.push(ActivityRecord {
                activity_id: row.try_get("activity_id")?,
                device_id: row.try_get("device_id")?,
                timestamp_ms: row.try_get("timestamp_ms")?,
                gateway_id: row.try_get("gateway_id")?,
                gateway_name: row.try_get("gateway_name")?,
                gateway_type: gateway_type.parse()?,
                latitude: row.try_get("latitude")?,
                longitude: row.try_get("longitude")?,
                rssi: row.try_get("rssi")?,
                binding: Binding::from_parts(&binding_type, bound_to.as_deref()),
                triggered_notification: row.try_get("triggered_notification")?,
                notification_type: notification_type
                    .map(|value| value.parse::<NotificationChannel>())
                    .transpose()?,
                notification_point_id: row.try_get("notification_point_id")?,
                details: parse_json(row.try_get("details")?)?,
            });
        }
        Ok(activities)
    }
}
