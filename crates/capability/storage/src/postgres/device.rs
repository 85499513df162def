//! Postgres 信标设备存储实现

use crate::error::StorageError;
use crate::models::{DeviceRecord, PresenceUpdate};
use crate::traits::DeviceStore;
use crate::validation::{ensure_non_empty, to_u16};
use domain::Binding;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const DEVICE_COLUMNS: &str = "device_id, uuid, major, minor, is_active, binding_type, bound_to, \
     bound_at_ms, last_seen_ms, last_rssi, battery_level";

pub struct PgDeviceStore {
    pub pool: PgPool,
}

impl PgDeviceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn device_from_row(row: &PgRow) -> Result<DeviceRecord, StorageError> {
    let binding_type: String = row.try_get("binding_type")?;
    let bound_to: Option<String> = row.try_get("bound_to")?;
    let battery_level: Option<i16> = row.try_get("battery_level")?;
    Ok(DeviceRecord {
        device_id: row.try_get("device_id")?,
        uuid: row.try_get("uuid")?,
        major: to_u16("major", row.try_get("major")?)?,
        minor: to_u16("minor", row.try_get("minor")?)?,
        is_active: row.try_get("is_active")?,
        binding: Binding::from_parts(&binding_type, bound_to.as_deref()),
        bound_at_ms: row.try_get("bound_at_ms")?,
        last_seen_ms: row.try_get("last_seen_ms")?,
        last_rssi: row.try_get("last_rssi")?,
        battery_level: battery_level.and_then(|value| u8::try_from(value).ok()),
    })
}

#[async_trait::async_trait]
impl DeviceStore for PgDeviceStore {
    async fn find_active_by_signature(
        &self,
        uuid: &str,
        major: u16,
        minor: u16,
    ) -> Result<Option<DeviceRecord>, StorageError> {
        let sql = format!(
            "select {DEVICE_COLUMNS} from devices \
             where lower(uuid) = lower($1) and major = $2 and minor = $3 and is_active = true \
             limit 1"
        );
        let row = sqlx::query(&sql)
            .bind(uuid)
            .bind(i32::from(major))
            .bind(i32::from(minor))
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| device_from_row(&row)).transpose()
    }

    async fn find_device(&self, device_id: &str) -> Result<Option<DeviceRecord>, StorageError> {
        let sql = format!("select {DEVICE_COLUMNS} from devices where device_id = $1");
        let row = sqlx::query(&sql)
            .bind(device_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| device_from_row(&row)).transpose()
    }

    async fn create_device(&self, record: DeviceRecord) -> Result<DeviceRecord, StorageError> {
        ensure_non_empty("device_id", &record.device_id)?;
        ensure_non_empty("uuid", &record.uuid)?;
        sqlx::query(
            "insert into devices (device_id, uuid, major, minor, is_active, binding_type, \
             bound_to, bound_at_ms, last_seen_ms, last_rssi, battery_level) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(&record.device_id)
        .bind(&record.uuid)
        .bind(i32::from(record.major))
        .bind(i32::from(record.minor))
        .bind(record.is_active)
        .bind(record.binding.binding_type())
        .bind(record.binding.bound_to())
        .bind(record.bound_at_ms)
        .bind(record.last_seen_ms)
        .bind(record.last_rssi)
        .bind(record.battery_level.map(i16::from))
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    async fn touch_presence(
        &self,
        device_id: &str,
        presence: PresenceUpdate,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query(
            "update devices set \
             last_seen_ms = $1, \
             last_rssi = $2, \
             battery_level = coalesce($3, battery_level) \
             where device_id = $4",
        )
        .bind(presence.last_seen_ms)
        .bind(presence.last_rssi)
        .bind(presence.battery_level.map(i16::from))
        .bind(device_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
