//! Postgres 网关存储实现
//!
//! 自动注册走 `on conflict do nothing`：同一标识并发注册时只有一条记录落库，
//! 其余请求读回已存在的记录。

use crate::error::StorageError;
use crate::models::GatewayRecord;
use crate::traits::GatewayStore;
use crate::validation::ensure_non_empty;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const GATEWAY_COLUMNS: &str = "gateway_id, serial_number, mac_address, imei, name, location, \
     gateway_type, latitude, longitude, tenant_id, is_active, created_at_ms";

pub struct PgGatewayStore {
    pub pool: PgPool,
}

impl PgGatewayStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 通过数据库 URL 建立连接池
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        Ok(Self { pool })
    }

    async fn find_active_by(
        &self,
        column: &'static str,
        value: &str,
    ) -> Result<Option<GatewayRecord>, StorageError> {
        let sql = format!(
            "select {GATEWAY_COLUMNS} from gateways \
             where {column} = $1 and is_active = true \
             order by created_at_ms asc limit 1"
        );
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| gateway_from_row(&row)).transpose()
    }
}

fn gateway_from_row(row: &PgRow) -> Result<GatewayRecord, StorageError> {
    let gateway_type: String = row.try_get("gateway_type")?;
    Ok(GatewayRecord {
        gateway_id: row.try_get("gateway_id")?,
        serial_number: row.try_get("serial_number")?,
        mac_address: row.try_get("mac_address")?,
        imei: row.try_get("imei")?,
        name: row.try_get("name")?,
        location: row.try_get("location")?,
        gateway_type: gateway_type.parse()?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        tenant_id: row.try_get("tenant_id")?,
        is_active: row.try_get("is_active")?,
        created_at_ms: row.try_get("created_at_ms")?,
    })
}

#[async_trait::async_trait]
impl GatewayStore for PgGatewayStore {
    async fn find_active_by_mac(&self, mac: &str) -> Result<Option<GatewayRecord>, StorageError> {
        self.find_active_by("mac_address", mac).await
    }

    async fn find_active_by_imei(
        &self,
        imei: &str,
    ) -> Result<Option<GatewayRecord>, StorageError> {
        self.find_active_by("imei", imei).await
    }

    async fn find_active_by_serial(
        &self,
        serial_number: &str,
    ) -> Result<Option<GatewayRecord>, StorageError> {
        self.find_active_by("serial_number", serial_number).await
    }

    async fn find_gateway(&self, gateway_id: &str) -> Result<Option<GatewayRecord>, StorageError> {
        let sql = format!("select {GATEWAY_COLUMNS} from gateways where gateway_id = $1");
        let row = sqlx::query(&sql)
            .bind(gateway_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| gateway_from_row(&row)).transpose()
    }

    async fn insert_gateway_if_absent(
        &self,
        record: GatewayRecord,
    ) -> Result<(GatewayRecord, bool), StorageError> {
        ensure_non_empty("gateway_id", &record.gateway_id)?;
        let result = sqlx::query(
            "insert into gateways (gateway_id, serial_number, mac_address, imei, name, location, \
             gateway_type, latitude, longitude, tenant_id, is_active, created_at_ms) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             on conflict (gateway_id) do nothing",
        )
        .bind(&record.gateway_id)
        .bind(&record.serial_number)
        .bind(&record.mac_address)
        .bind(&record.imei)
        .bind(&record.name)
        .bind(&record.location)
        .bind(record.gateway_type.as_str())
        .bind(record.latitude)
        .bind(record.longitude)
        .bind(&record.tenant_id)
        .bind(record.is_active)
        .bind(record.created_at_ms)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() > 0 {
            return Ok((record, true));
        }
        match self.find_gateway(&record.gateway_id).await? {
            Some(existing) => Ok((existing, false)),
            None => Err(StorageError::new("gateway insert conflict")),
        }
    }
}
