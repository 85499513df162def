//! Postgres 通知对象存储：长者、租户（含成员）、地图 App 用户。

use crate::error::StorageError;
use crate::models::{ElderRecord, MapUserRecord, TenantMemberRecord, TenantRecord};
use crate::traits::{ElderStore, MapUserStore, TenantStore};
use crate::validation::ensure_non_empty;
use sqlx::{PgPool, Row};

pub struct PgElderStore {
    pub pool: PgPool,
}

impl PgElderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ElderStore for PgElderStore {
    async fn find_elder(&self, elder_id: &str) -> Result<Option<ElderRecord>, StorageError> {
        let row = sqlx::query(
            "select elder_id, tenant_id, name, phone from elders where elder_id = $1",
        )
        .bind(elder_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(ElderRecord {
            elder_id: row.try_get("elder_id")?,
            tenant_id: row.try_get("tenant_id")?,
            name: row.try_get("name")?,
            phone: row.try_get("phone")?,
        }))
    }

    async fn create_elder(&self, record: ElderRecord) -> Result<ElderRecord, StorageError> {
        ensure_non_empty("elder_id", &record.elder_id)?;
        ensure_non_empty("tenant_id", &record.tenant_id)?;
        sqlx::query("insert into elders (elder_id, tenant_id, name, phone) values ($1, $2, $3, $4)")
            .bind(&record.elder_id)
            .bind(&record.tenant_id)
            .bind(&record.name)
            .bind(&record.phone)
            .execute(&self.pool)
            .await?;
        Ok(record)
    }
}

pub struct PgTenantStore {
    pub pool: PgPool,
}

impl PgTenantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl TenantStore for PgTenantStore {
    async fn find_tenant(&self, tenant_id: &str) -> Result<Option<TenantRecord>, StorageError> {
        let row = sqlx::query(
            "select tenant_id, name, line_channel_access_token from tenants where tenant_id = $1",
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(TenantRecord {
            tenant_id: row.try_get("tenant_id")?,
            name: row.try_get("name")?,
            line_channel_access_token: row.try_get("line_channel_access_token")?,
        }))
    }

    async fn create_tenant(&self, record: TenantRecord) -> Result<TenantRecord, StorageError> {
        ensure_non_empty("tenant_id", &record.tenant_id)?;
        sqlx::query(
            "insert into tenants (tenant_id, name, line_channel_access_token) values ($1, $2, $3)",
        )
        .bind(&record.tenant_id)
        .bind(&record.name)
        .bind(&record.line_channel_access_token)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    async fn list_members(
        &self,
        tenant_id: &str,
    ) -> Result<Vec<TenantMemberRecord>, StorageError> {
        let rows = sqlx::query(
            "select tenant_id, member_id, name, status, line_user_id \
             from tenant_members where tenant_id = $1 order by member_id",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        let mut members = Vec::with_capacity(rows.len());
        for row in rows {
            let status: String = row.try_get("status")?;
            members.push(TenantMemberRecord {
                tenant_id: row.try_get("tenant_id")?,
                member_id: row.try_get("member_id")?,
                name: row.try_get("name")?,
                status: status.parse()?,
                line_user_id: row.try_get("line_user_id")?,
            });
        }
        Ok(members)
    }

    async fn add_member(
        &self,
        record: TenantMemberRecord,
    ) -> Result<TenantMemberRecord, StorageError> {
        ensure_non_empty("tenant_id", &record.tenant_id)?;
        ensure_non_empty("member_id", &record.member_id)?;
        sqlx::query(
            "insert into tenant_members (tenant_id, member_id, name, status, line_user_id) \
             values ($1, $2, $3, $4, $5)",
        )
        .bind(&record.tenant_id)
        .bind(&record.member_id)
        .bind(&record.name)
        .bind(record.status.as_str())
        .bind(&record.line_user_id)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }
}

pub struct PgMapUserStore {
    pub pool: PgPool,
}

impl PgMapUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MapUserStore for PgMapUserStore {
    async fn find_map_user(&self, user_id: &str) -> Result<Option<MapUserRecord>, StorageError> {
        let row = sqlx::query(
            "select user_id, name, fcm_token, notification_enabled, bound_device_id \
             from map_users where user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(MapUserRecord {
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            fcm_token: row.try_get("fcm_token")?,
            notification_enabled: row.try_get("notification_enabled")?,
            bound_device_id: row.try_get("bound_device_id")?,
        }))
    }

    async fn create_map_user(&self, record: MapUserRecord) -> Result<MapUserRecord, StorageError> {
        ensure_non_empty("user_id", &record.user_id)?;
        sqlx::query(
            "insert into map_users (user_id, name, fcm_token, notification_enabled, bound_device_id) \
             values ($1, $2, $3, $4, $5)",
        )
        .bind(&record.user_id)
        .bind(&record.name)
        .bind(&record.fcm_token)
        .bind(record.notification_enabled)
        .bind(&record.bound_device_id)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }
}
