//! Postgres 警报存储实现

use crate::error::StorageError;
use crate::models::AlertRecord;
use crate::postgres::{parse_json, sql_limit};
use crate::traits::AlertStore;
use crate::validation::ensure_non_empty;
use domain::AlertType;
use sqlx::{PgPool, Row};

pub struct PgAlertStore {
    pub pool: PgPool,
}

impl PgAlertStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AlertStore for PgAlertStore {
    async fn recent_alerts(
        &self,
        elder_id: &str,
        gateway_id: &str,
        alert_type: AlertType,
        limit: usize,
    ) -> Result<Vec<AlertRecord>, StorageError> {
        let rows = sqlx::query(
            "select alert_id, tenant_id, elder_id, gateway_id, alert_type, status, severity, \
             title, message, details::text as details, latitude, longitude, triggered_at_ms \
             from alerts \
             where elder_id = $1 and gateway_id = $2 and alert_type = $3 \
             order by triggered_at_ms desc limit $4",
        )
        .bind(elder_id)
        .bind(gateway_id)
        .bind(alert_type.as_str())
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;
        let mut alerts = Vec::with_capacity(rows.len());
        for row in rows {
            let alert_type: String = row.try_get("alert_type")?;
            let status: String = row.try_get("status")?;
            let severity: String = row.try_get("severity")?;
            alerts.push(AlertRecord {
                alert_id: row.try_get("alert_id")?,
                tenant_id: row.try_get("tenant_id")?,
                elder_id: row.try_get("elder_id")?,
                gateway_id: row.try_get("gateway_id")?,
                alert_type: alert_type.parse()?,
                status: status.parse()?,
                severity: severity.parse()?,
                title: row.try_get("title")?,
                message: row.try_get("message")?,
                details: parse_json(row.try_get("details")?)?,
                latitude: row.try_get("latitude")?,
                longitude: row.try_get("longitude")?,
                triggered_at_ms: row.try_get("triggered_at_ms")?,
            });
        }
        Ok(alerts)
    }

    async fn create_alert(&self, record: AlertRecord) -> Result<AlertRecord, StorageError> {
        ensure_non_empty("alert_id", &record.alert_id)?;
        let details = serde_json::to_string(&record.details)?;
        sqlx::query(
            "insert into alerts (alert_id, tenant_id, elder_id, gateway_id, alert_type, status, \
             severity, title, message, details, latitude, longitude, triggered_at_ms) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10::jsonb, $11, $12, $13)",
        )
        .bind(&record.alert_id)
        .bind(&record.tenant_id)
        .bind(&record.elder_id)
        .bind(&record.gateway_id)
        .bind(record.alert_type.as_str())
        .bind(record.status.as_str())
        .bind(record.severity.as_str())
        .bind(&record.title)
        .bind(&record.message)
        .bind(details)
        .bind(record.latitude)
        .bind(record.longitude)
        .bind(record.triggered_at_ms)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }
}
