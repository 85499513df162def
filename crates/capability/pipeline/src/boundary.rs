//! 边界警报：长者出现在 BOUNDARY 网关时建立高严重度警报。
//!
//! 冷却按 (elder, gateway) 独立计算，与一般位置冷却无关。

use crate::PipelineError;
use beacon_storage::{AlertRecord, AlertStore, ElderRecord, GatewayRecord};
use beacon_telemetry::{record_boundary_alert_created, record_boundary_alert_debounced};
use domain::{AlertSeverity, AlertStatus, AlertType, BeaconSignature, Coordinates};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

pub struct BoundaryInput<'a> {
    pub elder: &'a ElderRecord,
    pub gateway: &'a GatewayRecord,
    pub signature: &'a BeaconSignature,
    pub coordinates: Coordinates,
    pub timestamp_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryOutcome {
    Created { alert_id: String },
    /// 冷却期内已有警报。
    Debounced { last_alert_id: String },
}

pub struct BoundaryAlertGenerator {
    alerts: Arc<dyn AlertStore>,
    cooldown_ms: i64,
    scan_limit: usize,
}

impl BoundaryAlertGenerator {
    pub fn new(alerts: Arc<dyn AlertStore>, cooldown_ms: i64, scan_limit: usize) -> Self {
        Self {
            alerts,
            cooldown_ms,
            scan_limit: scan_limit.max(1),
        }
    }

    pub async fn maybe_create(
        &self,
        input: BoundaryInput<'_>,
    ) -> Result<BoundaryOutcome, PipelineError> {
        let recent = self
            .alerts
            .recent_alerts(
                &input.elder.elder_id,
                &input.gateway.gateway_id,
                AlertType::Boundary,
                self.scan_limit,
            )
            .await?;
        if let Some(latest) = recent.iter().max_by_key(|alert| alert.triggered_at_ms) {
            if input.timestamp_ms - latest.triggered_at_ms < self.cooldown_ms {
                record_boundary_alert_debounced();
                debug!(
                    target: "beacon.pipeline",
                    elder_id = %input.elder.elder_id,
                    gateway_id = %input.gateway.gateway_id,
                    last_alert_id = %latest.alert_id,
                    "boundary_alert_debounced"
                );
                return Ok(BoundaryOutcome::Debounced {
                    last_alert_id: latest.alert_id.clone(),
                });
            }
        }

        let record = build_alert(&input);
        let alert = self.alerts.create_alert(record).await?;
        record_boundary_alert_created();
        info!(
            target: "beacon.pipeline",
            alert_id = %alert.alert_id,
            elder_id = %alert.elder_id,
            gateway_id = %alert.gateway_id,
            "boundary_alert_created"
        );
        Ok(BoundaryOutcome::Created {
            alert_id: alert.alert_id,
        })
    }
}

fn build_alert(input: &BoundaryInput<'_>) -> AlertRecord {
    let elder = input.elder;
    let gateway = input.gateway;
    let details = json!({
        "beacon": {
            "uuid": input.signature.uuid,
            "major": input.signature.major,
            "minor": input.signature.minor,
        },
        "gateway": {
            "id": gateway.gateway_id,
            "name": gateway.name,
            "location": gateway.location,
            "type": gateway.gateway_type.as_str(),
            "serialNumber": gateway.serial_number,
        },
    });
    AlertRecord {
        alert_id: uuid::Uuid::new_v4().to_string(),
        tenant_id: elder.tenant_id.clone(),
        elder_id: elder.elder_id.clone(),
        gateway_id: gateway.gateway_id.clone(),
        alert_type: AlertType::Boundary,
        status: AlertStatus::Pending,
        severity: AlertSeverity::High,
        title: format!("邊界警報：{}", elder.name),
        message: format!("{} 出現在邊界點「{}」", elder.name, gateway.name),
        details,
        latitude: input.coordinates.latitude,
        longitude: input.coordinates.longitude,
        triggered_at_ms: input.timestamp_ms,
    }
}
