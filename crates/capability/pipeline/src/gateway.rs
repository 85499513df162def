//! 网关解析与自动注册。

use crate::PipelineError;
use beacon_storage::{GatewayRecord, GatewayStore};
use beacon_telemetry::record_gateway_registered;
use domain::{Coordinates, GatewayType};
use std::sync::Arc;
use tracing::{debug, info};

/// 上报标识的类别（只用于自动注册时决定写入哪个字段）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Mac,
    Imei,
    Serial,
}

/// 含冒号视为 MAC；否则长度 ≥ 10 视为 IMEI；其余只作序号。
pub fn classify_identifier(identifier: &str) -> IdentifierKind {
    if identifier.contains(':') {
        IdentifierKind::Mac
    } else if identifier.chars().count() >= 10 {
        IdentifierKind::Imei
    } else {
        IdentifierKind::Serial
    }
}

/// 自动注册网关的稳定 ID：同一标识并发注册时收敛到同一条记录。
pub fn auto_gateway_id(identifier: &str) -> String {
    registration_id(identifier, 0)
}

/// 第 `generation` 代自动注册 ID；上一代已停用时顺延，停用的记录不复用。
fn registration_id(identifier: &str, generation: u32) -> String {
    let name = if generation == 0 {
        format!("beacon-gateway:{identifier}")
    } else {
        format!("beacon-gateway:{identifier}#{generation}")
    };
    uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_URL, name.as_bytes()).to_string()
}

const MAX_REGISTRATION_GENERATIONS: u32 = 16;

pub struct GatewayResolver {
    store: Arc<dyn GatewayStore>,
}

impl GatewayResolver {
    pub fn new(store: Arc<dyn GatewayStore>) -> Self {
        Self { store }
    }

    /// 依 MAC → IMEI → 序号 查找启用中的网关；都未命中则自动注册。
    pub async fn resolve(
        &self,
        identifier: &str,
        reported: Option<Coordinates>,
        now_ms: i64,
    ) -> Result<GatewayRecord, PipelineError> {
        if let Some(gateway) = self.store.find_active_by_mac(identifier).await? {
            return Ok(gateway);
        }
        if let Some(gateway) = self.store.find_active_by_imei(identifier).await? {
            return Ok(gateway);
        }
        if let Some(gateway) = self.store.find_active_by_serial(identifier).await? {
            return Ok(gateway);
        }

        let kind = classify_identifier(identifier);
        for generation in 0..MAX_REGISTRATION_GENERATIONS {
            let record = GatewayRecord {
                gateway_id: registration_id(identifier, generation),
                serial_number: identifier.to_string(),
                mac_address: (kind == IdentifierKind::Mac).then(|| identifier.to_string()),
                imei: (kind == IdentifierKind::Imei).then(|| identifier.to_string()),
                name: format!("未註冊網關 {identifier}"),
                location: None,
                gateway_type: GatewayType::Mobile,
                latitude: reported.map(|coordinates| coordinates.latitude),
                longitude: reported.map(|coordinates| coordinates.longitude),
                tenant_id: None,
                is_active: true,
                created_at_ms: now_ms,
            };
            let (gateway, created) = self.store.insert_gateway_if_absent(record).await?;
            if created {
                record_gateway_registered();
                info!(
                    target: "beacon.pipeline",
                    gateway_id = %gateway.gateway_id,
                    identifier = %identifier,
                    kind = ?kind,
                    generation,
                    "gateway_auto_registered"
                );
            }
            if gateway.is_active {
                return Ok(gateway);
            }
            debug!(
                target: "beacon.pipeline",
                gateway_id = %gateway.gateway_id,
                identifier = %identifier,
                "retired_gateway_skipped"
            );
        }
        Err(PipelineError::Registration(identifier.to_string()))
    }
}
