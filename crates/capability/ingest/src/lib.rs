//! 网关上报批次的校验与处理接口。
//!
//! HTTP 层只负责反序列化（数值字段允许以字符串上报）；本模块把
//! [`IngestRequest`] 校验为领域层的 [`SightingBatch`]，再交给 [`BatchHandler`]。

use api_contract::{BeaconDto, IngestRequest};
use async_trait::async_trait;
use domain::{BeaconSighting, BeaconSignature, Coordinates, SightingBatch};

/// 接入错误。
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// 请求内容不合法（400），不产生任何写入。
    #[error("{0}")]
    Validation(String),
    /// 处理过程中的基础设施错误（500）。
    #[error("handler error: {0}")]
    Handler(String),
}

/// 一个批次的处理统计。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub received: usize,
    pub updated: usize,
    pub ignored: usize,
    pub failed: usize,
}

/// 批次处理器。
#[async_trait]
pub trait BatchHandler: Send + Sync {
    async fn handle(&self, batch: SightingBatch) -> Result<BatchSummary, IngestError>;
}

/// 占位处理器：只计数，不做任何处理（用于接线与测试）。
#[derive(Debug, Default)]
pub struct NoopBatchHandler;

#[async_trait]
impl BatchHandler for NoopBatchHandler {
    async fn handle(&self, batch: SightingBatch) -> Result<BatchSummary, IngestError> {
        Ok(BatchSummary {
            received: batch.sightings.len(),
            ignored: batch.sightings.len(),
            ..BatchSummary::default()
        })
    }
}

/// 校验上报请求并转换为领域批次。
///
/// 经纬度须同时出现才视为有上报坐标；只有其一时忽略该坐标。
pub fn validate_request(request: IngestRequest) -> Result<SightingBatch, IngestError> {
    let gateway_identifier = request.gateway_id.trim().to_string();
    if gateway_identifier.is_empty() {
        return Err(invalid("gateway_id is required"));
    }
    if let Some(lat) = request.lat {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(invalid("lat must be between -90 and 90"));
        }
    }
    if let Some(lng) = request.lng {
        if !(-180.0..=180.0).contains(&lng) {
            return Err(invalid("lng must be between -180 and 180"));
        }
    }
    let reported = match (request.lat, request.lng) {
        (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
        _ => None,
    };
    if !request.timestamp.is_finite() || request.timestamp <= 0.0 {
        return Err(invalid("timestamp must be a positive epoch millisecond value"));
    }
    if request.timestamp > i64::MAX as f64 {
        return Err(invalid("timestamp out of range"));
    }
    let timestamp_ms = request.timestamp.trunc() as i64;

    let sightings = request
        .beacons
        .iter()
        .enumerate()
        .map(|(index, beacon)| validate_beacon(index, beacon))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SightingBatch {
        gateway_identifier,
        reported,
        timestamp_ms,
        sightings,
    })
}

fn validate_beacon(index: usize, beacon: &BeaconDto) -> Result<BeaconSighting, IngestError> {
    let uuid = beacon.uuid.trim();
    if uuid.is_empty() {
        return Err(invalid(format!("beacons[{index}].uuid is required")));
    }
    let major = to_u16(beacon.major)
        .ok_or_else(|| invalid(format!("beacons[{index}].major must be an integer in 0..=65535")))?;
    let minor = to_u16(beacon.minor)
        .ok_or_else(|| invalid(format!("beacons[{index}].minor must be an integer in 0..=65535")))?;
    if !(-200.0..=50.0).contains(&beacon.rssi) {
        return Err(invalid(format!("beacons[{index}].rssi out of range")));
    }
    let battery_level = match beacon.battery_level {
        None => None,
        Some(level) if (0.0..=100.0).contains(&level) => Some(level.round() as u8),
        Some(_) => {
            return Err(invalid(format!(
                "beacons[{index}].batteryLevel must be between 0 and 100"
            )));
        }
    };
    Ok(BeaconSighting {
        signature: BeaconSignature::new(uuid, major, minor),
        rssi: beacon.rssi.round() as i32,
        battery_level,
    })
}

fn to_u16(value: f64) -> Option<u16> {
    if value.fract() != 0.0 || !(0.0..=f64::from(u16::MAX)).contains(&value) {
        return None;
    }
    Some(value as u16)
}

fn invalid(message: impl Into<String>) -> IngestError {
    IngestError::Validation(message.into())
}

#[cfg(test)]
mod tests {
    use super::to_u16;

    #[test]
    fn u16_conversion_rejects_fractions_and_range() {
        assert_eq!(to_u16(0.0), Some(0));
        assert_eq!(to_u16(65535.0), Some(65535));
        assert_eq!(to_u16(1.5), None);
        assert_eq!(to_u16(-1.0), None);
        assert_eq!(to_u16(65536.0), None);
    }
}
