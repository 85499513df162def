//! 稳定的 DTO 与 API 响应契约。

use serde::{Deserialize, Serialize};

pub mod lenient;

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// 网关批量上报请求体。
///
/// 网关固件常把数字字段以字符串发送，数值字段统一经 [`lenient`] 转换；
/// 范围校验在 ingest 模块完成。
#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    #[serde(alias = "gatewayId", deserialize_with = "lenient::string")]
    pub gateway_id: String,
    #[serde(default, alias = "latitude", deserialize_with = "lenient::optional_number")]
    pub lat: Option<f64>,
    #[serde(default, alias = "longitude", deserialize_with = "lenient::optional_number")]
    pub lng: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub timestamp: f64,
    #[serde(default)]
    pub beacons: Vec<BeaconDto>,
}

/// 单个信标上报。
#[derive(Debug, Deserialize)]
pub struct BeaconDto {
    #[serde(deserialize_with = "lenient::string")]
    pub uuid: String,
    #[serde(deserialize_with = "lenient::number")]
    pub major: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub minor: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub rssi: f64,
    #[serde(
        default,
        alias = "battery_level",
        rename = "batteryLevel",
        deserialize_with = "lenient::optional_number"
    )]
    pub battery_level: Option<f64>,
}

/// 批量上报响应体。
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub success: bool,
    pub received: usize,
    pub updated: usize,
    pub ignored: usize,
    pub failed: usize,
    pub timestamp: i64,
}

/// 计数器快照。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshotDto {
    pub batches_received: u64,
    pub sightings_received: u64,
    pub sightings_updated: u64,
    pub sightings_ignored: u64,
    pub sightings_failed: u64,
    pub gateways_registered: u64,
    pub location_fallbacks: u64,
    pub cooldown_suppressed: u64,
    pub notifications_triggered: u64,
    pub line_sent: u64,
    pub line_failed: u64,
    pub fcm_sent: u64,
    pub fcm_failed: u64,
    pub boundary_alerts_created: u64,
    pub boundary_alerts_debounced: u64,
}
