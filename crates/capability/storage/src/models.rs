//! 数据模型
//!
//! 定义核心读写的全部记录：
//! - 接收端：GatewayRecord
//! - 信标设备：DeviceRecord
//! - 通知对象：ElderRecord, TenantRecord, TenantMemberRecord, MapUserRecord, NotificationPointRecord
//! - 处理产物：ActivityRecord, AlertRecord, LocationStateRecord, ErrorLogRecord

use domain::{
    AlertSeverity, AlertStatus, AlertType, Binding, Coordinates, GatewayType, MemberStatus,
    NotificationChannel,
};

/// 网关记录。
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayRecord {
    pub gateway_id: String,
    pub serial_number: String,
    pub mac_address: Option<String>,
    pub imei: Option<String>,
    pub name: String,
    pub location: Option<String>,
    pub gateway_type: GatewayType,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub tenant_id: Option<String>,
    pub is_active: bool,
    pub created_at_ms: i64,
}

impl GatewayRecord {
    /// 已配置的固定坐标（经纬度须同时存在）。
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
            _ => None,
        }
    }
}

/// 信标设备记录。
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRecord {
    pub device_id: String,
    pub uuid: String,
    pub major: u16,
    pub minor: u16,
    pub is_active: bool,
    pub binding: Binding,
    pub bound_at_ms: Option<i64>,
    pub last_seen_ms: Option<i64>,
    pub last_rssi: Option<i32>,
    pub battery_level: Option<u8>,
}

/// 设备在场信息（每次解析命中都会写入）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresenceUpdate {
    pub last_seen_ms: i64,
    pub last_rssi: i32,
    /// 未上报时保留旧值。
    pub battery_level: Option<u8>,
}

/// 长者记录。
#[derive(Debug, Clone, PartialEq)]
pub struct ElderRecord {
    pub elder_id: String,
    pub tenant_id: String,
    pub name: String,
    pub phone: Option<String>,
}

/// 租户（社区）记录，持有 LINE 频道凭证。
#[derive(Debug, Clone, PartialEq)]
pub struct TenantRecord {
    pub tenant_id: String,
    pub name: String,
    pub line_channel_access_token: Option<String>,
}

/// 租户成员。
#[derive(Debug, Clone, PartialEq)]
pub struct TenantMemberRecord {
    pub tenant_id: String,
    pub member_id: String,
    pub name: String,
    pub status: MemberStatus,
    pub line_user_id: Option<String>,
}

/// 地图 App 用户。
#[derive(Debug, Clone, PartialEq)]
pub struct MapUserRecord {
    pub user_id: String,
    pub name: String,
    pub fcm_token: Option<String>,
    pub notification_enabled: bool,
    pub bound_device_id: Option<String>,
}

/// 用户对某个网关的通知订阅。
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationPointRecord {
    pub point_id: String,
    pub owner_id: String,
    pub gateway_id: String,
    pub name: String,
    pub message: Option<String>,
    pub is_active: bool,
}

/// 设备活动记录（只追加）。
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    pub activity_id: String,
    pub device_id: String,
    pub timestamp_ms: i64,
    pub gateway_id: String,
    pub gateway_name: String,
    pub gateway_type: GatewayType,
    pub latitude: f64,
    pub longitude: f64,
    pub rssi: i32,
    pub binding: Binding,
    pub triggered_notification: bool,
    pub notification_type: Option<NotificationChannel>,
    pub notification_point_id: Option<String>,
    /// 通知路由结果的补充信息（收件人数、失败原因等）。
    pub details: serde_json::Value,
}

/// 警报记录。
#[derive(Debug, Clone, PartialEq)]
pub struct AlertRecord {
    pub alert_id: String,
    pub tenant_id: String,
    pub elder_id: String,
    pub gateway_id: String,
    pub alert_type: AlertType,
    pub status: AlertStatus,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    pub details: serde_json::Value,
    pub latitude: f64,
    pub longitude: f64,
    pub triggered_at_ms: i64,
}

/// 主体最新位置，同时作为冷却判定的状态。
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LocationStateRecord {
    pub subject: String,
    pub gateway_id: String,
    pub gateway_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp_ms: i64,
}

/// 未预期错误的留档。
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorLogRecord {
    pub log_id: String,
    pub source: String,
    pub message: String,
    pub payload: serde_json::Value,
    pub request_id: Option<String>,
    pub created_at_ms: i64,
}
