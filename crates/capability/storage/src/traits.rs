//! 存储接口 Trait 定义
//!
//! 信标处理核心对存储的全部读写都经过这里：
//! - GatewayStore / DeviceStore：解析接收端与信标
//! - ElderStore / TenantStore / MapUserStore / NotificationPointStore：通知对象
//! - AlertStore / ActivityStore / LocationStateStore / ErrorLogStore：处理产物
//!
//! 设计原则：
//! - 所有接口返回 StorageError
//! - 使用 async_trait 支持动态分发（`Arc<dyn ...>`）

use crate::error::StorageError;
use crate::models::{
    ActivityRecord, AlertRecord, DeviceRecord, ElderRecord, ErrorLogRecord, GatewayRecord,
    LocationStateRecord, MapUserRecord, NotificationPointRecord, PresenceUpdate, TenantMemberRecord,
    TenantRecord,
};
use async_trait::async_trait;
use domain::AlertType;

/// 网关存储接口
///
/// 查找只返回 `is_active` 的网关；自动注册绝不覆盖已有记录。
#[async_trait]
pub trait GatewayStore: Send + Sync {
    async fn find_active_by_mac(&self, mac: &str) -> Result<Option<GatewayRecord>, StorageError>;

    async fn find_active_by_imei(&self, imei: &str)
    -> Result<Option<GatewayRecord>, StorageError>;

    async fn find_active_by_serial(
        &self,
        serial_number: &str,
    ) -> Result<Option<GatewayRecord>, StorageError>;

    async fn find_gateway(&self, gateway_id: &str) -> Result<Option<GatewayRecord>, StorageError>;

    /// 以 `gateway_id` 为键插入；已存在时原样返回库中记录。
    ///
    /// 返回 `(记录, 是否新建)`。
    async fn insert_gateway_if_absent(
        &self,
        record: GatewayRecord,
    ) -> Result<(GatewayRecord, bool), StorageError>;
}

/// 信标设备存储接口
#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// 按 (uuid, major, minor) 查找启用中的设备，uuid 不区分大小写。
    async fn find_active_by_signature(
        &self,
        uuid: &str,
        major: u16,
        minor: u16,
    ) -> Result<Option<DeviceRecord>, StorageError>;

    async fn find_device(&self, device_id: &str) -> Result<Option<DeviceRecord>, StorageError>;

    async fn create_device(&self, record: DeviceRecord) -> Result<DeviceRecord, StorageError>;

    /// 写入在场信息；设备不存在时返回 false。
    async fn touch_presence(
        &self,
        device_id: &str,
        presence: PresenceUpdate,
    ) -> Result<bool, StorageError>;
}

/// 长者存储接口
#[async_trait]
pub trait ElderStore: Send + Sync {
    async fn find_elder(&self, elder_id: &str) -> Result<Option<ElderRecord>, StorageError>;

    async fn create_elder(&self, record: ElderRecord) -> Result<ElderRecord, StorageError>;
}

/// 租户与成员存储接口
#[async_trait]
pub trait TenantStore: Send + Sync {
    async fn find_tenant(&self, tenant_id: &str) -> Result<Option<TenantRecord>, StorageError>;

    async fn create_tenant(&self, record: TenantRecord) -> Result<TenantRecord, StorageError>;

    async fn list_members(&self, tenant_id: &str)
    -> Result<Vec<TenantMemberRecord>, StorageError>;

    async fn add_member(
        &self,
        record: TenantMemberRecord,
    ) -> Result<TenantMemberRecord, StorageError>;
}

/// 地图 App 用户存储接口
#[async_trait]
pub trait MapUserStore: Send + Sync {
    async fn find_map_user(&self, user_id: &str) -> Result<Option<MapUserRecord>, StorageError>;

    async fn create_map_user(&self, record: MapUserRecord) -> Result<MapUserRecord, StorageError>;
}

/// 通知点存储接口
#[async_trait]
pub trait NotificationPointStore: Send + Sync {
    /// 指定用户在指定网关上启用中的通知点。
    async fn list_active_points(
        &self,
        owner_id: &str,
        gateway_id: &str,
    ) -> Result<Vec<NotificationPointRecord>, StorageError>;

    async fn create_point(
        &self,
        record: NotificationPointRecord,
    ) -> Result<NotificationPointRecord, StorageError>;
}

/// 警报存储接口
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// 最近的警报，按 `triggered_at_ms` 倒序，最多 `limit` 条。
    async fn recent_alerts(
        &self,
        elder_id: &str,
        gateway_id: &str,
        alert_type: AlertType,
        limit: usize,
    ) -> Result<Vec<AlertRecord>, StorageError>;

    async fn create_alert(&self, record: AlertRecord) -> Result<AlertRecord, StorageError>;
}

/// 设备活动存储接口（只追加）
#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn append_activity(&self, record: ActivityRecord) -> Result<(), StorageError>;

    /// 最近的活动，按时间倒序。
    async fn list_activities(
        &self,
        device_id: &str,
        limit: usize,
    ) -> Result<Vec<ActivityRecord>, StorageError>;
}

/// 冷却状态（最新位置）存储接口
#[async_trait]
pub trait LocationStateStore: Send + Sync {
    async fn get_state(&self, subject: &str) -> Result<Option<LocationStateRecord>, StorageError>;

    /// 单调写入：时间戳早于已存状态的写入被丢弃，返回 false。
    async fn save_state(&self, state: &LocationStateRecord) -> Result<bool, StorageError>;
}

/// 错误日志存储接口
#[async_trait]
pub trait ErrorLogStore: Send + Sync {
    async fn create_error_log(&self, record: ErrorLogRecord) -> Result<(), StorageError>;

    async fn list_error_logs(&self, limit: usize) -> Result<Vec<ErrorLogRecord>, StorageError>;
}
