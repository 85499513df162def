//! 信标处理流水线。
//!
//! 一个批次的处理顺序：网关解析 → 逐个信标（并发）做设备解析 → 定位 →
//! 冷却判定与通知路由（含边界警报）→ 活动记录。

pub mod activity;
pub mod boundary;
pub mod cooldown;
pub mod device;
pub mod gateway;
pub mod location;
pub mod processor;
pub mod router;

pub use activity::{ActivityInput, ActivityRecorder};
pub use boundary::{BoundaryAlertGenerator, BoundaryInput, BoundaryOutcome};
pub use cooldown::{CooldownDecision, CooldownEngine, evaluate_cooldown};
pub use device::DeviceResolver;
pub use gateway::{GatewayResolver, IdentifierKind, auto_gateway_id, classify_identifier};
pub use location::{LocationSource, ResolvedLocation, resolve_location};
pub use processor::{BeaconProcessor, SightingOutcome};
pub use router::{DispatchOutcome, NotificationRouter, RouteInput};

use beacon_notify::{LineMessenger, NoopLineMessenger, NoopPushSender, PushSender, RetryPolicy};
use beacon_storage::{
    ActivityStore, AlertStore, DeviceStore, ElderStore, ErrorLogStore, GatewayStore,
    InMemoryActivityStore, InMemoryAlertStore, InMemoryDeviceStore, InMemoryElderStore,
    InMemoryErrorLogStore, InMemoryGatewayStore, InMemoryLocationStateStore, InMemoryMapUserStore,
    InMemoryNotificationPointStore, InMemoryTenantStore, LocationStateStore, MapUserStore,
    NotificationPointStore, StorageError, TenantStore,
};
use std::sync::Arc;

/// 流水线错误。
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("gateway registration exhausted: {0}")]
    Registration(String),
}

impl From<StorageError> for PipelineError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}

/// 流水线参数。
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    pub cooldown_ms: i64,
    pub boundary_cooldown_ms: i64,
    pub boundary_scan_limit: usize,
    pub retry: RetryPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 5 * 60 * 1000,
            boundary_cooldown_ms: 5 * 60 * 1000,
            boundary_scan_limit: 10,
            retry: RetryPolicy::default(),
        }
    }
}

/// 流水线依赖的全部存储。
#[derive(Clone)]
pub struct Stores {
    pub gateways: Arc<dyn GatewayStore>,
    pub devices: Arc<dyn DeviceStore>,
    pub elders: Arc<dyn ElderStore>,
    pub tenants: Arc<dyn TenantStore>,
    pub map_users: Arc<dyn MapUserStore>,
    pub points: Arc<dyn NotificationPointStore>,
    pub alerts: Arc<dyn AlertStore>,
    pub activities: Arc<dyn ActivityStore>,
    pub locations: Arc<dyn LocationStateStore>,
    pub error_logs: Arc<dyn ErrorLogStore>,
}

impl Stores {
    /// 全部使用内存实现。
    pub fn in_memory() -> Self {
        Self {
            gateways: Arc::new(InMemoryGatewayStore::new()),
            devices: Arc::new(InMemoryDeviceStore::new()),
            elders: Arc::new(InMemoryElderStore::new()),
            tenants: Arc::new(InMemoryTenantStore::new()),
            map_users: Arc::new(InMemoryMapUserStore::new()),
            points: Arc::new(InMemoryNotificationPointStore::new()),
            alerts: Arc::new(InMemoryAlertStore::new()),
            activities: Arc::new(InMemoryActivityStore::new()),
            locations: Arc::new(InMemoryLocationStateStore::new()),
            error_logs: Arc::new(InMemoryErrorLogStore::new()),
        }
    }
}

/// 出站通知通道。
#[derive(Clone)]
pub struct Notifiers {
    pub line: Arc<dyn LineMessenger>,
    pub push: Arc<dyn PushSender>,
}

impl Notifiers {
    /// 不发送任何通知。
    pub fn noop() -> Self {
        Self {
            line: Arc::new(NoopLineMessenger),
            push: Arc::new(NoopPushSender),
        }
    }
}

/// 当前毫秒时间戳。
pub fn now_epoch_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as i64)
        .unwrap_or(0)
}
