//! 内存存储实现模块
//!
//! 用于测试以及 `BEACON_STORAGE=memory` 的本地演示。
//!
//! 包含以下实现：
//! - GatewayStore: InMemoryGatewayStore
//! - DeviceStore: InMemoryDeviceStore
//! - ElderStore / TenantStore / MapUserStore: InMemoryElderStore, InMemoryTenantStore, InMemoryMapUserStore
//! - NotificationPointStore: InMemoryNotificationPointStore
//! - AlertStore: InMemoryAlertStore
//! - ActivityStore: InMemoryActivityStore
//! - LocationStateStore: InMemoryLocationStateStore
//! - ErrorLogStore: InMemoryErrorLogStore

pub mod activity;
pub mod alert;
pub mod device;
pub mod error_log;
pub mod gateway;
pub mod location;
pub mod people;
pub mod point;

pub use activity::*;
pub use alert::*;
pub use device::*;
pub use error_log::*;
pub use gateway::*;
pub use location::*;
pub use people::*;
pub use point::*;

/// 让锁进入中毒状态（持写锁时 panic）。
#[cfg(test)]
pub(crate) fn poison<T>(lock: &std::sync::RwLock<T>) {
    let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _guard = lock.write().unwrap();
        panic!("poisoned on purpose");
    }));
    assert!(lock.is_poisoned());
}
