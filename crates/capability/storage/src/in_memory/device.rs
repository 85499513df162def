//! 信标设备内存存储实现

use crate::error::StorageError;
use crate::models::{DeviceRecord, PresenceUpdate};
use crate::traits::DeviceStore;
use crate::validation::ensure_non_empty;
use std::collections::HashMap;
use std::sync::RwLock;

/// 设备内存存储
pub struct InMemoryDeviceStore {
    devices: RwLock<HashMap<String, DeviceRecord>>,
}

impl InMemoryDeviceStore {
    pub fn new() -> Self {
        Self {
            devices: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryDeviceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DeviceStore for InMemoryDeviceStore {
    async fn find_active_by_signature(
        &self,
        uuid: &str,
        major: u16,
        minor: u16,
    ) -> Result<Option<DeviceRecord>, StorageError> {
        let map = self
            .devices
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(map
            .values()
            .find(|item| {
                item.is_active
                    && item.major == major
                    && item.minor == minor
                    && item.uuid.eq_ignore_ascii_case(uuid)
            })
            .cloned())
    }

    async fn find_device(&self, device_id: &str) -> Result<Option<DeviceRecord>, StorageError> {
        let item = self
            .devices
            .read()
            .map_err(|_| StorageError::new("lock failed"))?
            .get(device_id)
            .cloned();
        Ok(item)
    }

    async fn create_device(&self, record: DeviceRecord) -> Result<DeviceRecord, StorageError> {
        ensure_non_empty("device_id", &record.device_id)?;
        ensure_non_empty("uuid", &record.uuid)?;
        let mut map = self
            .devices
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if map.contains_key(&record.device_id) {
            return Err(StorageError::new("device exists"));
        }
        map.insert(record.device_id.clone(), record.clone());
        Ok(record)
    }

    async fn touch_presence(
        &self,
        device_id: &str,
        presence: PresenceUpdate,
    ) -> Result<bool, StorageError> {
        let mut map = self
            .devices
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let Some(device) = map.get_mut(device_id) else {
            return Ok(false);
        };
        device.last_seen_ms = Some(presence.last_seen_ms);
        device.last_rssi = Some(presence.last_rssi);
        if presence.battery_level.is_some() {
            device.battery_level = presence.battery_level;
        }
        Ok(true)
    }
}
