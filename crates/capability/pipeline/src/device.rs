//! 信标 → 设备解析，并更新在场信息。

use crate::PipelineError;
use beacon_storage::{DeviceRecord, DeviceStore, PresenceUpdate};
use domain::BeaconSighting;
use std::sync::Arc;
use tracing::debug;

pub struct DeviceResolver {
    store: Arc<dyn DeviceStore>,
}

impl DeviceResolver {
    pub fn new(store: Arc<dyn DeviceStore>) -> Self {
        Self { store }
    }

    /// 按 (uuid, major, minor) 解析启用中的设备。
    ///
    /// 命中后无条件写入 last_seen / last_rssi / battery，与之后的冷却判定无关。
    /// 未命中返回 `None`（未登记的信标，非错误）。
    pub async fn resolve(
        &self,
        sighting: &BeaconSighting,
        timestamp_ms: i64,
    ) -> Result<Option<DeviceRecord>, PipelineError> {
        let signature = &sighting.signature;
        let Some(mut device) = self
            .store
            .find_active_by_signature(&signature.uuid, signature.major, signature.minor)
            .await?
        else {
            debug!(target: "beacon.pipeline", signature = %signature, "device_not_registered");
            return Ok(None);
        };
        let presence = PresenceUpdate {
            last_seen_ms: timestamp_ms,
            last_rssi: sighting.rssi,
            battery_level: sighting.battery_level,
        };
        self.store.touch_presence(&device.device_id, presence).await?;
        device.last_seen_ms = Some(presence.last_seen_ms);
        device.last_rssi = Some(presence.last_rssi);
        if presence.battery_level.is_some() {
            device.battery_level = presence.battery_level;
        }
        Ok(Some(device))
    }
}
