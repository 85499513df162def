//! 活动记录：每个解析成功的目击都写一条，不论是否触发通知。

use crate::PipelineError;
use crate::location::ResolvedLocation;
use crate::router::DispatchOutcome;
use beacon_storage::{ActivityRecord, ActivityStore, DeviceRecord, GatewayRecord};
use serde_json::Value;
use std::sync::Arc;

pub struct ActivityInput<'a> {
    pub device: &'a DeviceRecord,
    pub gateway: &'a GatewayRecord,
    pub location: ResolvedLocation,
    pub rssi: i32,
    pub timestamp_ms: i64,
    pub dispatch: &'a DispatchOutcome,
}

pub struct ActivityRecorder {
    store: Arc<dyn ActivityStore>,
}

impl ActivityRecorder {
    pub fn new(store: Arc<dyn ActivityStore>) -> Self {
        Self { store }
    }

    pub async fn record(&self, input: ActivityInput<'_>) -> Result<ActivityRecord, PipelineError> {
        let record = build_activity(&input);
        self.store.append_activity(record.clone()).await?;
        Ok(record)
    }
}

/// 网关名称与类型按当下快照写入，之后网关改名不影响历史记录。
fn build_activity(input: &ActivityInput<'_>) -> ActivityRecord {
    let mut details = input.dispatch.details.clone();
    details.insert(
        "locationSource".to_string(),
        Value::from(input.location.source.as_str()),
    );
    ActivityRecord {
        activity_id: uuid::Uuid::new_v4().to_string(),
        device_id: input.device.device_id.clone(),
        timestamp_ms: input.timestamp_ms,
        gateway_id: input.gateway.gateway_id.clone(),
        gateway_name: input.gateway.name.clone(),
        gateway_type: input.gateway.gateway_type,
        latitude: input.location.coordinates.latitude,
        longitude: input.location.coordinates.longitude,
        rssi: input.rssi,
        binding: input.device.binding.clone(),
        triggered_notification: input.dispatch.triggered,
        notification_type: input.dispatch.channel,
        notification_point_id: input.dispatch.point_id.clone(),
        details: Value::Object(details),
    }
}
