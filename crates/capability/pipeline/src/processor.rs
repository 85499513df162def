//! 批次处理入口。

use crate::activity::{ActivityInput, ActivityRecorder};
use crate::device::DeviceResolver;
use crate::gateway::GatewayResolver;
use crate::location::{ResolvedLocation, resolve_location};
use crate::router::{NotificationRouter, RouteInput};
use crate::{Notifiers, PipelineConfig, PipelineError, Stores, now_epoch_ms};
use async_trait::async_trait;
use beacon_ingest::{BatchHandler, BatchSummary, IngestError};
use beacon_storage::{ErrorLogRecord, ErrorLogStore, GatewayRecord};
use beacon_telemetry::{
    record_batch_received, record_sighting_failed, record_sighting_ignored,
    record_sighting_updated,
};
use domain::{BeaconSighting, SightingBatch};
use futures::future::join_all;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 单个目击的处理结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SightingOutcome {
    /// 设备已解析并写入活动记录（含冷却中被抑制的目击）。
    Updated,
    /// 未登记或已停用的信标。
    Ignored,
}

struct ProcessorInner {
    gateways: GatewayResolver,
    devices: DeviceResolver,
    router: NotificationRouter,
    activities: ActivityRecorder,
    error_logs: Arc<dyn ErrorLogStore>,
}

/// 信标批次处理器，可廉价克隆并在请求间共享。
#[derive(Clone)]
pub struct BeaconProcessor {
    inner: Arc<ProcessorInner>,
}

impl BeaconProcessor {
    pub fn new(stores: Stores, notifiers: Notifiers, config: PipelineConfig) -> Self {
        let inner = ProcessorInner {
            gateways: GatewayResolver::new(stores.gateways.clone()),
            devices: DeviceResolver::new(stores.devices.clone()),
            router: NotificationRouter::new(&stores, notifiers, &config),
            activities: ActivityRecorder::new(stores.activities.clone()),
            error_logs: stores.error_logs.clone(),
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    /// 处理一个批次。
    ///
    /// 网关解析失败时整批失败；之后各目击互相隔离，单个失败只计入 `failed`。
    pub async fn process(&self, batch: SightingBatch) -> Result<BatchSummary, PipelineError> {
        record_batch_received(batch.sightings.len());
        let gateway = self
            .inner
            .gateways
            .resolve(&batch.gateway_identifier, batch.reported, now_epoch_ms())
            .await?;
        let location = resolve_location(&gateway, batch.reported);

        let results = join_all(batch.sightings.iter().map(|sighting| {
            self.process_sighting(&gateway, location, sighting, batch.timestamp_ms)
        }))
        .await;

        let mut summary = BatchSummary {
            received: batch.sightings.len(),
            ..BatchSummary::default()
        };
        for (sighting, result) in batch.sightings.iter().zip(results) {
            match result {
                Ok(SightingOutcome::Updated) => {
                    record_sighting_updated();
                    summary.updated += 1;
                }
                Ok(SightingOutcome::Ignored) => {
                    record_sighting_ignored();
                    summary.ignored += 1;
                }
                Err(err) => {
                    record_sighting_failed();
                    summary.failed += 1;
                    self.log_failure(&gateway, sighting, batch.timestamp_ms, &err)
                        .await;
                }
            }
        }
        info!(
            target: "beacon.pipeline",
            gateway_id = %gateway.gateway_id,
            received = summary.received,
            updated = summary.updated,
            ignored = summary.ignored,
            failed = summary.failed,
            "batch_processed"
        );
        Ok(summary)
    }

    async fn process_sighting(
        &self,
        gateway: &GatewayRecord,
        location: ResolvedLocation,
        sighting: &BeaconSighting,
        timestamp_ms: i64,
    ) -> Result<SightingOutcome, PipelineError> {
        let Some(device) = self.inner.devices.resolve(sighting, timestamp_ms).await? else {
            return Ok(SightingOutcome::Ignored);
        };
        let dispatch = self
            .inner
            .router
            .route(RouteInput {
                device: &device,
                gateway,
                sighting,
                location,
                timestamp_ms,
            })
            .await?;
        let activity = self
            .inner
            .activities
            .record(ActivityInput {
                device: &device,
                gateway,
                location,
                rssi: sighting.rssi,
                timestamp_ms,
                dispatch: &dispatch,
            })
            .await?;
        debug!(
            target: "beacon.pipeline",
            activity_id = %activity.activity_id,
            device_id = %device.device_id,
            triggered = dispatch.triggered,
            reason = dispatch.reason().unwrap_or(""),
            "sighting_recorded"
        );
        Ok(SightingOutcome::Updated)
    }

    async fn log_failure(
        &self,
        gateway: &GatewayRecord,
        sighting: &BeaconSighting,
        timestamp_ms: i64,
        err: &PipelineError,
    ) {
        warn!(
            target: "beacon.pipeline",
            gateway_id = %gateway.gateway_id,
            signature = %sighting.signature,
            error = %err,
            "sighting_failed"
        );
        let record = ErrorLogRecord {
            log_id: uuid::Uuid::new_v4().to_string(),
            source: "beacon.pipeline".to_string(),
            message: err.to_string(),
            payload: json!({
                "gatewayId": gateway.gateway_id,
                "timestamp": timestamp_ms,
                "beacon": {
                    "uuid": sighting.signature.uuid,
                    "major": sighting.signature.major,
                    "minor": sighting.signature.minor,
                    "rssi": sighting.rssi,
                    "batteryLevel": sighting.battery_level,
                },
            }),
            request_id: None,
            created_at_ms: now_epoch_ms(),
        };
        if let Err(log_err) = self.inner.error_logs.create_error_log(record).await {
            warn!(target: "beacon.pipeline", error = %log_err, "error_log_write_failed");
        }
    }
}

#[async_trait]
impl BatchHandler for BeaconProcessor {
    async fn handle(&self, batch: SightingBatch) -> Result<BatchSummary, IngestError> {
        self.process(batch)
            .await
            .map_err(|err| IngestError::Handler(err.to_string()))
    }
}
