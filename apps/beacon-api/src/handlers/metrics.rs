//! 计数器快照。
//!
//! - GET /metrics

use api_contract::{ApiResponse, MetricsSnapshotDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use beacon_telemetry::metrics;

pub async fn get_metrics() -> Response {
    let snapshot = metrics().snapshot();
    (
        StatusCode::OK,
        Json(ApiResponse::success(MetricsSnapshotDto {
            batches_received: snapshot.batches_received,
            sightings_received: snapshot.sightings_received,
            sightings_updated: snapshot.sightings_updated,
            sightings_ignored: snapshot.sightings_ignored,
            sightings_failed: snapshot.sightings_failed,
            gateways_registered: snapshot.gateways_registered,
            location_fallbacks: snapshot.location_fallbacks,
            cooldown_suppressed: snapshot.cooldown_suppressed,
            notifications_triggered: snapshot.notifications_triggered,
            line_sent: snapshot.line_sent,
            line_failed: snapshot.line_failed,
            fcm_sent: snapshot.fcm_sent,
            fcm_failed: snapshot.fcm_failed,
            boundary_alerts_created: snapshot.boundary_alerts_created,
            boundary_alerts_debounced: snapshot.boundary_alerts_debounced,
        })),
    )
        .into_response()
}
