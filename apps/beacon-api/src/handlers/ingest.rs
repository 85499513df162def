//! 信标批量上报
//!
//! - POST /api/beacons
//!
//! 请求体按 JSON 解析（不要求 Content-Type，部分网关固件不会设置），
//! 数值字段允许字符串。校验失败返回 400 且不产生任何写入；
//! 处理器返回错误时先写错误留档，再返回通用 500。

use api_contract::IngestResponse;
use axum::{
    Extension, Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use beacon_ingest::{IngestError, validate_request};
use beacon_pipeline::now_epoch_ms;
use beacon_storage::ErrorLogRecord;
use beacon_telemetry::RequestIds;
use serde_json::Value;
use tracing::{error, warn};

use crate::AppState;
use crate::utils::response::{bad_request_error, internal_error};

pub async fn ingest_beacons(
    State(state): State<AppState>,
    ids: Option<Extension<RequestIds>>,
    body: Bytes,
) -> Response {
    let request_id = ids.map(|Extension(ids)| ids.request_id);
    let raw: Value = match serde_json::from_slice(&body) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(target: "beacon.api", error = %err, "ingest_body_invalid");
            return bad_request_error(format!("invalid JSON body: {err}"));
        }
    };
    let request = match serde_json::from_value(raw.clone()) {
        Ok(request) => request,
        Err(err) => {
            warn!(target: "beacon.api", error = %err, "ingest_payload_invalid");
            return bad_request_error(format!("invalid payload: {err}"));
        }
    };
    let batch = match validate_request(request) {
        Ok(batch) => batch,
        Err(IngestError::Validation(message)) => {
            warn!(target: "beacon.ingest", reason = %message, "ingest_rejected");
            return bad_request_error(message);
        }
        Err(err) => return fail(&state, err, raw, request_id).await,
    };

    match state.handler.handle(batch).await {
        Ok(summary) => (
            StatusCode::OK,
            Json(IngestResponse {
                success: true,
                received: summary.received,
                updated: summary.updated,
                ignored: summary.ignored,
                failed: summary.failed,
                timestamp: now_epoch_ms(),
            }),
        )
            .into_response(),
        Err(err) => fail(&state, err, raw, request_id).await,
    }
}

async fn fail(
    state: &AppState,
    err: IngestError,
    payload: Value,
    request_id: Option<String>,
) -> Response {
    error!(target: "beacon.api", error = %err, "ingest_failed");
    let record = ErrorLogRecord {
        log_id: uuid::Uuid::new_v4().to_string(),
        source: "beacon.api".to_string(),
        message: err.to_string(),
        payload,
        request_id,
        created_at_ms: now_epoch_ms(),
    };
    if let Err(log_err) = state.error_logs.create_error_log(record).await {
        warn!(target: "beacon.api", error = %log_err, "error_log_write_failed");
    }
    internal_error()
}
