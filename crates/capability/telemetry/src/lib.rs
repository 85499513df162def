//! 追踪、请求 ID 与进程内计数器。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 计数器快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub batches_received: u64,
    pub sightings_received: u64,
    pub sightings_updated: u64,
    pub sightings_ignored: u64,
    pub sightings_failed: u64,
    pub gateways_registered: u64,
    pub location_fallbacks: u64,
    pub cooldown_suppressed: u64,
    pub notifications_triggered: u64,
    pub line_sent: u64,
    pub line_failed: u64,
    pub fcm_sent: u64,
    pub fcm_failed: u64,
    pub boundary_alerts_created: u64,
    pub boundary_alerts_debounced: u64,
}

/// 进程内计数器。
pub struct TelemetryMetrics {
    batches_received: AtomicU64,
    sightings_received: AtomicU64,
    sightings_updated: AtomicU64,
    sightings_ignored: AtomicU64,
    sightings_failed: AtomicU64,
    gateways_registered: AtomicU64,
    location_fallbacks: AtomicU64,
    cooldown_suppressed: AtomicU64,
    notifications_triggered: AtomicU64,
    line_sent: AtomicU64,
    line_failed: AtomicU64,
    fcm_sent: AtomicU64,
    fcm_failed: AtomicU64,
    boundary_alerts_created: AtomicU64,
    boundary_alerts_debounced: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            batches_received: AtomicU64::new(0),
            sightings_received: AtomicU64::new(0),
            sightings_updated: AtomicU64::new(0),
            sightings_ignored: AtomicU64::new(0),
            sightings_failed: AtomicU64::new(0),
            gateways_registered: AtomicU64::new(0),
            location_fallbacks: AtomicU64::new(0),
            cooldown_suppressed: AtomicU64::new(0),
            notifications_triggered: AtomicU64::new(0),
            line_sent: AtomicU64::new(0),
            line_failed: AtomicU64::new(0),
            fcm_sent: AtomicU64::new(0),
            fcm_failed: AtomicU64::new(0),
            boundary_alerts_created: AtomicU64::new(0),
            boundary_alerts_debounced: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            batches_received: self.batches_received.load(Ordering::Relaxed),
            sightings_received: self.sightings_received.load(Ordering::Relaxed),
            sightings_updated: self.sightings_updated.load(Ordering::Relaxed),
            sightings_ignored: self.sightings_ignored.load(Ordering::Relaxed),
            sightings_failed: self.sightings_failed.load(Ordering::Relaxed),
            gateways_registered: self.gateways_registered.load(Ordering::Relaxed),
            location_fallbacks: self.location_fallbacks.load(Ordering::Relaxed),
            cooldown_suppressed: self.cooldown_suppressed.load(Ordering::Relaxed),
            notifications_triggered: self.notifications_triggered.load(Ordering::Relaxed),
            line_sent: self.line_sent.load(Ordering::Relaxed),
            line_failed: self.line_failed.load(Ordering::Relaxed),
            fcm_sent: self.fcm_sent.load(Ordering::Relaxed),
            fcm_failed: self.fcm_failed.load(Ordering::Relaxed),
            boundary_alerts_created: self.boundary_alerts_created.load(Ordering::Relaxed),
            boundary_alerts_debounced: self.boundary_alerts_debounced.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局计数器实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录收到的批次及其信标数。
pub fn record_batch_received(sightings: usize) {
    let metrics = metrics();
    metrics.batches_received.fetch_add(1, Ordering::Relaxed);
    metrics
        .sightings_received
        .fetch_add(sightings as u64, Ordering::Relaxed);
}

pub fn record_sighting_updated() {
    metrics().sightings_updated.fetch_add(1, Ordering::Relaxed);
}

pub fn record_sighting_ignored() {
    metrics().sightings_ignored.fetch_add(1, Ordering::Relaxed);
}

pub fn record_sighting_failed() {
    metrics().sightings_failed.fetch_add(1, Ordering::Relaxed);
}

/// 记录自动注册的网关。
pub fn record_gateway_registered() {
    metrics().gateways_registered.fetch_add(1, Ordering::Relaxed);
}

/// 记录坐标降级为 (0,0) 的次数。
pub fn record_location_fallback() {
    metrics().location_fallbacks.fetch_add(1, Ordering::Relaxed);
}

pub fn record_cooldown_suppressed() {
    metrics().cooldown_suppressed.fetch_add(1, Ordering::Relaxed);
}

pub fn record_notification_triggered() {
    metrics()
        .notifications_triggered
        .fetch_add(1, Ordering::Relaxed);
}

pub fn record_line_sent() {
    metrics().line_sent.fetch_add(1, Ordering::Relaxed);
}

pub fn record_line_failed() {
    metrics().line_failed.fetch_add(1, Ordering::Relaxed);
}

pub fn record_fcm_sent() {
    metrics().fcm_sent.fetch_add(1, Ordering::Relaxed);
}

pub fn record_fcm_failed() {
    metrics().fcm_failed.fetch_add(1, Ordering::Relaxed);
}

pub fn record_boundary_alert_created() {
    metrics()
        .boundary_alerts_created
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录冷却期内被跳过的边界警报。
pub fn record_boundary_alert_debounced() {
    metrics()
        .boundary_alerts_debounced
        .fetch_add(1, Ordering::Relaxed);
}
