//! 路由定义
//!
//! - 健康检查：GET /health
//! - 计数器快照：GET /metrics
//! - 信标批量上报：POST /api/beacons（兼容 POST /beacons），其他方法返回 405

use crate::AppState;
use crate::handlers::{get_metrics, health, ingest_beacons};
use crate::middleware::request_context;
use crate::utils::response::method_not_allowed_error;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(get_metrics))
        .route(
            "/api/beacons",
            post(ingest_beacons).fallback(method_not_allowed),
        )
        .route("/beacons", post(ingest_beacons).fallback(method_not_allowed))
        .with_state(state)
        // 网关网页工具直接跨域上报
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(request_context))
}

async fn method_not_allowed() -> axum::response::Response {
    method_not_allowed_error()
}
