//! 信标接入 HTTP 服务：批量上报、健康检查、计数器快照。

mod handlers;
mod middleware;
mod routes;
mod utils;
mod wiring;

use beacon_config::AppConfig;
use beacon_ingest::BatchHandler;
use beacon_storage::ErrorLogStore;
use beacon_telemetry::init_tracing;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    /// 批次处理器（生产环境为 `BeaconProcessor`）。
    pub handler: Arc<dyn BatchHandler>,
    /// 500 响应前的错误留档。
    pub error_logs: Arc<dyn ErrorLogStore>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    init_tracing();

    let state = wiring::build_state(&config).await?;
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!(target: "beacon.api", addr = %config.http_addr, "http_listening");
    axum::serve(listener, app).await?;
    Ok(())
}
