//! 运行时装配
//!
//! 按配置选择存储后端、冷却状态后端与通知实现，组装出 `BeaconProcessor`。

use crate::AppState;
use beacon_config::{AppConfig, CooldownBackend, StorageBackend};
use beacon_notify::{
    FcmClient, LineApiClient, NoopLineMessenger, NoopPushSender, NotifyError, RetryPolicy,
};
use beacon_pipeline::{BeaconProcessor, Notifiers, PipelineConfig, Stores};
use beacon_storage::{
    PgActivityStore, PgAlertStore, PgDeviceStore, PgElderStore, PgErrorLogStore, PgGatewayStore,
    PgLocationStateStore, PgMapUserStore, PgNotificationPointStore, PgTenantStore,
    RedisLocationStateStore, StorageError, connect_pool,
};
use std::sync::Arc;
use tracing::info;

/// 装配失败。
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("storage: {0}")]
    Storage(#[from] StorageError),
    #[error("notify: {0}")]
    Notify(#[from] NotifyError),
    #[error("missing database url")]
    MissingDatabaseUrl,
}

pub async fn build_state(config: &AppConfig) -> Result<AppState, WiringError> {
    let stores = build_stores(config).await?;
    let notifiers = build_notifiers(config)?;
    let pipeline_config = PipelineConfig {
        cooldown_ms: config.cooldown_ms,
        boundary_cooldown_ms: config.boundary_cooldown_ms,
        boundary_scan_limit: config.boundary_scan_limit,
        retry: RetryPolicy {
            max_retries: config.notify_max_retries,
            backoff_ms: config.notify_backoff_ms,
        },
    };
    let error_logs = stores.error_logs.clone();
    let processor = BeaconProcessor::new(stores, notifiers, pipeline_config);
    Ok(AppState {
        handler: Arc::new(processor),
        error_logs,
    })
}

async fn build_stores(config: &AppConfig) -> Result<Stores, WiringError> {
    let mut stores = match config.storage {
        StorageBackend::Memory => {
            info!(target: "beacon.api", "storage_in_memory");
            Stores::in_memory()
        }
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or(WiringError::MissingDatabaseUrl)?;
            let pool = connect_pool(url).await?;
            info!(target: "beacon.api", "storage_postgres");
            Stores {
                gateways: Arc::new(PgGatewayStore::new(pool.clone())),
                devices: Arc::new(PgDeviceStore::new(pool.clone())),
                elders: Arc::new(PgElderStore::new(pool.clone())),
                tenants: Arc::new(PgTenantStore::new(pool.clone())),
                map_users: Arc::new(PgMapUserStore::new(pool.clone())),
                points: Arc::new(PgNotificationPointStore::new(pool.clone())),
                alerts: Arc::new(PgAlertStore::new(pool.clone())),
                activities: Arc::new(PgActivityStore::new(pool.clone())),
                locations: Arc::new(PgLocationStateStore::new(pool.clone())),
                error_logs: Arc::new(PgErrorLogStore::new(pool)),
            }
        }
    };
    if config.cooldown_backend == CooldownBackend::Redis {
        stores.locations = Arc::new(RedisLocationStateStore::connect(&config.redis_url)?);
        info!(target: "beacon.api", "cooldown_state_redis");
    }
    Ok(stores)
}

fn build_notifiers(config: &AppConfig) -> Result<Notifiers, WiringError> {
    if !config.notify_enabled {
        info!(target: "beacon.api", "notify_disabled");
        return Ok(Notifiers {
            line: Arc::new(NoopLineMessenger),
            push: Arc::new(NoopPushSender),
        });
    }
    let line = LineApiClient::new(&config.line_api_base, config.notify_timeout_seconds)?;
    let push = FcmClient::new(
        &config.fcm_endpoint,
        config.fcm_server_key.clone(),
        config.notify_timeout_seconds,
    )?;
    Ok(Notifiers {
        line: Arc::new(line),
        push: Arc::new(push),
    })
}
