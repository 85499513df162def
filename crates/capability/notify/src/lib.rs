//! 出站通知：LINE Messaging API 推播与 FCM 推送。
//!
//! 核心只依赖 [`LineMessenger`] / [`PushSender`] 两个 trait；
//! HTTP 实现见 [`line`] 与 [`fcm`]，关闭通知时使用 Noop 实现。

pub mod fcm;
pub mod line;

pub use fcm::{FcmClient, PushNotification, point_notification};
pub use line::{LineApiClient, LineMessage, LocationNotice, location_flex_message};

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// 通知发送错误。
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("http error: {0}")]
    Http(String),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("payload error: {0}")]
    Payload(String),
    #[error("not configured: {0}")]
    NotConfigured(&'static str),
}

impl NotifyError {
    /// 4xx（限流除外）重试无意义。
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Payload(_) | Self::NotConfigured(_) => false,
        }
    }
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

/// LINE 推播抽象（按租户频道凭证发送）。
#[async_trait]
pub trait LineMessenger: Send + Sync {
    async fn push(
        &self,
        channel_access_token: &str,
        to: &str,
        message: &LineMessage,
    ) -> Result<(), NotifyError>;
}

/// 移动端推送抽象（按设备 token 发送）。
#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(
        &self,
        device_token: &str,
        notification: &PushNotification,
    ) -> Result<(), NotifyError>;
}

/// 空实现（`BEACON_NOTIFY=off`）。
#[derive(Debug, Default)]
pub struct NoopLineMessenger;

#[async_trait]
impl LineMessenger for NoopLineMessenger {
    async fn push(
        &self,
        _channel_access_token: &str,
        to: &str,
        message: &LineMessage,
    ) -> Result<(), NotifyError> {
        debug!(target: "beacon.notify", to = %to, alt_text = %message.alt_text, "line_push_skipped");
        Ok(())
    }
}

/// 空实现（`BEACON_NOTIFY=off`）。
#[derive(Debug, Default)]
pub struct NoopPushSender;

#[async_trait]
impl PushSender for NoopPushSender {
    async fn send(
        &self,
        _device_token: &str,
        notification: &PushNotification,
    ) -> Result<(), NotifyError> {
        debug!(target: "beacon.notify", title = %notification.title, "fcm_push_skipped");
        Ok(())
    }
}

/// 发送重试策略。
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryPolicy {
    pub max_retries: u64,
    pub backoff_ms: u64,
}

/// 按策略重试；不可重试的错误立即返回。
pub async fn send_with_retry<F, Fut>(policy: RetryPolicy, mut send: F) -> Result<(), NotifyError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), NotifyError>>,
{
    let mut attempt = 0u64;
    loop {
        match send().await {
            Ok(()) => return Ok(()),
            Err(err) => {
                attempt += 1;
                if attempt > policy.max_retries || !err.is_retryable() {
                    return Err(err);
                }
                if policy.backoff_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(policy.backoff_ms)).await;
                }
            }
        }
    }
}

pub(crate) fn build_http_client(timeout_seconds: u64) -> Result<reqwest::Client, NotifyError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds.max(1)))
        .build()
        .map_err(NotifyError::from)
}
