//! FCM 推送（legacy HTTP 接口）。

use crate::{NotifyError, PushSender, build_http_client};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// 推送内容。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
    /// App 端用于跳转的附加字段。
    pub data: BTreeMap<String, String>,
}

/// 组装通知点推送：优先使用通知点自定义讯息，否则使用模板。
pub fn point_notification(
    point_id: &str,
    point_name: &str,
    custom_message: Option<&str>,
    gateway_id: &str,
    timestamp_ms: i64,
) -> PushNotification {
    let body = match custom_message.map(str::trim) {
        Some(message) if !message.is_empty() => message.to_string(),
        _ => format!("您的裝置已抵達「{point_name}」"),
    };
    let mut data = BTreeMap::new();
    data.insert("type".to_string(), "NOTIFICATION_POINT".to_string());
    data.insert("pointId".to_string(), point_id.to_string());
    data.insert("gatewayId".to_string(), gateway_id.to_string());
    data.insert("timestamp".to_string(), timestamp_ms.to_string());
    PushNotification {
        title: format!("抵達通知：{point_name}"),
        body,
        data,
    }
}

#[derive(Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Serialize)]
struct FcmRequest<'a> {
    to: &'a str,
    notification: FcmNotification<'a>,
    data: &'a BTreeMap<String, String>,
}

/// FCM 客户端。
#[derive(Clone)]
pub struct FcmClient {
    http: reqwest::Client,
    endpoint: String,
    server_key: Option<String>,
}

impl FcmClient {
    pub fn new(
        endpoint: impl Into<String>,
        server_key: Option<String>,
        timeout_seconds: u64,
    ) -> Result<Self, NotifyError> {
        Ok(Self {
            http: build_http_client(timeout_seconds)?,
            endpoint: endpoint.into(),
            server_key,
        })
    }
}

#[async_trait]
impl PushSender for FcmClient {
    async fn send(
        &self,
        device_token: &str,
        notification: &PushNotification,
    ) -> Result<(), NotifyError> {
        let Some(server_key) = self.server_key.as_deref() else {
            return Err(NotifyError::NotConfigured("fcm server key"));
        };
        let request = FcmRequest {
            to: device_token,
            notification: FcmNotification {
                title: &notification.title,
                body: &notification.body,
            },
            data: &notification.data,
        };
        let response = self
            .http
            .post(&self.endpoint)
            .header("Authorization", format!("key={server_key}"))
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body,
            });
        }
        info!(target: "beacon.notify", title = %notification.title, "fcm_push_sent");
        Ok(())
    }
}
