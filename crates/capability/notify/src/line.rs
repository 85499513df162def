//! LINE Messaging API：push 讯息与位置通知 Flex 卡片。

use crate::{LineMessenger, NotifyError, build_http_client};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use domain::Coordinates;
use serde_json::json;
use tracing::info;

/// 讯息时间以台湾时区显示。
const DISPLAY_OFFSET_SECONDS: i32 = 8 * 3600;

/// Flex 讯息。
#[derive(Debug, Clone, PartialEq)]
pub struct LineMessage {
    pub alt_text: String,
    pub contents: serde_json::Value,
}

impl LineMessage {
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "type": "flex",
            "altText": self.alt_text,
            "contents": self.contents,
        })
    }
}

/// 长者位置通知的内容。
#[derive(Debug, Clone)]
pub struct LocationNotice {
    pub elder_name: String,
    pub gateway_name: String,
    pub gateway_location: Option<String>,
    pub coordinates: Coordinates,
    pub timestamp_ms: i64,
    /// 边界网关的通知使用警示配色。
    pub boundary: bool,
}

/// 组装位置通知卡片。
pub fn location_flex_message(notice: &LocationNotice) -> LineMessage {
    let (header_text, header_color) = if notice.boundary {
        ("⚠️ 邊界警報", "#D32F2F")
    } else {
        ("📍 位置更新", "#1E88E5")
    };
    let place = match notice.gateway_location.as_deref() {
        Some(location) if !location.trim().is_empty() => {
            format!("{}（{}）", notice.gateway_name, location.trim())
        }
        _ => notice.gateway_name.clone(),
    };
    let time = format_display_time(notice.timestamp_ms);
    let map_url = format!(
        "https://www.google.com/maps?q={},{}",
        notice.coordinates.latitude, notice.coordinates.longitude
    );
    let contents = json!({
        "type": "bubble",
        "header": {
            "type": "box",
            "layout": "vertical",
            "backgroundColor": header_color,
            "contents": [
                {"type": "text", "text": header_text, "color": "#FFFFFF", "weight": "bold", "size": "lg"}
            ]
        },
        "body": {
            "type": "box",
            "layout": "vertical",
            "spacing": "md",
            "contents": [
                {"type": "text", "text": notice.elder_name, "weight": "bold", "size": "xl"},
                detail_row("地點", &place),
                detail_row("時間", &time),
            ]
        },
        "footer": {
            "type": "box",
            "layout": "vertical",
            "contents": [
                {
                    "type": "button",
                    "style": "primary",
                    "action": {"type": "uri", "label": "查看地圖", "uri": map_url}
                }
            ]
        }
    });
    LineMessage {
        alt_text: format!("{} 出現在 {}", notice.elder_name, notice.gateway_name),
        contents,
    }
}

fn detail_row(label: &str, value: &str) -> serde_json::Value {
    json!({
        "type": "box",
        "layout": "baseline",
        "spacing": "sm",
        "contents": [
            {"type": "text", "text": label, "color": "#888888", "size": "sm", "flex": 1},
            {"type": "text", "text": value, "wrap": true, "size": "sm", "flex": 4}
        ]
    })
}

fn format_display_time(timestamp_ms: i64) -> String {
    let offset = FixedOffset::east_opt(DISPLAY_OFFSET_SECONDS);
    match (DateTime::from_timestamp_millis(timestamp_ms), offset) {
        (Some(time), Some(offset)) => time
            .with_timezone(&offset)
            .format("%Y/%m/%d %H:%M:%S")
            .to_string(),
        _ => timestamp_ms.to_string(),
    }
}

/// LINE Messaging API 客户端。
#[derive(Clone)]
pub struct LineApiClient {
    http: reqwest::Client,
    api_base: String,
}

impl LineApiClient {
    pub fn new(api_base: impl Into<String>, timeout_seconds: u64) -> Result<Self, NotifyError> {
        Ok(Self {
            http: build_http_client(timeout_seconds)?,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    fn push_url(&self) -> String {
        format!("{}/v2/bot/message/push", self.api_base)
    }
}

#[async_trait]
impl LineMessenger for LineApiClient {
    async fn push(
        &self,
        channel_access_token: &str,
        to: &str,
        message: &LineMessage,
    ) -> Result<(), NotifyError> {
        if channel_access_token.trim().is_empty() {
            return Err(NotifyError::NotConfigured("line channel access token"));
        }
        let body = json!({
            "to": to,
            "messages": [message.to_json()],
        });
        let response = self
            .http
            .post(self.push_url())
            .bearer_auth(channel_access_token)
            .json(&body)
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
        info!(target: "beacon.notify", to = %to, "line_push_sent");
        Ok(())
    }
}
