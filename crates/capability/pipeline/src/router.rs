//! 通知路由：按设备绑定类型派发。
//!
//! - `Elder` → 长者所属租户的 LINE 频道，推播给全部已核准且绑定 LINE 的成员；
//!   BOUNDARY 网关另外建立边界警报
//! - `MapUser` → 该用户在此网关上的通知点，存在时以 FCM 推送
//! - `LineUser` → 参与冷却，但不在此派发
//! - `Unbound` → 不处理
//!
//! 通知发送失败只会降级为 `triggered=false`，不会让路由返回错误；
//! 只有存储读写失败才返回 `PipelineError`。

use crate::boundary::{BoundaryAlertGenerator, BoundaryInput, BoundaryOutcome};
use crate::cooldown::CooldownEngine;
use crate::location::ResolvedLocation;
use crate::{Notifiers, PipelineConfig, PipelineError, Stores};
use beacon_notify::{LocationNotice, RetryPolicy, location_flex_message, point_notification, send_with_retry};
use beacon_storage::{
    DeviceRecord, ElderRecord, ElderStore, GatewayRecord, MapUserStore, NotificationPointStore,
    TenantStore,
};
use beacon_telemetry::{
    record_cooldown_suppressed, record_fcm_failed, record_fcm_sent, record_line_failed,
    record_line_sent, record_notification_triggered,
};
use domain::{BeaconSighting, Binding, GatewayType, MemberStatus, NotificationChannel};
use futures::future::join_all;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{debug, warn};

/// 路由一次目击所需的上下文。
pub struct RouteInput<'a> {
    pub device: &'a DeviceRecord,
    pub gateway: &'a GatewayRecord,
    pub sighting: &'a BeaconSighting,
    pub location: ResolvedLocation,
    pub timestamp_ms: i64,
}

/// 路由结果，原样写入活动记录。
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    pub triggered: bool,
    /// 只在 `triggered` 时存在。
    pub channel: Option<NotificationChannel>,
    /// 命中的通知点；即使推送未送出也保留。
    pub point_id: Option<String>,
    pub details: Map<String, Value>,
}

impl DispatchOutcome {
    pub fn skipped(reason: &str) -> Self {
        let mut details = Map::new();
        details.insert("reason".to_string(), Value::from(reason));
        Self {
            triggered: false,
            channel: None,
            point_id: None,
            details,
        }
    }

    fn delivered(channel: NotificationChannel) -> Self {
        Self {
            triggered: true,
            channel: Some(channel),
            point_id: None,
            details: Map::new(),
        }
    }

    fn with_point(mut self, point_id: &str) -> Self {
        self.point_id = Some(point_id.to_string());
        self
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    pub fn reason(&self) -> Option<&str> {
        self.details.get("reason").and_then(Value::as_str)
    }
}

pub struct NotificationRouter {
    cooldown: CooldownEngine,
    boundary: BoundaryAlertGenerator,
    elders: Arc<dyn ElderStore>,
    tenants: Arc<dyn TenantStore>,
    map_users: Arc<dyn MapUserStore>,
    points: Arc<dyn NotificationPointStore>,
    notifiers: Notifiers,
    retry: RetryPolicy,
}

impl NotificationRouter {
    pub fn new(stores: &Stores, notifiers: Notifiers, config: &PipelineConfig) -> Self {
        Self {
            cooldown: CooldownEngine::new(stores.locations.clone(), config.cooldown_ms),
            boundary: BoundaryAlertGenerator::new(
                stores.alerts.clone(),
                config.boundary_cooldown_ms,
                config.boundary_scan_limit,
            ),
            elders: stores.elders.clone(),
            tenants: stores.tenants.clone(),
            map_users: stores.map_users.clone(),
            points: stores.points.clone(),
            notifiers,
            retry: config.retry,
        }
    }

    pub async fn route(&self, input: RouteInput<'_>) -> Result<DispatchOutcome, PipelineError> {
        let Some(subject) = input.device.binding.subject() else {
            return Ok(DispatchOutcome::skipped("unbound"));
        };
        let decision = self
            .cooldown
            .check(&subject, &input.gateway.gateway_id, input.timestamp_ms)
            .await?;
        if !decision.should_act() {
            record_cooldown_suppressed();
            debug!(
                target: "beacon.pipeline",
                subject = %subject,
                gateway_id = %input.gateway.gateway_id,
                decision = decision.as_str(),
                "cooldown_suppressed"
            );
            return Ok(DispatchOutcome::skipped("cooldown").with_detail("cooldown", decision.as_str()));
        }
        self.cooldown
            .record(
                &subject,
                input.gateway,
                input.location.coordinates,
                input.timestamp_ms,
            )
            .await?;

        let outcome = match &input.device.binding {
            Binding::Unbound => DispatchOutcome::skipped("unbound"),
            Binding::Elder(elder_id) => self.dispatch_elder(elder_id, &input).await?,
            Binding::MapUser(user_id) => self.dispatch_map_user(user_id, &input).await?,
            Binding::LineUser(_) => DispatchOutcome::skipped("line_user"),
        };
        if outcome.triggered {
            record_notification_triggered();
        }
        Ok(outcome.with_detail("cooldown", decision.as_str()))
    }

    async fn dispatch_elder(
        &self,
        elder_id: &str,
        input: &RouteInput<'_>,
    ) -> Result<DispatchOutcome, PipelineError> {
        let Some(elder) = self.elders.find_elder(elder_id).await? else {
            warn!(target: "beacon.notify", elder_id = %elder_id, "elder_not_found");
            return Ok(DispatchOutcome::skipped("elder_not_found"));
        };
        let boundary = if input.gateway.gateway_type == GatewayType::Boundary {
            Some(self.raise_boundary_alert(&elder, input).await)
        } else {
            None
        };
        let outcome = self.broadcast_line(&elder, input).await?;
        Ok(match boundary {
            Some(boundary) => outcome.with_detail("boundaryAlert", boundary),
            None => outcome,
        })
    }

    /// 边界警报失败不影响 LINE 推播与活动记录。
    async fn raise_boundary_alert(&self, elder: &ElderRecord, input: &RouteInput<'_>) -> Value {
        let result = self
            .boundary
            .maybe_create(BoundaryInput {
                elder,
                gateway: input.gateway,
                signature: &input.sighting.signature,
                coordinates: input.location.coordinates,
                timestamp_ms: input.timestamp_ms,
            })
            .await;
        match result {
            Ok(BoundaryOutcome::Created { alert_id }) => {
                json!({"status": "CREATED", "alertId": alert_id})
            }
            Ok(BoundaryOutcome::Debounced { last_alert_id }) => {
                json!({"status": "DEBOUNCED", "alertId": last_alert_id})
            }
            Err(err) => {
                warn!(
                    target: "beacon.pipeline",
                    elder_id = %elder.elder_id,
                    gateway_id = %input.gateway.gateway_id,
                    error = %err,
                    "boundary_alert_failed"
                );
                json!({"status": "FAILED", "error": err.to_string()})
            }
        }
    }

    async fn broadcast_line(
        &self,
        elder: &ElderRecord,
        input: &RouteInput<'_>,
    ) -> Result<DispatchOutcome, PipelineError> {
        let token = self
            .tenants
            .find_tenant(&elder.tenant_id)
            .await?
            .and_then(|tenant| tenant.line_channel_access_token)
            .filter(|token| !token.trim().is_empty());
        let Some(token) = token else {
            warn!(target: "beacon.notify", tenant_id = %elder.tenant_id, "line_not_configured");
            return Ok(DispatchOutcome::skipped("line_not_configured"));
        };
        let recipients: Vec<String> = self
            .tenants
            .list_members(&elder.tenant_id)
            .await?
            .into_iter()
            .filter(|member| member.status == MemberStatus::Approved)
            .filter_map(|member| member.line_user_id)
            .filter(|line_user_id| !line_user_id.trim().is_empty())
            .collect();
        if recipients.is_empty() {
            warn!(target: "beacon.notify", tenant_id = %elder.tenant_id, "line_no_recipients");
            return Ok(DispatchOutcome::skipped("no_recipients"));
        }

        let message = location_flex_message(&LocationNotice {
            elder_name: elder.name.clone(),
            gateway_name: input.gateway.name.clone(),
            gateway_location: input.gateway.location.clone(),
            coordinates: input.location.coordinates,
            timestamp_ms: input.timestamp_ms,
            boundary: input.gateway.gateway_type == GatewayType::Boundary,
        });
        let token = token.as_str();
        let message = &message;
        let results = join_all(recipients.iter().map(|to| async move {
            let result = send_with_retry(self.retry, || {
                self.notifiers.line.push(token, to.as_str(), message)
            })
            .await;
            (to, result)
        }))
        .await;

        let mut delivered = 0usize;
        for (to, result) in results {
            match result {
                Ok(()) => {
                    record_line_sent();
                    delivered += 1;
                }
                Err(err) => {
                    record_line_failed();
                    warn!(
                        target: "beacon.notify",
                        tenant_id = %elder.tenant_id,
                        to = %to,
                        error = %err,
                        "line_push_failed"
                    );
                }
            }
        }
        let outcome = if delivered > 0 {
            DispatchOutcome::delivered(NotificationChannel::Line)
        } else {
            DispatchOutcome::skipped("send_failed")
        };
        Ok(outcome
            .with_detail("recipients", recipients.len())
            .with_detail("delivered", delivered))
    }

    async fn dispatch_map_user(
        &self,
        user_id: &str,
        input: &RouteInput<'_>,
    ) -> Result<DispatchOutcome, PipelineError> {
        let points = self
            .points
            .list_active_points(user_id, &input.gateway.gateway_id)
            .await?;
        let Some(point) = points.into_iter().next() else {
            return Ok(DispatchOutcome::skipped("no_notification_point"));
        };
        let Some(user) = self.map_users.find_map_user(user_id).await? else {
            warn!(target: "beacon.notify", user_id = %user_id, "map_user_not_found");
            return Ok(DispatchOutcome::skipped("user_not_found").with_point(&point.point_id));
        };
        if !user.notification_enabled {
            return Ok(DispatchOutcome::skipped("notifications_disabled").with_point(&point.point_id));
        }
        let Some(token) = user.fcm_token.filter(|token| !token.trim().is_empty()) else {
            return Ok(DispatchOutcome::skipped("missing_token").with_point(&point.point_id));
        };

        let notification = point_notification(
            &point.point_id,
            &point.name,
            point.message.as_deref(),
            &input.gateway.gateway_id,
            input.timestamp_ms,
        );
        let result = send_with_retry(self.retry, || {
            self.notifiers.push.send(&token, &notification)
        })
        .await;
        match result {
            Ok(()) => {
                record_fcm_sent();
                Ok(DispatchOutcome::delivered(NotificationChannel::Fcm).with_point(&point.point_id))
            }
            Err(err) => {
                record_fcm_failed();
                warn!(
                    target: "beacon.notify",
                    user_id = %user_id,
                    point_id = %point.point_id,
                    error = %err,
                    "fcm_push_failed"
                );
                Ok(DispatchOutcome::skipped("send_failed")
                    .with_point(&point.point_id)
                    .with_detail("error", err.to_string()))
            }
        }
    }
}
