//! 冷却 / 去重判定。
//!
//! 状态按主体（长者、地图用户、LINE 用户）保存最近一次被处理的位置。
//! 判定规则：
//! - 无历史 → 首次活动，处理
//! - 网关不同 → 移动，处理（不论间隔）
//! - 同网关且间隔 ≥ 冷却窗口 → 处理
//! - 同网关且时间戳早于已存状态 → 乱序，忽略
//! - 其余 → 冷却中，忽略
//!
//! 状态只在“处理”时写入，被忽略的目击不会延长窗口。

use crate::PipelineError;
use beacon_storage::{GatewayRecord, LocationStateRecord, LocationStateStore};
use domain::{Coordinates, SubjectKey};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownDecision {
    FirstActivity,
    Moved,
    Expired,
    Suppressed,
    OutOfOrder,
}

impl CooldownDecision {
    pub fn should_act(&self) -> bool {
        matches!(self, Self::FirstActivity | Self::Moved | Self::Expired)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstActivity => "FIRST_ACTIVITY",
            Self::Moved => "MOVED",
            Self::Expired => "EXPIRED",
            Self::Suppressed => "SUPPRESSED",
            Self::OutOfOrder => "OUT_OF_ORDER",
        }
    }
}

pub fn evaluate_cooldown(
    previous: Option<&LocationStateRecord>,
    gateway_id: &str,
    timestamp_ms: i64,
    cooldown_ms: i64,
) -> CooldownDecision {
    let Some(previous) = previous else {
        return CooldownDecision::FirstActivity;
    };
    if previous.gateway_id != gateway_id {
        return CooldownDecision::Moved;
    }
    let elapsed = timestamp_ms - previous.timestamp_ms;
    if elapsed < 0 {
        CooldownDecision::OutOfOrder
    } else if elapsed >= cooldown_ms {
        CooldownDecision::Expired
    } else {
        CooldownDecision::Suppressed
    }
}

pub struct CooldownEngine {
    store: Arc<dyn LocationStateStore>,
    cooldown_ms: i64,
}

impl CooldownEngine {
    pub fn new(store: Arc<dyn LocationStateStore>, cooldown_ms: i64) -> Self {
        Self { store, cooldown_ms }
    }

    pub async fn check(
        &self,
        subject: &SubjectKey,
        gateway_id: &str,
        timestamp_ms: i64,
    ) -> Result<CooldownDecision, PipelineError> {
        let previous = self.store.get_state(subject.as_str()).await?;
        Ok(evaluate_cooldown(
            previous.as_ref(),
            gateway_id,
            timestamp_ms,
            self.cooldown_ms,
        ))
    }

    /// 记录被处理的位置；比已存状态旧时不覆盖，返回 false。
    pub async fn record(
        &self,
        subject: &SubjectKey,
        gateway: &GatewayRecord,
        coordinates: Coordinates,
        timestamp_ms: i64,
    ) -> Result<bool, PipelineError> {
        let state = LocationStateRecord {
            subject: subject.as_str().to_string(),
            gateway_id: gateway.gateway_id.clone(),
            gateway_name: gateway.name.clone(),
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
            timestamp_ms,
        };
        Ok(self.store.save_state(&state).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOLDOWN: i64 = 300_000;

    fn state(gateway_id: &str, timestamp_ms: i64) -> LocationStateRecord {
        LocationStateRecord {
            subject: "elder:e-1".to_string(),
            gateway_id: gateway_id.to_string(),
            gateway_name: gateway_id.to_string(),
            latitude: 0.0,
            longitude: 0.0,
            timestamp_ms,
        }
    }

    #[test]
    fn no_history_is_first_activity() {
        let decision = evaluate_cooldown(None, "gw-1", 0, COOLDOWN);
        assert_eq!(decision, CooldownDecision::FirstActivity);
        assert!(decision.should_act());
    }

    #[test]
    fn different_gateway_always_acts() {
        let previous = state("gw-1", 1_000);
        let decision = evaluate_cooldown(Some(&previous), "gw-2", 1_000, COOLDOWN);
        assert_eq!(decision, CooldownDecision::Moved);
    }

    #[test]
    fn same_gateway_within_window_is_suppressed() {
        let previous = state("gw-1", 1_000);
        let decision = evaluate_cooldown(Some(&previous), "gw-1", 1_000 + COOLDOWN - 1, COOLDOWN);
        assert_eq!(decision, CooldownDecision::Suppressed);
        assert!(!decision.should_act());
    }

    #[test]
    fn same_gateway_at_window_boundary_acts() {
        let previous = state("gw-1", 1_000);
        let decision = evaluate_cooldown(Some(&previous), "gw-1", 1_000 + COOLDOWN, COOLDOWN);
        assert_eq!(decision, CooldownDecision::Expired);
    }

    #[test]
    fn older_sighting_at_same_gateway_is_out_of_order() {
        let previous = state("gw-1", 10_000);
        let decision = evaluate_cooldown(Some(&previous), "gw-1", 9_000, COOLDOWN);
        assert_eq!(decision, CooldownDecision::OutOfOrder);
        assert!(!decision.should_act());
    }
}
