//! 以文本形式落库的枚举（大写下划线风格，与存储字段一致）。

use crate::ParseKindError;
use std::str::FromStr;

/// 网关类型：决定定位策略与通知策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayType {
    General,
    Boundary,
    Mobile,
    SafeZone,
    SchoolZone,
}

impl GatewayType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "GENERAL",
            Self::Boundary => "BOUNDARY",
            Self::Mobile => "MOBILE",
            Self::SafeZone => "SAFE_ZONE",
            Self::SchoolZone => "SCHOOL_ZONE",
        }
    }
}

impl FromStr for GatewayType {
    type Err = ParseKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GENERAL" => Ok(Self::General),
            "BOUNDARY" => Ok(Self::Boundary),
            "MOBILE" => Ok(Self::Mobile),
            "SAFE_ZONE" => Ok(Self::SafeZone),
            "SCHOOL_ZONE" => Ok(Self::SchoolZone),
            _ => Err(ParseKindError::new("gateway type", value)),
        }
    }
}

/// 通知渠道。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationChannel {
    Line,
    Fcm,
}

impl NotificationChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Line => "LINE",
            Self::Fcm => "FCM",
        }
    }
}

impl FromStr for NotificationChannel {
    type Err = ParseKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "LINE" => Ok(Self::Line),
            "FCM" => Ok(Self::Fcm),
            _ => Err(ParseKindError::new("notification channel", value)),
        }
    }
}

/// 警报状态。
///
/// 本服务只创建 `Pending`；其余流转由 LINE 回调流程（接受/拒绝/完成）驱动。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertStatus {
    Pending,
    Notified,
    Accepted,
    Declined,
    Resolved,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Notified => "NOTIFIED",
            Self::Accepted => "ACCEPTED",
            Self::Declined => "DECLINED",
            Self::Resolved => "RESOLVED",
        }
    }
}

impl FromStr for AlertStatus {
    type Err = ParseKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "NOTIFIED" => Ok(Self::Notified),
            "ACCEPTED" => Ok(Self::Accepted),
            "DECLINED" => Ok(Self::Declined),
            "RESOLVED" => Ok(Self::Resolved),
            _ => Err(ParseKindError::new("alert status", value)),
        }
    }
}

/// 警报等级。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl FromStr for AlertSeverity {
    type Err = ParseKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            _ => Err(ParseKindError::new("alert severity", value)),
        }
    }
}

/// 警报类型。`Inactivity` 由独立的定时巡检写入，本服务只读。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertType {
    Boundary,
    Inactivity,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boundary => "BOUNDARY",
            Self::Inactivity => "INACTIVITY",
        }
    }
}

impl FromStr for AlertType {
    type Err = ParseKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "BOUNDARY" => Ok(Self::Boundary),
            "INACTIVITY" => Ok(Self::Inactivity),
            _ => Err(ParseKindError::new("alert type", value)),
        }
    }
}

/// 租户成员审核状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    Pending,
    Approved,
    Rejected,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl FromStr for MemberStatus {
    type Err = ParseKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            _ => Err(ParseKindError::new("member status", value)),
        }
    }
}
