pub mod binding;
pub mod data;
pub mod kinds;

pub use binding::{Binding, SubjectKey};
pub use data::{BeaconSighting, BeaconSignature, Coordinates, SightingBatch};
pub use kinds::{
    AlertSeverity, AlertStatus, AlertType, GatewayType, MemberStatus, NotificationChannel,
};

/// 枚举文本解析失败。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKindError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseKindError {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

impl std::fmt::Display for ParseKindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for ParseKindError {}
