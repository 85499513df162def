//! 设备绑定关系。
//!
//! 存储层以 `binding_type` + `bound_to` 两列保存绑定；进入领域层后统一为
//! 封闭的 [`Binding`] 枚举，通知路由对其做穷尽匹配。

/// 设备当前归属。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Unbound,
    Elder(String),
    MapUser(String),
    LineUser(String),
}

impl Binding {
    pub const UNBOUND: &'static str = "UNBOUND";
    pub const ELDER: &'static str = "ELDER";
    pub const MAP_USER: &'static str = "MAP_USER";
    pub const LINE_USER: &'static str = "LINE_USER";

    /// 由存储字段还原绑定。
    ///
    /// 未知类型、或已绑定类型缺少 `bound_to` 时一律视为 `Unbound`，
    /// 保证脏数据不会触发任何通知。
    pub fn from_parts(binding_type: &str, bound_to: Option<&str>) -> Self {
        let bound_to = bound_to.map(str::trim).filter(|value| !value.is_empty());
        match (binding_type.trim().to_ascii_uppercase().as_str(), bound_to) {
            (Self::ELDER, Some(id)) => Self::Elder(id.to_string()),
            (Self::MAP_USER, Some(id)) => Self::MapUser(id.to_string()),
            (Self::LINE_USER, Some(id)) => Self::LineUser(id.to_string()),
            _ => Self::Unbound,
        }
    }

    pub fn binding_type(&self) -> &'static str {
        match self {
            Self::Unbound => Self::UNBOUND,
            Self::Elder(_) => Self::ELDER,
            Self::MapUser(_) => Self::MAP_USER,
            Self::LineUser(_) => Self::LINE_USER,
        }
    }

    pub fn bound_to(&self) -> Option<&str> {
        match self {
            Self::Unbound => None,
            Self::Elder(id) | Self::MapUser(id) | Self::LineUser(id) => Some(id),
        }
    }

    /// 冷却状态的归属主体；未绑定设备没有主体。
    pub fn subject(&self) -> Option<SubjectKey> {
        match self {
            Self::Unbound => None,
            Self::Elder(id) => Some(SubjectKey::new("elder", id)),
            Self::MapUser(id) => Some(SubjectKey::new("map_user", id)),
            Self::LineUser(id) => Some(SubjectKey::new("line_user", id)),
        }
    }
}

/// 冷却状态键：`{kind}:{id}`。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubjectKey(String);

impl SubjectKey {
    pub fn new(kind: &str, id: &str) -> Self {
        Self(format!("{kind}:{id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 从已持久化的键还原。
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl std::fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
