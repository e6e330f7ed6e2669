//! 管理员角色

use std::fmt;

use serde::{Deserialize, Serialize};

/// 管理员角色
///
/// 后端以 snake_case 字符串下发，未知角色保留原文放进 `Other`。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// 最高权限角色，不受允许列表约束
    SuperAdmin,
    Admin,
    Moderator,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Moderator => "moderator",
            Self::Other(name) => name,
        }
    }

    pub fn is_highest_privilege(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "super_admin" => Self::SuperAdmin,
            "admin" => Self::Admin,
            "moderator" => Self::Moderator,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
