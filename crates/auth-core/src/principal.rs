//! 已认证主体

use console_common::PrincipalId;
use console_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::{AllowList, Role, RoutePath};

/// 已认证主体及其可访问的路由
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub identity: PrincipalId,
    pub display_name: String,
    pub role: Role,
    /// super_admin 忽略此列表
    #[serde(default)]
    pub allowed_routes: AllowList,
}

impl Principal {
    pub fn new(
        identity: impl Into<PrincipalId>,
        display_name: impl Into<String>,
        role: Role,
        allowed_routes: AllowList,
    ) -> Self {
        Self {
            identity: identity.into(),
            display_name: display_name.into(),
            role,
            allowed_routes,
        }
    }

    pub fn is_highest_privilege(&self) -> bool {
        self.role.is_highest_privilege()
    }

    /// 兜底重定向目标: 允许列表第一项，为空时使用 `default`
    pub fn fallback_route<'a>(&'a self, default: &'a RoutePath) -> &'a RoutePath {
        self.allowed_routes.first().unwrap_or(default)
    }

    /// 校验后端下发的主体是否满足客户端不变式
    pub fn validate(&self, protected_prefix: &RoutePath) -> AppResult<()> {
        if self.identity.is_blank() {
            return Err(AppError::validation("principal identity is empty"));
        }
        self.allowed_routes.ensure_within(protected_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin(routes: &[&str]) -> Principal {
        Principal::new(
            "adm-1",
            "Ops Admin",
            Role::Admin,
            AllowList::parse(routes.iter().copied()).unwrap(),
        )
    }

    #[test]
    fn test_fallback_route_uses_first_entry() {
        let default = RoutePath::parse("/dashboard").unwrap();
        let principal = admin(&["/dashboard/payment-manager", "/dashboard/users"]);
        assert_eq!(
            principal.fallback_route(&default).as_str(),
            "/dashboard/payment-manager"
        );
    }

    #[test]
    fn test_fallback_route_defaults_when_empty() {
        let default = RoutePath::parse("/dashboard").unwrap();
        assert_eq!(admin(&[]).fallback_route(&default), &default);
    }

    #[test]
    fn test_validate() {
        let prefix = RoutePath::parse("/dashboard").unwrap();
        assert!(admin(&["/dashboard/users"]).validate(&prefix).is_ok());
        assert!(admin(&["/settings"]).validate(&prefix).is_err());

        let mut anonymous = admin(&[]);
        anonymous.identity = PrincipalId::new("");
        assert!(anonymous.validate(&prefix).is_err());
    }

    #[test]
    fn test_deserialize_wire_shape() {
        let principal: Principal = serde_json::from_str(
            r#"{
                "identity": "adm-9",
                "display_name": "Risk Desk",
                "role": "moderator",
                "allowed_routes": ["/dashboard/kyc", "/dashboard/kyc/"]
            }"#,
        )
        .unwrap();

        assert_eq!(principal.role, Role::Moderator);
        assert_eq!(principal.allowed_routes.len(), 1);
    }

    #[test]
    fn test_deserialize_missing_allowed_routes_is_empty() {
        let principal: Principal = serde_json::from_str(
            r#"{"identity": "root", "display_name": "Root", "role": "super_admin"}"#,
        )
        .unwrap();
        assert!(principal.allowed_routes.is_empty());
        assert!(principal.is_highest_privilege());
    }
}
