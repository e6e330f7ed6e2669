//! 路由授权引擎

use std::sync::Arc;

use metrics::counter;
use tracing::debug;

use crate::{AccessDecision, Principal, RouteRegistry, RoutePath};

/// 注入给授权引擎和导航过滤器的会话上下文
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionContext<'a> {
    /// 持久化会话尚未恢复完成
    Hydrating,
    Anonymous,
    Authenticated(&'a Principal),
}

impl<'a> SessionContext<'a> {
    pub fn from_parts(loading: bool, principal: Option<&'a Principal>) -> Self {
        match (loading, principal) {
            (true, _) => Self::Hydrating,
            (false, None) => Self::Anonymous,
            (false, Some(principal)) => Self::Authenticated(principal),
        }
    }

    pub fn principal(&self) -> Option<&'a Principal> {
        match self {
            Self::Authenticated(principal) => Some(principal),
            Self::Hydrating | Self::Anonymous => None,
        }
    }
}

/// 路由授权引擎
///
/// 决策顺序:
/// 1. 会话恢复中 → DenyPending (不重定向，避免闪跳)
/// 2. 未登录 → RedirectToLogin
/// 3. super_admin → Grant
/// 4. 最高权限路由 → RedirectToFallback
/// 5. 允许列表精确或后代匹配 → Grant，否则 RedirectToFallback
#[derive(Debug, Clone)]
pub struct RouteAuthorizer {
    registry: Arc<RouteRegistry>,
    default_fallback: RoutePath,
}

impl RouteAuthorizer {
    pub fn new(registry: Arc<RouteRegistry>, default_fallback: RoutePath) -> Self {
        Self {
            registry,
            default_fallback,
        }
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    pub fn default_fallback(&self) -> &RoutePath {
        &self.default_fallback
    }

    pub fn decide(&self, context: SessionContext<'_>, requested: &RoutePath) -> AccessDecision {
        let decision = self.evaluate(context, requested);

        debug!(
            path = %requested,
            principal = context.principal().map(|p| p.identity.as_str()),
            decision = %decision,
            "Route access decided"
        );
        counter!("route_decisions_total", "decision" => decision.label()).increment(1);

        decision
    }

    fn evaluate(&self, context: SessionContext<'_>, requested: &RoutePath) -> AccessDecision {
        let principal = match context {
            SessionContext::Hydrating => return AccessDecision::DenyPending,
            SessionContext::Anonymous => return AccessDecision::RedirectToLogin,
            SessionContext::Authenticated(principal) => principal,
        };

        if principal.is_highest_privilege() {
            return AccessDecision::Grant;
        }

        if self.registry.requires_highest_privilege(requested)
            || !principal.allowed_routes.permits(requested)
        {
            return AccessDecision::RedirectToFallback(
                principal.fallback_route(&self.default_fallback).clone(),
            );
        }

        AccessDecision::Grant
    }
}
