//! 访问决策

use std::fmt;

use console_errors::AppError;

use crate::RoutePath;

/// 路由授权引擎的输出，永远不会是部分渲染
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Grant,
    RedirectToLogin,
    RedirectToFallback(RoutePath),
    /// 会话仍在恢复中，渲染中性的加载状态
    DenyPending,
}

impl AccessDecision {
    pub fn is_grant(&self) -> bool {
        matches!(self, Self::Grant)
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::RedirectToLogin | Self::RedirectToFallback(_))
    }

    /// 重定向目标，`login` 为登录页路径
    pub fn redirect_target<'a>(&'a self, login: &'a RoutePath) -> Option<&'a RoutePath> {
        match self {
            Self::RedirectToLogin => Some(login),
            Self::RedirectToFallback(target) => Some(target),
            Self::Grant | Self::DenyPending => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Grant => "grant",
            Self::RedirectToLogin => "redirect_to_login",
            Self::RedirectToFallback(_) => "redirect_to_fallback",
            Self::DenyPending => "deny_pending",
        }
    }

    /// 拒绝原因，用于可选的提示消息
    pub fn as_error(&self, requested: &RoutePath) -> Option<AppError> {
        match self {
            Self::RedirectToLogin => Some(AppError::unauthenticated(format!(
                "sign in to open {}",
                requested
            ))),
            Self::RedirectToFallback(_) => Some(AppError::unauthorized(format!(
                "no permission to open {}",
                requested
            ))),
            Self::Grant | Self::DenyPending => None,
        }
    }
}

impl fmt::Display for AccessDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RedirectToFallback(target) => write!(f, "{} ({})", self.label(), target),
            _ => f.write_str(self.label()),
        }
    }
}
