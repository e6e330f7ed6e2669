//! 会话状态快照

use console_auth_core::{Principal, SessionContext};

/// 需要在登录页展示的提示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionNotice {
    /// 后端判定会话失效后被强制登出
    Expired,
}

/// 会话状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// 持久化会话尚未恢复完成
    pub loading: bool,
    /// 登录请求进行中
    pub submitting: bool,
    pub principal: Option<Principal>,
    /// 最近一次登录失败的消息
    pub last_error: Option<String>,
    pub notice: Option<SessionNotice>,
}

impl SessionState {
    pub fn initial() -> Self {
        Self {
            loading: true,
            submitting: false,
            principal: None,
            last_error: None,
            notice: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !self.loading && self.principal.is_some()
    }

    /// 注入授权引擎和导航过滤器的上下文
    pub fn context(&self) -> SessionContext<'_> {
        SessionContext::from_parts(self.loading, self.principal.as_ref())
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::initial()
    }
}
