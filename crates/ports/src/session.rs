//! 已认证会话句柄 trait 定义

use async_trait::async_trait;
use console_errors::AppError;
use secrecy::Secret;

/// HTTP 客户端通过该句柄读取 token，并在收到认证失效信号时强制登出
#[async_trait]
pub trait AuthSessionPort: Send + Sync {
    /// 当前 bearer token，未登录时为 None
    async fn bearer_token(&self) -> Option<Secret<String>>;

    /// 与 logout 相同的清理，并标记会话已过期
    ///
    /// `rejected` 是被后端拒绝的 token; 若会话已换成新 token (重新登录)，
    /// 迟到的 401 不应登出新会话。
    async fn force_logout(&self, rejected: &Secret<String>, reason: &AppError);
}
