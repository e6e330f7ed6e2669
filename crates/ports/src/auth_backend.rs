//! 认证后端 trait 定义

use std::fmt;

use async_trait::async_trait;
use console_auth_core::Principal;
use console_errors::AppResult;
use secrecy::Secret;

/// 登录凭据
pub struct Credentials {
    pub username: String,
    pub password: Secret<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Secret::new(password.into()),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// 登录成功后后端返回的凭证和主体
#[derive(Debug)]
pub struct LoginGrant {
    pub token: Secret<String>,
    pub principal: Principal,
}

/// 认证后端
#[async_trait]
pub trait AuthBackendPort: Send + Sync {
    /// 提交凭据，失败时返回带有面向用户消息的错误
    async fn login(&self, credentials: &Credentials) -> AppResult<LoginGrant>;
}
