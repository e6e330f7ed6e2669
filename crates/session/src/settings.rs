//! 会话存储配置

use console_auth_core::RoutePath;

/// 持久化键和受保护前缀
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub token_key: String,
    pub principal_key: String,
    /// 允许列表中的路径必须位于该前缀之下
    pub protected_prefix: RoutePath,
}

impl SessionSettings {
    pub fn new(protected_prefix: RoutePath) -> Self {
        Self {
            token_key: "token".to_string(),
            principal_key: "principal".to_string(),
            protected_prefix,
        }
    }

    pub fn with_keys(mut self, token_key: impl Into<String>, principal_key: impl Into<String>) -> Self {
        self.token_key = token_key.into();
        self.principal_key = principal_key.into();
        self
    }
}
