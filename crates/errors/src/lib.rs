//! console-errors - 统一错误处理
//!
//! 基于 RFC 7807 Problem Details 规范。认证/授权相关的变体由路由层就地恢复
//! (重定向)，不会作为错误传到渲染层。

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 没有有效会话
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// 会话有效但权限不足
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 后端判定 token 过期或无效
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// 持久化的会话数据存在但无法解析
    #[error("Malformed persisted state: {0}")]
    MalformedPersistedState(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn session_expired(msg: impl Into<String>) -> Self {
        Self::SessionExpired(msg.into())
    }

    pub fn malformed_persisted_state(msg: impl Into<String>) -> Self {
        Self::MalformedPersistedState(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn external_service(msg: impl Into<String>) -> Self {
        Self::ExternalService(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// 按后端 HTTP 状态码构造错误
    ///
    /// 401 一律视为会话失效，由调用方触发强制登出
    pub fn from_status(status: u16, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        match status {
            400 | 422 => Self::Validation(msg),
            401 => Self::SessionExpired(msg),
            403 => Self::Unauthorized(msg),
            404 => Self::NotFound(msg),
            409 => Self::Conflict(msg),
            500..=599 => Self::ExternalService(msg),
            _ => Self::Internal(format!("unexpected status {}: {}", status, msg)),
        }
    }

    /// 不带分类前缀的原始消息，用于直接展示给用户
    pub fn message(&self) -> &str {
        match self {
            Self::Unauthenticated(msg)
            | Self::Unauthorized(msg)
            | Self::SessionExpired(msg)
            | Self::MalformedPersistedState(msg)
            | Self::Validation(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::Storage(msg)
            | Self::ExternalService(msg)
            | Self::Internal(msg) => msg,
        }
    }

    /// 是否为需要回到登录页的认证失效类错误
    pub fn is_auth_invalid(&self) -> bool {
        matches!(self, Self::Unauthenticated(_) | Self::SessionExpired(_))
    }

    /// 转换为 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated(_) => 401,
            Self::Unauthorized(_) => 403,
            Self::SessionExpired(_) => 401,
            Self::MalformedPersistedState(_) => 400,
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Storage(_) => 500,
            Self::ExternalService(_) => 502,
            Self::Internal(_) => 500,
        }
    }

    /// 转换为 Problem Details
    pub fn to_problem_details(&self) -> ProblemDetails {
        ProblemDetails {
            r#type: self.problem_type(),
            title: self.problem_title(),
            status: self.status_code(),
            detail: self.to_string(),
            instance: None,
        }
    }

    fn problem_slug(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "unauthenticated",
            Self::Unauthorized(_) => "unauthorized",
            Self::SessionExpired(_) => "session-expired",
            Self::MalformedPersistedState(_) => "malformed-persisted-state",
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not-found",
            Self::Conflict(_) => "conflict",
            Self::Storage(_) => "storage",
            Self::ExternalService(_) => "external-service",
            Self::Internal(_) => "internal",
        }
    }

    fn problem_type(&self) -> String {
        format!("https://console.invalid/problems/{}", self.problem_slug())
    }

    fn problem_title(&self) -> String {
        match self {
            Self::Unauthenticated(_) => "Unauthenticated",
            Self::Unauthorized(_) => "Unauthorized",
            Self::SessionExpired(_) => "Session Expired",
            Self::MalformedPersistedState(_) => "Malformed Persisted State",
            Self::Validation(_) => "Validation Error",
            Self::NotFound(_) => "Resource Not Found",
            Self::Conflict(_) => "Conflict",
            Self::Storage(_) => "Storage Error",
            Self::ExternalService(_) => "External Service Error",
            Self::Internal(_) => "Internal Error",
        }
        .to_string()
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {}", err))
    }
}

/// RFC 7807 Problem Details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    #[serde(default)]
    pub r#type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl ProblemDetails {
    /// 面向用户的消息：优先 detail，其次 title
    pub fn message(&self) -> Option<&str> {
        [self.detail.as_str(), self.title.as_str()]
            .into_iter()
            .find(|s| !s.trim().is_empty())
    }
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;
