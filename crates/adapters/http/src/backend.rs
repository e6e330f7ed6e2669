//! 登录接口适配器

use async_trait::async_trait;
use console_auth_core::Principal;
use console_errors::{AppError, AppResult};
use console_ports::{AuthBackendPort, Credentials, LoginGrant};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::HttpSettings;
use crate::error_body::error_message;

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    principal: Principal,
}

/// REST 登录接口
pub struct HttpAuthBackend {
    client: reqwest::Client,
    login_url: Url,
}

impl HttpAuthBackend {
    pub fn new(settings: &HttpSettings, login_path: &str) -> AppResult<Self> {
        Ok(Self {
            client: settings.client()?,
            login_url: settings.endpoint(login_path),
        })
    }

    pub fn login_url(&self) -> &Url {
        &self.login_url
    }
}

#[async_trait]
impl AuthBackendPort for HttpAuthBackend {
    async fn login(&self, credentials: &Credentials) -> AppResult<LoginGrant> {
        debug!(url = %self.login_url, username = %credentials.username, "Submitting credentials");

        let response = self
            .client
            .post(self.login_url.clone())
            .json(&LoginRequest {
                username: &credentials.username,
                password: credentials.password.expose_secret(),
            })
            .send()
            .await
            .map_err(|e| AppError::external_service(format!("Authentication service unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(status, &body);
            warn!(status = status.as_u16(), %message, "Login rejected");

            // 登录接口上的 401 是凭据错误，不是会话失效
            return Err(match status {
                StatusCode::BAD_REQUEST
                | StatusCode::UNAUTHORIZED
                | StatusCode::FORBIDDEN
                | StatusCode::UNPROCESSABLE_ENTITY => AppError::unauthenticated(message),
                _ => AppError::from_status(status.as_u16(), message),
            });
        }

        let body: LoginResponse = response.json().await.map_err(|e| {
            AppError::external_service(format!("Unexpected login response: {}", e))
        })?;

        if body.token.trim().is_empty() {
            return Err(AppError::external_service("Login response carried an empty token"));
        }

        Ok(LoginGrant {
            token: Secret::new(body.token),
            principal: body.principal,
        })
    }
}
