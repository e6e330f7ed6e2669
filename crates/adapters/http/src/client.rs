//! 携带会话 token 的 API 客户端

use std::sync::Arc;

use console_errors::{AppError, AppResult};
use console_ports::AuthSessionPort;
use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::HttpSettings;
use crate::error_body::error_message;

/// 业务接口客户端
///
/// 每个请求都附带当前会话的 bearer token; 后端返回 401 时强制登出该会话。
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    settings: HttpSettings,
    session: Arc<dyn AuthSessionPort>,
}

impl ApiClient {
    pub fn new(settings: HttpSettings, session: Arc<dyn AuthSessionPort>) -> AppResult<Self> {
        Ok(Self {
            client: settings.client()?,
            settings,
            session,
        })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let request = self.client.get(self.settings.endpoint(path));
        let response = self.execute(request).await?;
        decode(response).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.client.post(self.settings.endpoint(path)).json(body);
        let response = self.execute(request).await?;
        decode(response).await
    }

    pub async fn delete(&self, path: &str) -> AppResult<()> {
        let request = self.client.delete(self.settings.endpoint(path));
        self.execute(request).await?;
        Ok(())
    }

    async fn execute(&self, request: RequestBuilder) -> AppResult<Response> {
        let token = self
            .session
            .bearer_token()
            .await
            .ok_or_else(|| AppError::unauthenticated("Sign in to continue"))?;

        let response = request
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .map_err(|e| AppError::external_service(format!("Backend unreachable: {}", e)))?;

        let status = response.status();
        debug!(url = %response.url(), status = status.as_u16(), "Backend responded");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);

        if status == StatusCode::UNAUTHORIZED {
            let err = AppError::session_expired(message);
            warn!(error = %err, "Backend rejected the bearer token");
            self.session.force_logout(&token, &err).await;
            return Err(err);
        }

        Err(AppError::from_status(status.as_u16(), message))
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> AppResult<T> {
    response
        .json()
        .await
        .map_err(|e| AppError::external_service(format!("Unexpected response body: {}", e)))
}
