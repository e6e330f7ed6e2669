//! 后端连接配置

use std::time::Duration;

use console_errors::{AppError, AppResult};
use url::Url;

/// 后端地址和超时
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub base_url: Url,
    pub timeout: Duration,
}

impl HttpSettings {
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::validation(format!("invalid backend url {:?}: {}", base_url, e)))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(AppError::validation(format!(
                "backend url must be http or https: {}",
                base_url
            )));
        }

        Ok(Self { base_url, timeout })
    }

    /// 在 base_url 的路径之后拼接 `path`，保留 base_url 自带的路径前缀
    ///
    /// `path` 中 `?` 之后的部分作为查询串。
    pub fn endpoint(&self, path: &str) -> Url {
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path, None),
        };

        let mut url = self.base_url.clone();
        let joined = format!(
            "{}/{}",
            self.base_url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        url.set_query(query);
        url
    }

    pub(crate) fn client(&self) -> AppResult<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| AppError::internal(format!("failed to build HTTP client: {}", e)))
    }
}
