//! console-config - 配置加载库

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),
}

/// 后端 API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_login_path() -> String {
    "/auth/login".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// 会话持久化配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
    #[serde(default = "default_token_key")]
    pub token_key: String,
    #[serde(default = "default_principal_key")]
    pub principal_key: String,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(".console/session.json")
}

fn default_token_key() -> String {
    "token".to_string()
}

fn default_principal_key() -> String {
    "principal".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            token_key: default_token_key(),
            principal_key: default_principal_key(),
        }
    }
}

/// 路由配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// 受保护路由的公共前缀，允许列表中的路径必须位于其下
    #[serde(default = "default_protected_prefix")]
    pub protected_prefix: String,
    /// 允许列表为空时的兜底重定向目标
    #[serde(default = "default_fallback")]
    pub default_fallback: String,
    #[serde(default = "default_login_route")]
    pub login_path: String,
}

fn default_protected_prefix() -> String {
    "/dashboard".to_string()
}

fn default_fallback() -> String {
    "/dashboard".to_string()
}

fn default_login_route() -> String {
    "/login".to_string()
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            protected_prefix: default_protected_prefix(),
            default_fallback: default_fallback(),
            login_path: default_login_route(),
        }
    }
}

/// 遥测配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// 强制 JSON 日志，生产环境默认开启
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    #[serde(default = "default_app_env")]
    pub app_env: String,
    pub backend: BackendConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

fn default_app_env() -> String {
    "development".to_string()
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 优先级: 环境变量 (CONSOLE_ 前缀, `__` 分隔层级) > {APP_ENV}.toml > default.toml
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| default_app_env());

        let config: Self = Figment::new()
            .merge(Serialized::default("app_env", &env))
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("CONSOLE_").split("__"))
            .extract()?;

        Ok(config)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// 是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }

    /// 是否输出 JSON 日志
    pub fn wants_json_logs(&self) -> bool {
        self.telemetry.json || self.is_production()
    }
}
