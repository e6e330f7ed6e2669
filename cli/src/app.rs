//! 组件装配
//!
//! 存储 → 会话 → HTTP 客户端 → 注册表 → 导航器，按配置组装一次。

use std::sync::Arc;
use std::time::Duration;

use console_adapter_http::{ApiClient, HttpAuthBackend, HttpSettings};
use console_adapter_storage::FileStorage;
use console_auth_core::{
    AccessDecision, NavigationFilter, NavigationMenu, Principal, RouteAuthorizer, RouteDescriptor,
    RoutePath, RouteRegistry,
};
use console_config::AppConfig;
use console_errors::AppResult;
use console_ports::{AuthBackendPort, SessionStoragePort};
use console_router::{NavigationOutcome, Navigator};
use console_session::{HydrateOutcome, SessionNotice, SessionSettings, SessionStore};
use serde::Serialize;
use tracing::info;

use crate::registry::{Screen, route_registry, route_table};

/// `routes` 命令的一行
#[derive(Debug, Serialize)]
pub struct RouteRow<'a> {
    #[serde(flatten)]
    pub descriptor: &'a RouteDescriptor,
    pub screen: Option<Screen>,
    pub access: &'static str,
}

pub struct Console {
    session: Arc<SessionStore>,
    api: ApiClient,
    registry: Arc<RouteRegistry>,
    filter: NavigationFilter,
    navigator: Navigator<Screen>,
}

impl Console {
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let http = HttpSettings::new(
            &config.backend.base_url,
            Duration::from_secs(config.backend.timeout_secs),
        )?;
        let storage = Arc::new(FileStorage::new(&config.storage.path));
        let backend = Arc::new(HttpAuthBackend::new(&http, &config.backend.login_path)?);

        Self::assemble(config, storage, backend, http)
    }

    fn assemble(
        config: &AppConfig,
        storage: Arc<dyn SessionStoragePort>,
        backend: Arc<dyn AuthBackendPort>,
        http: HttpSettings,
    ) -> AppResult<Self> {
        let protected_prefix = RoutePath::parse(&config.routing.protected_prefix)?;
        let default_fallback = RoutePath::parse(&config.routing.default_fallback)?;
        let login_path = RoutePath::parse(&config.routing.login_path)?;

        let settings = SessionSettings::new(protected_prefix)
            .with_keys(&config.storage.token_key, &config.storage.principal_key);
        let session = Arc::new(SessionStore::new(storage, backend, settings));
        let api = ApiClient::new(http, session.clone())?;

        let registry = Arc::new(route_registry()?);
        let table = route_table(registry.clone(), login_path)?;
        let navigator = Navigator::new(
            RouteAuthorizer::new(registry.clone(), default_fallback),
            table,
        )?;

        Ok(Self {
            session,
            filter: NavigationFilter::new(registry.clone()),
            registry,
            api,
            navigator,
        })
    }

    /// 恢复持久化会话，必须在其他命令之前调用
    pub async fn start(&self) -> HydrateOutcome {
        let outcome = self.session.hydrate().await;
        info!(?outcome, "Console started");
        outcome
    }

    pub fn notice(&self) -> Option<SessionNotice> {
        self.session.state().notice
    }

    pub async fn login(&self, username: &str, password: &str) -> AppResult<Principal> {
        self.session.login(username, password).await
    }

    pub async fn logout(&self) {
        self.session.logout().await;
    }

    pub fn whoami(&self) -> Option<Principal> {
        self.session.principal()
    }

    pub fn menu(&self) -> NavigationMenu<'_> {
        let state = self.session.state();
        self.filter.menu_for(state.context())
    }

    pub fn open(&mut self, path: &str) -> NavigationOutcome<Screen> {
        let state = self.session.state();
        self.navigator.navigate(state.context(), path)
    }

    /// 注册表全貌，附带当前主体的访问结果
    pub fn routes(&self) -> Vec<RouteRow<'_>> {
        let state = self.session.state();
        let context = state.context();
        let table = self.navigator.table();
        let authorizer = self.navigator.authorizer();

        self.registry
            .iter()
            .map(|descriptor| RouteRow {
                descriptor,
                screen: table.resolve(&descriptor.path).map(|(_, screen)| *screen),
                access: match authorizer.decide(context, &descriptor.path) {
                    AccessDecision::Grant => "granted",
                    AccessDecision::DenyPending => "pending",
                    AccessDecision::RedirectToLogin | AccessDecision::RedirectToFallback(_) => {
                        "denied"
                    }
                },
            })
            .collect()
    }

    /// 以当前会话调用后端接口
    ///
    /// 后端判定会话失效时，当前页重新经过守卫，落到登录页。
    pub async fn fetch(&mut self, path: &str) -> AppResult<serde_json::Value> {
        let result = self.api.get_json(path).await;
        if result.as_ref().is_err_and(|e| e.is_auth_invalid()) {
            let state = self.session.state();
            self.navigator.refresh(state.context());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use console_adapter_storage::MemoryStorage;
    use console_auth_core::Role;
    use console_config::{BackendConfig, RoutingConfig, StorageConfig, TelemetryConfig};
    use serde_json::json;
    use tempfile::tempdir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(base_url: &str, storage_path: &Path) -> AppConfig {
        AppConfig {
            app_name: "console-test".to_string(),
            app_env: "test".to_string(),
            backend: BackendConfig {
                base_url: base_url.to_string(),
                login_path: "/auth/login".to_string(),
                timeout_secs: 5,
            },
            storage: StorageConfig {
                path: storage_path.to_path_buf(),
                ..StorageConfig::default()
            },
            routing: RoutingConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }

    async fn backend_with_admin() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "tok-1",
                "principal": {
                    "identity": "adm-1",
                    "display_name": "Payments Desk",
                    "role": "admin",
                    "allowed_routes": ["/dashboard/payment-manager", "/dashboard/users"]
                }
            })))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_login_survives_process_restart() {
        let server = backend_with_admin().await;
        let dir = tempdir().unwrap();
        let config = config(&server.uri(), &dir.path().join("session.json"));

        let first = Console::from_config(&config).unwrap();
        assert_eq!(first.start().await, HydrateOutcome::Empty);
        first.login("ops@desk", "pw").await.unwrap();

        let mut second = Console::from_config(&config).unwrap();
        assert_eq!(second.start().await, HydrateOutcome::Restored);

        let principal = second.whoami().unwrap();
        assert_eq!(principal.role, Role::Admin);

        let menu: Vec<_> = second.menu().paths().map(|p| p.as_str()).collect();
        assert_eq!(menu, ["/dashboard/users", "/dashboard/payment-manager"]);

        assert_eq!(
            second.open("/dashboard/reports"),
            NavigationOutcome::Redirected {
                from: RoutePath::parse("/dashboard/reports").unwrap(),
                to: RoutePath::parse("/dashboard/payment-manager").unwrap(),
                screen: Some(Screen::PaymentManager),
            }
        );
    }

    #[tokio::test]
    async fn test_logout_removes_session_file() {
        let server = backend_with_admin().await;
        let dir = tempdir().unwrap();
        let session_file = dir.path().join("session.json");
        let config = config(&server.uri(), &session_file);

        let console = Console::from_config(&config).unwrap();
        console.start().await;
        console.login("ops@desk", "pw").await.unwrap();
        assert!(session_file.exists());

        console.logout().await;
        assert!(!session_file.exists());
        assert!(console.whoami().is_none());
    }

    #[tokio::test]
    async fn test_rejected_token_forces_logout() {
        let server = backend_with_admin().await;
        Mock::given(method("GET"))
            .and(path("/withdrawals"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "message": "Token expired"
            })))
            .mount(&server)
            .await;

        let config = config(&server.uri(), Path::new("unused.json"));
        let http = HttpSettings::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let backend = Arc::new(HttpAuthBackend::new(&http, "/auth/login").unwrap());
        let storage = Arc::new(MemoryStorage::new());
        let mut console = Console::assemble(&config, storage.clone(), backend, http).unwrap();

        console.start().await;
        console.login("ops@desk", "pw").await.unwrap();
        assert_eq!(
            console.open("/dashboard/payment-manager").screen(),
            Some(&Screen::PaymentManager)
        );

        let err = console.fetch("/withdrawals").await.unwrap_err();

        assert!(err.is_auth_invalid());
        assert!(console.whoami().is_none());
        assert_eq!(console.notice(), Some(SessionNotice::Expired));
        assert!(storage.is_empty());
        assert_eq!(
            console.navigator.history().entries(),
            &[RoutePath::parse("/login").unwrap()]
        );
    }

    #[tokio::test]
    async fn test_corrupt_session_file_is_cleared_on_start() {
        let dir = tempdir().unwrap();
        let session_file = dir.path().join("session.json");
        std::fs::write(&session_file, "not json").unwrap();
        let config = config("http://127.0.0.1:9", &session_file);

        let first = Console::from_config(&config).unwrap();
        assert_eq!(first.start().await, HydrateOutcome::Discarded);
        assert!(!session_file.exists());

        let second = Console::from_config(&config).unwrap();
        assert_eq!(second.start().await, HydrateOutcome::Empty);
    }

    #[tokio::test]
    async fn test_routes_report_access_for_signed_out_console() {
        let dir = tempdir().unwrap();
        let config = config("http://127.0.0.1:9", &dir.path().join("session.json"));
        let mut console = Console::from_config(&config).unwrap();
        console.start().await;

        assert!(console.routes().iter().all(|row| row.access == "denied"));
        assert!(!console.menu().is_available());
        assert!(matches!(
            console.open("/dashboard"),
            NavigationOutcome::RedirectedToLogin { .. }
        ));
    }
}
