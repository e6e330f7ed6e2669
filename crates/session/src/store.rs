//! 会话存储

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use console_auth_core::{Principal, is_token_expired};
use console_errors::{AppError, AppResult};
use console_ports::{AuthBackendPort, AuthSessionPort, Credentials, SessionStoragePort};
use parking_lot::RwLock;
use secrecy::{ExposeSecret, Secret};
use tokio::sync::{Mutex, MutexGuard, watch};
use tracing::{debug, error, info, warn};

use crate::snapshot::PrincipalSnapshot;
use crate::{SessionNotice, SessionSettings, SessionState};

/// `hydrate` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrateOutcome {
    /// 恢复了完整的会话
    Restored,
    /// 没有持久化的会话
    Empty,
    /// 持久化数据不完整或无法解析，已清除
    Discarded,
    /// token 已过期，已清除
    Expired,
    /// 读取期间发生了登录或登出，结果被丢弃
    Superseded,
}

/// 恢复前在锁外准备好的动作
enum HydratePlan {
    Restore {
        token: String,
        principal: Principal,
    },
    Empty,
    Discard(AppError),
    Expire,
}

/// 会话存储
///
/// 写入串行化:
/// - 所有写操作持有 `writer` 锁后才修改状态
/// - `revision` 每次写入都递增，`hydrate` 在锁外读取存储，若期间有其他写入则放弃结果
/// - `logout_generation` 只在登出时递增，登录请求返回时若已登出则放弃结果
pub struct SessionStore {
    storage: Arc<dyn SessionStoragePort>,
    backend: Arc<dyn AuthBackendPort>,
    settings: SessionSettings,
    state: watch::Sender<SessionState>,
    token: RwLock<Option<Secret<String>>>,
    writer: Mutex<()>,
    revision: AtomicU64,
    logout_generation: AtomicU64,
    submitting: AtomicBool,
}

impl SessionStore {
    pub fn new(
        storage: Arc<dyn SessionStoragePort>,
        backend: Arc<dyn AuthBackendPort>,
        settings: SessionSettings,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::initial());
        Self {
            storage,
            backend,
            settings,
            state,
            token: RwLock::new(None),
            writer: Mutex::new(()),
            revision: AtomicU64::new(0),
            logout_generation: AtomicU64::new(0),
            submitting: AtomicBool::new(false),
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// 当前状态快照
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// 订阅状态变化
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn principal(&self) -> Option<Principal> {
        self.state.borrow().principal.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// 等待会话恢复结束
    pub async fn hydrated(&self) -> SessionState {
        let mut rx = self.subscribe();
        match rx.wait_for(|state| !state.loading).await {
            Ok(state) => state.clone(),
            // Sender 属于 self，不会先于这里被释放
            Err(_) => self.state(),
        }
    }

    /// 从持久化存储恢复会话
    ///
    /// 启动流程的最后一步。无论结果如何，返回后 `loading` 一定为 false。
    pub async fn hydrate(&self) -> HydrateOutcome {
        let revision = self.revision.load(Ordering::SeqCst);
        let plan = self.plan_hydrate().await;

        let guard = self.writer.lock().await;

        if self.revision.load(Ordering::SeqCst) != revision {
            debug!("Session changed while hydrating, discarding persisted snapshot");
            self.state.send_modify(|state| state.loading = false);
            return HydrateOutcome::Superseded;
        }

        let outcome = match plan {
            HydratePlan::Restore { token, principal } => {
                info!(
                    principal = %principal.identity,
                    role = %principal.role,
                    routes = principal.allowed_routes.len(),
                    "Session restored"
                );
                *self.token.write() = Some(Secret::new(token));
                self.state.send_modify(|state| {
                    state.loading = false;
                    state.principal = Some(principal);
                });
                HydrateOutcome::Restored
            }
            HydratePlan::Empty => {
                debug!("No persisted session");
                self.state.send_modify(|state| {
                    state.loading = false;
                    state.principal = None;
                });
                HydrateOutcome::Empty
            }
            HydratePlan::Discard(reason) => {
                warn!(error = %reason, "Discarding malformed persisted session");
                self.clear_locked(&guard, None).await;
                HydrateOutcome::Discarded
            }
            HydratePlan::Expire => {
                info!("Persisted session token has expired");
                self.clear_locked(&guard, Some(SessionNotice::Expired)).await;
                HydrateOutcome::Expired
            }
        };

        self.revision.fetch_add(1, Ordering::SeqCst);
        outcome
    }

    async fn plan_hydrate(&self) -> HydratePlan {
        let token = self.storage.get(&self.settings.token_key).await;
        let snapshot = self.storage.get(&self.settings.principal_key).await;

        let (token, snapshot) = match (token, snapshot) {
            (Ok(token), Ok(snapshot)) => (token, snapshot),
            (Err(e @ AppError::MalformedPersistedState(_)), _)
            | (_, Err(e @ AppError::MalformedPersistedState(_))) => {
                return HydratePlan::Discard(e);
            }
            (Err(e), _) | (_, Err(e)) => {
                error!(error = %e, "Session storage unavailable, continuing signed out");
                return HydratePlan::Empty;
            }
        };

        match (token, snapshot) {
            (None, None) => HydratePlan::Empty,
            (Some(token), Some(snapshot)) => match self.parse_snapshot(&token, &snapshot) {
                Ok(principal) if is_token_expired(&token, Utc::now()) => {
                    debug!(principal = %principal.identity, "Persisted token expired");
                    HydratePlan::Expire
                }
                Ok(principal) => HydratePlan::Restore { token, principal },
                Err(e) => HydratePlan::Discard(e),
            },
            (Some(_), None) => HydratePlan::Discard(AppError::malformed_persisted_state(
                "token present without principal snapshot",
            )),
            (None, Some(_)) => HydratePlan::Discard(AppError::malformed_persisted_state(
                "principal snapshot present without token",
            )),
        }
    }

    fn parse_snapshot(&self, token: &str, snapshot: &str) -> AppResult<Principal> {
        if token.trim().is_empty() {
            return Err(AppError::malformed_persisted_state("persisted token is empty"));
        }

        let snapshot: PrincipalSnapshot = serde_json::from_str(snapshot).map_err(|e| {
            AppError::malformed_persisted_state(format!("principal snapshot: {}", e))
        })?;

        snapshot
            .principal
            .validate(&self.settings.protected_prefix)
            .map_err(|e| AppError::malformed_persisted_state(e.message().to_string()))?;

        Ok(snapshot.principal)
    }

    /// 提交凭据登录
    ///
    /// 同一时间只允许一个登录请求，重复提交直接返回 Conflict，不会到达后端。
    pub async fn login(
        &self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> AppResult<Principal> {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Login already in flight, ignoring duplicate submission");
            return Err(AppError::conflict("a sign-in request is already in progress"));
        }
        let _submit = SubmitGuard { store: self };

        self.state.send_modify(|state| {
            state.submitting = true;
            state.last_error = None;
        });

        let credentials = Credentials::new(username, password);
        let generation = self.logout_generation.load(Ordering::SeqCst);

        match self.sign_in(&credentials, generation).await {
            Ok(principal) => Ok(principal),
            Err(e) => {
                warn!(username = %credentials.username, error = %e, "Sign-in failed");
                let message = e.message().to_string();
                self.state
                    .send_modify(|state| state.last_error = Some(message));
                Err(e)
            }
        }
    }

    async fn sign_in(&self, credentials: &Credentials, generation: u64) -> AppResult<Principal> {
        let grant = self.backend.login(credentials).await?;
        grant
            .principal
            .validate(&self.settings.protected_prefix)?;

        let guard = self.writer.lock().await;

        if self.logout_generation.load(Ordering::SeqCst) != generation {
            return Err(AppError::conflict("signed out while the sign-in request was pending"));
        }

        let principal = grant.principal;
        if let Err(e) = self.persist(grant.token.expose_secret(), &principal).await {
            // 旧会话的持久化已被覆盖或删除，内存里也不能再保留
            self.clear_locked(&guard, None).await;
            self.revision.fetch_add(1, Ordering::SeqCst);
            return Err(e);
        }

        *self.token.write() = Some(grant.token);
        self.state.send_modify(|state| {
            state.loading = false;
            state.principal = Some(principal.clone());
            state.last_error = None;
            state.notice = None;
        });
        self.revision.fetch_add(1, Ordering::SeqCst);

        info!(
            principal = %principal.identity,
            role = %principal.role,
            routes = principal.allowed_routes.len(),
            "Signed in"
        );
        Ok(principal)
    }

    async fn persist(&self, token: &str, principal: &Principal) -> AppResult<()> {
        let snapshot = serde_json::to_string(&PrincipalSnapshot::capture(principal))?;
        self.storage.set(&self.settings.token_key, token).await?;
        self.storage
            .set(&self.settings.principal_key, &snapshot)
            .await
    }

    /// 登出: 先清内存再清持久化，返回时两者都已清除
    pub async fn logout(&self) {
        let guard = self.writer.lock().await;
        self.clear_locked(&guard, None).await;
        self.logout_generation.fetch_add(1, Ordering::SeqCst);
        self.revision.fetch_add(1, Ordering::SeqCst);
        info!("Signed out");
    }

    /// 清除会话，调用方必须持有写锁
    async fn clear_locked(&self, _guard: &MutexGuard<'_, ()>, notice: Option<SessionNotice>) {
        *self.token.write() = None;
        self.state.send_modify(|state| {
            state.loading = false;
            state.principal = None;
            state.last_error = None;
            state.notice = notice;
        });
        self.forget_persisted().await;
    }

    async fn forget_persisted(&self) {
        for key in [&self.settings.token_key, &self.settings.principal_key] {
            if let Err(e) = self.storage.delete(key).await {
                error!(key = %key, error = %e, "Failed to clear persisted session entry");
            }
        }
    }
}

/// 登录结束时复位提交标记
struct SubmitGuard<'a> {
    store: &'a SessionStore,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.store.submitting.store(false, Ordering::SeqCst);
        self.store
            .state
            .send_modify(|state| state.submitting = false);
    }
}

#[async_trait]
impl AuthSessionPort for SessionStore {
    async fn bearer_token(&self) -> Option<Secret<String>> {
        self.token
            .read()
            .as_ref()
            .map(|token| Secret::new(token.expose_secret().clone()))
    }

    async fn force_logout(&self, rejected: &Secret<String>, reason: &AppError) {
        let guard = self.writer.lock().await;

        let is_current = self
            .token
            .read()
            .as_ref()
            .is_some_and(|current| current.expose_secret() == rejected.expose_secret());
        if !is_current {
            debug!(error = %reason, "Ignoring auth failure for a token that is no longer active");
            return;
        }

        warn!(error = %reason, "Backend rejected the session, forcing sign-out");
        self.clear_locked(&guard, Some(SessionNotice::Expired)).await;
        self.logout_generation.fetch_add(1, Ordering::SeqCst);
        self.revision.fetch_add(1, Ordering::SeqCst);
    }
}
