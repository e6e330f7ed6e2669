//! 导航器

use console_auth_core::{AccessDecision, RouteAuthorizer, RoutePath, SessionContext};
use console_errors::{AppError, AppResult};
use metrics::counter;
use tracing::{debug, info, warn};

use crate::{History, RouteTable};

/// 一次导航的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome<S> {
    /// 会话恢复中，渲染加载状态，历史不变
    Pending { path: RoutePath },
    Rendered { path: RoutePath, screen: S },
    RedirectedToLogin { from: RoutePath },
    /// `screen` 为 None 表示目标同样不可访问，渲染“无权限”落地页
    Redirected {
        from: RoutePath,
        to: RoutePath,
        screen: Option<S>,
    },
    /// 已授权但没有绑定任何屏幕
    NotFound { path: RoutePath },
    InvalidPath { raw: String, reason: String },
}

impl<S> NavigationOutcome<S> {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending { .. } => "pending",
            Self::Rendered { .. } => "rendered",
            Self::RedirectedToLogin { .. } => "redirected_to_login",
            Self::Redirected { .. } => "redirected",
            Self::NotFound { .. } => "not_found",
            Self::InvalidPath { .. } => "invalid_path",
        }
    }

    pub fn screen(&self) -> Option<&S> {
        match self {
            Self::Rendered { screen, .. } => Some(screen),
            Self::Redirected { screen, .. } => screen.as_ref(),
            _ => None,
        }
    }
}

/// 守卫导航
///
/// 请求的路径只有被授权后才写入历史; 重定向时由目标占据该位置。
pub struct Navigator<S> {
    authorizer: RouteAuthorizer,
    table: RouteTable<S>,
    history: History,
}

/// 落地时如何写历史
#[derive(Clone, Copy)]
enum Landing {
    Push,
    Replace,
}

impl<S: Clone> Navigator<S> {
    /// 守卫和屏幕绑定必须基于同一个注册表实例
    pub fn new(authorizer: RouteAuthorizer, table: RouteTable<S>) -> AppResult<Self> {
        if !std::ptr::eq(authorizer.registry(), table.registry().as_ref()) {
            return Err(AppError::validation(
                "route table and authorizer must share one route registry",
            ));
        }

        Ok(Self {
            authorizer,
            table,
            history: History::new(),
        })
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn current(&self) -> Option<&RoutePath> {
        self.history.current()
    }

    pub fn table(&self) -> &RouteTable<S> {
        &self.table
    }

    pub fn authorizer(&self) -> &RouteAuthorizer {
        &self.authorizer
    }

    /// 导航到 `raw`
    pub fn navigate(&mut self, context: SessionContext<'_>, raw: &str) -> NavigationOutcome<S> {
        let outcome = match RoutePath::parse(raw) {
            Ok(path) => self.guard(context, path, Landing::Push),
            Err(e) => {
                warn!(path = raw, error = %e, "Rejected navigation to an invalid path");
                NavigationOutcome::InvalidPath {
                    raw: raw.to_string(),
                    reason: e.message().to_string(),
                }
            }
        };
        record(&outcome);
        outcome
    }

    /// 返回上一页，并对该页重新执行守卫
    ///
    /// 已在历史栈底时返回 None。
    pub fn back(&mut self, context: SessionContext<'_>) -> Option<NavigationOutcome<S>> {
        let previous = self.history.back()?.clone();
        let outcome = self.guard(context, previous, Landing::Replace);
        record(&outcome);
        Some(outcome)
    }

    /// 重新评估当前页，用于会话变化 (恢复完成、登出、强制登出) 之后
    pub fn refresh(&mut self, context: SessionContext<'_>) -> Option<NavigationOutcome<S>> {
        let current = self.history.current()?.clone();
        let outcome = self.guard(context, current, Landing::Replace);
        record(&outcome);
        Some(outcome)
    }

    fn guard(
        &mut self,
        context: SessionContext<'_>,
        path: RoutePath,
        landing: Landing,
    ) -> NavigationOutcome<S> {
        if self.table.is_public(&path) {
            self.land(path.clone(), landing);
            return match self.table.login_screen() {
                Some(screen) => NavigationOutcome::Rendered {
                    path,
                    screen: screen.clone(),
                },
                None => NavigationOutcome::NotFound { path },
            };
        }

        match self.authorizer.decide(context, &path) {
            AccessDecision::DenyPending => NavigationOutcome::Pending { path },
            AccessDecision::Grant => {
                self.land(path.clone(), landing);
                match self.table.resolve(&path) {
                    Some((_, screen)) => NavigationOutcome::Rendered {
                        screen: screen.clone(),
                        path,
                    },
                    None => NavigationOutcome::NotFound { path },
                }
            }
            AccessDecision::RedirectToLogin => {
                debug!(from = %path, "Not signed in, redirecting to login");
                let login = self.table.login_path().clone();
                self.land(login, landing);
                NavigationOutcome::RedirectedToLogin { from: path }
            }
            AccessDecision::RedirectToFallback(target) => {
                // 目标只评估一次，不可访问时停在无权限落地页
                let screen = if self.authorizer.decide(context, &target).is_grant() {
                    self.table.resolve(&target).map(|(_, screen)| screen.clone())
                } else {
                    info!(from = %path, to = %target, "Fallback route is not accessible either");
                    None
                };
                self.land(target.clone(), landing);
                NavigationOutcome::Redirected {
                    from: path,
                    to: target,
                    screen,
                }
            }
        }
    }

    fn land(&mut self, path: RoutePath, landing: Landing) {
        match landing {
            Landing::Push => self.history.push(path),
            Landing::Replace => self.history.replace(path),
        }
    }
}

fn record<S>(outcome: &NavigationOutcome<S>) {
    counter!("navigations_total", "outcome" => outcome.label()).increment(1);
}
