//! 路由表
//!
//! 屏幕只能绑定到注册表中存在的路径，保证不存在绕过守卫的路由。

use std::collections::HashSet;
use std::sync::Arc;

use console_auth_core::{RoutePath, RouteRegistry};
use console_errors::{AppError, AppResult};

/// 屏幕绑定
#[derive(Debug, Clone)]
pub struct RouteTable<S> {
    registry: Arc<RouteRegistry>,
    login_path: RoutePath,
    login_screen: Option<S>,
    bindings: Vec<(RoutePath, S)>,
}

impl<S> RouteTable<S> {
    pub fn builder(registry: Arc<RouteRegistry>, login_path: RoutePath) -> RouteTableBuilder<S> {
        RouteTableBuilder {
            registry,
            login_path,
            login_screen: None,
            bindings: Vec::new(),
        }
    }

    pub fn registry(&self) -> &Arc<RouteRegistry> {
        &self.registry
    }

    pub fn login_path(&self) -> &RoutePath {
        &self.login_path
    }

    pub fn login_screen(&self) -> Option<&S> {
        self.login_screen.as_ref()
    }

    /// 唯一的公开路径
    pub fn is_public(&self, path: &RoutePath) -> bool {
        path == &self.login_path
    }

    /// 自身或最长的已绑定祖先
    pub fn resolve(&self, path: &RoutePath) -> Option<(&RoutePath, &S)> {
        self.bindings
            .iter()
            .filter(|(bound, _)| path.is_same_or_descendant_of(bound))
            .max_by_key(|(bound, _)| bound.as_str().len())
            .map(|(bound, screen)| (bound, screen))
    }

    pub fn bound_paths(&self) -> impl Iterator<Item = &RoutePath> {
        self.bindings.iter().map(|(path, _)| path)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// 路由表构建器，错误在 `build` 时统一报告
pub struct RouteTableBuilder<S> {
    registry: Arc<RouteRegistry>,
    login_path: RoutePath,
    login_screen: Option<S>,
    bindings: Vec<(String, S)>,
}

impl<S> RouteTableBuilder<S> {
    pub fn login_screen(mut self, screen: S) -> Self {
        self.login_screen = Some(screen);
        self
    }

    pub fn bind(mut self, path: impl Into<String>, screen: S) -> Self {
        self.bindings.push((path.into(), screen));
        self
    }

    pub fn build(self) -> AppResult<RouteTable<S>> {
        let mut seen = HashSet::with_capacity(self.bindings.len());
        let mut bindings = Vec::with_capacity(self.bindings.len());

        for (raw, screen) in self.bindings {
            let path = RoutePath::parse(&raw)?;

            if path == self.login_path {
                return Err(AppError::validation(format!(
                    "{} is the public login path, use login_screen instead",
                    path
                )));
            }
            if self.registry.get(&path).is_none() {
                return Err(AppError::validation(format!(
                    "no guarded route is registered for {}",
                    path
                )));
            }
            if !seen.insert(path.clone()) {
                return Err(AppError::validation(format!(
                    "{} is bound more than once",
                    path
                )));
            }

            bindings.push((path, screen));
        }

        Ok(RouteTable {
            registry: self.registry,
            login_path: self.login_path,
            login_screen: self.login_screen,
            bindings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_auth_core::RouteDescriptor;

    fn registry() -> Arc<RouteRegistry> {
        Arc::new(
            RouteRegistry::new(vec![
                RouteDescriptor::parse("/dashboard", "Overview").unwrap(),
                RouteDescriptor::parse("/dashboard/users", "Users").unwrap(),
                RouteDescriptor::parse("/dashboard/users/audit", "User audit").unwrap(),
            ])
            .unwrap(),
        )
    }

    fn p(raw: &str) -> RoutePath {
        RoutePath::parse(raw).unwrap()
    }

    #[test]
    fn test_build_rejects_unguarded_binding() {
        let err = RouteTable::builder(registry(), p("/login"))
            .bind("/dashboard", "overview")
            .bind("/dashboard/secret", "secret")
            .build()
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.message().contains("/dashboard/secret"));
    }

    #[test]
    fn test_build_rejects_duplicate_binding() {
        let result = RouteTable::builder(registry(), p("/login"))
            .bind("/dashboard/users", "users")
            .bind("/dashboard/users/", "users-again")
            .build();

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_build_rejects_login_path_binding() {
        let result = RouteTable::builder(registry(), p("/login"))
            .bind("/login", "login")
            .build();

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_resolve_uses_longest_bound_ancestor() {
        let table = RouteTable::builder(registry(), p("/login"))
            .login_screen("login")
            .bind("/dashboard", "overview")
            .bind("/dashboard/users", "users")
            .build()
            .unwrap();

        assert_eq!(table.resolve(&p("/dashboard/users/42")).map(|(_, s)| *s), Some("users"));
        assert_eq!(table.resolve(&p("/dashboard/kyc")).map(|(_, s)| *s), Some("overview"));
        assert_eq!(table.resolve(&p("/reports")), None);
        assert!(table.is_public(&p("/login")));
        assert!(!table.is_public(&p("/dashboard")));
        assert_eq!(table.login_screen(), Some(&"login"));
    }
}
