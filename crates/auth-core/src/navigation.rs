//! 导航过滤器

use std::sync::Arc;

use crate::{Principal, RouteDescriptor, RouteRegistry, RoutePath, SessionContext};

/// 当前主体可见的导航菜单
///
/// 空菜单用 `Unavailable` 表示，调用方必须渲染明确的“无可用导航”状态。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationMenu<'a> {
    Entries(Vec<&'a RouteDescriptor>),
    Unavailable,
}

impl<'a> NavigationMenu<'a> {
    fn from_entries(entries: Vec<&'a RouteDescriptor>) -> Self {
        if entries.is_empty() {
            Self::Unavailable
        } else {
            Self::Entries(entries)
        }
    }

    pub fn entries(&self) -> &[&'a RouteDescriptor] {
        match self {
            Self::Entries(entries) => entries,
            Self::Unavailable => &[],
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Entries(_))
    }

    pub fn paths(&self) -> impl Iterator<Item = &'a RoutePath> + '_ {
        self.entries().iter().map(|d| &d.path)
    }
}

/// 导航过滤器
///
/// 与授权引擎不同，这里只做精确匹配: 子页面不是独立的菜单项。
#[derive(Debug, Clone)]
pub struct NavigationFilter {
    registry: Arc<RouteRegistry>,
}

impl NavigationFilter {
    pub fn new(registry: Arc<RouteRegistry>) -> Self {
        Self { registry }
    }

    pub fn visible(&self, principal: &Principal) -> NavigationMenu<'_> {
        if principal.is_highest_privilege() {
            return NavigationMenu::from_entries(self.registry.iter().collect());
        }

        // 最高权限条目即便出现在允许列表中也不展示，引擎同样会拒绝它们
        let entries = self
            .registry
            .iter()
            .filter(|d| !d.requires_highest_privilege)
            .filter(|d| principal.allowed_routes.lists(&d.path))
            .collect();

        NavigationMenu::from_entries(entries)
    }

    pub fn menu_for(&self, context: SessionContext<'_>) -> NavigationMenu<'_> {
        match context.principal() {
            Some(principal) => self.visible(principal),
            None => NavigationMenu::Unavailable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AllowList, Role};

    fn filter() -> NavigationFilter {
        NavigationFilter::new(Arc::new(
            RouteRegistry::new(vec![
                RouteDescriptor::parse("/dashboard", "Overview").unwrap(),
                RouteDescriptor::parse("/dashboard/payment-manager", "Payments").unwrap(),
                RouteDescriptor::parse("/dashboard/users", "Users").unwrap(),
                RouteDescriptor::parse("/dashboard/admins", "Admins")
                    .unwrap()
                    .highest_privilege(),
            ])
            .unwrap(),
        ))
    }

    fn principal(role: Role, routes: &[&str]) -> Principal {
        Principal::new(
            "p-1",
            "Tester",
            role,
            AllowList::parse(routes.iter().copied()).unwrap(),
        )
    }

    fn labels(menu: &NavigationMenu<'_>) -> Vec<String> {
        menu.entries().iter().map(|d| d.label.clone()).collect()
    }

    #[test]
    fn test_super_admin_sees_full_registry_in_order() {
        let filter = filter();
        let menu = filter.visible(&principal(Role::SuperAdmin, &[]));
        assert_eq!(labels(&menu), ["Overview", "Payments", "Users", "Admins"]);
    }

    #[test]
    fn test_exact_match_only() {
        let filter = filter();
        let menu = filter.visible(&principal(
            Role::Admin,
            &["/dashboard/users", "/dashboard/payment-manager/withdrawals"],
        ));
        assert_eq!(labels(&menu), ["Users"]);
    }

    #[test]
    fn test_registry_order_wins_over_allow_list_order() {
        let filter = filter();
        let menu = filter.visible(&principal(
            Role::Admin,
            &["/dashboard/users", "/dashboard/payment-manager"],
        ));
        assert_eq!(labels(&menu), ["Payments", "Users"]);
    }

    #[test]
    fn test_highest_privilege_entry_hidden_from_non_super() {
        let filter = filter();
        let menu = filter.visible(&principal(Role::Admin, &["/dashboard/admins"]));
        assert_eq!(menu, NavigationMenu::Unavailable);
    }

    #[test]
    fn test_empty_allow_list_is_unavailable() {
        let filter = filter();
        let menu = filter.visible(&principal(Role::Moderator, &[]));
        assert!(!menu.is_available());
        assert!(menu.entries().is_empty());
    }

    #[test]
    fn test_menu_for_anonymous_and_hydrating() {
        let filter = filter();
        assert_eq!(
            filter.menu_for(SessionContext::Anonymous),
            NavigationMenu::Unavailable
        );
        assert_eq!(
            filter.menu_for(SessionContext::Hydrating),
            NavigationMenu::Unavailable
        );
    }
}
