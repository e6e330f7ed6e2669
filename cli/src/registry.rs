//! 后台路由注册表
//!
//! 菜单、路由守卫和屏幕绑定共用这一份声明。

use std::fmt;
use std::sync::Arc;

use console_auth_core::{RouteDescriptor, RoutePath, RouteRegistry};
use console_errors::AppResult;
use console_router::RouteTable;
use serde::Serialize;

/// 后台屏幕
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Login,
    Overview,
    Users,
    PaymentManager,
    Kyc,
    Markets,
    Banners,
    Notifications,
    Reports,
    Admins,
    Roles,
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Login => "Sign in",
            Self::Overview => "Overview",
            Self::Users => "Users",
            Self::PaymentManager => "Payment Manager",
            Self::Kyc => "KYC Review",
            Self::Markets => "Markets",
            Self::Banners => "Banners",
            Self::Notifications => "Notifications",
            Self::Reports => "Reports",
            Self::Admins => "Administrators",
            Self::Roles => "Roles",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

struct Section {
    path: &'static str,
    icon: &'static str,
    screen: Screen,
    highest_privilege: bool,
}

const fn section(path: &'static str, icon: &'static str, screen: Screen) -> Section {
    Section {
        path,
        icon,
        screen,
        highest_privilege: false,
    }
}

const fn privileged(path: &'static str, icon: &'static str, screen: Screen) -> Section {
    Section {
        path,
        icon,
        screen,
        highest_privilege: true,
    }
}

// 顺序即菜单顺序
const SECTIONS: &[Section] = &[
    section("/dashboard", "layout-dashboard", Screen::Overview),
    section("/dashboard/users", "users", Screen::Users),
    section("/dashboard/payment-manager", "wallet", Screen::PaymentManager),
    section("/dashboard/kyc", "id-card", Screen::Kyc),
    section("/dashboard/markets", "candlestick-chart", Screen::Markets),
    section("/dashboard/banners", "image", Screen::Banners),
    section("/dashboard/notifications", "bell", Screen::Notifications),
    section("/dashboard/reports", "file-chart", Screen::Reports),
    privileged("/dashboard/admins", "shield", Screen::Admins),
    privileged("/dashboard/roles", "key", Screen::Roles),
];

pub fn route_registry() -> AppResult<RouteRegistry> {
    let descriptors = SECTIONS
        .iter()
        .map(|s| -> AppResult<RouteDescriptor> {
            let descriptor = RouteDescriptor::parse(s.path, s.screen.title())?.with_icon(s.icon);
            Ok(if s.highest_privilege {
                descriptor.highest_privilege()
            } else {
                descriptor
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    RouteRegistry::new(descriptors)
}

pub fn route_table(
    registry: Arc<RouteRegistry>,
    login_path: RoutePath,
) -> AppResult<RouteTable<Screen>> {
    SECTIONS
        .iter()
        .fold(
            RouteTable::builder(registry, login_path).login_screen(Screen::Login),
            |builder, s| builder.bind(s.path, s.screen),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_section_is_registered_and_bound() {
        let registry = Arc::new(route_registry().unwrap());
        let table = route_table(registry.clone(), RoutePath::parse("/login").unwrap()).unwrap();

        assert_eq!(registry.len(), SECTIONS.len());
        assert_eq!(table.len(), SECTIONS.len());
        for descriptor in registry.iter() {
            assert!(table.resolve(&descriptor.path).is_some());
        }
    }

    #[test]
    fn test_only_admin_management_is_privileged() {
        let registry = route_registry().unwrap();
        let privileged: Vec<_> = registry
            .iter()
            .filter(|d| d.requires_highest_privilege)
            .map(|d| d.path.as_str())
            .collect();

        assert_eq!(privileged, ["/dashboard/admins", "/dashboard/roles"]);
    }
}
