//! 路由注册表
//!
//! 菜单和路由守卫共用同一份注册表，避免两处声明产生漂移。

use std::collections::HashSet;

use console_errors::{AppError, AppResult};
use serde::Serialize;

use crate::RoutePath;

/// 注册表条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDescriptor {
    pub path: RoutePath,
    /// 仅最高权限角色可访问
    pub requires_highest_privilege: bool,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl RouteDescriptor {
    pub fn new(path: RoutePath, label: impl Into<String>) -> Self {
        Self {
            path,
            requires_highest_privilege: false,
            label: label.into(),
            icon: None,
        }
    }

    pub fn parse(path: &str, label: impl Into<String>) -> AppResult<Self> {
        Ok(Self::new(RoutePath::parse(path)?, label))
    }

    pub fn highest_privilege(mut self) -> Self {
        self.requires_highest_privilege = true;
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// 有序的路由注册表，每个路径只能出现一次
#[derive(Debug, Clone, Default)]
pub struct RouteRegistry {
    descriptors: Vec<RouteDescriptor>,
}

impl RouteRegistry {
    pub fn new(descriptors: Vec<RouteDescriptor>) -> AppResult<Self> {
        let mut seen = HashSet::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            if !seen.insert(&descriptor.path) {
                return Err(AppError::validation(format!(
                    "route {} is registered more than once",
                    descriptor.path
                )));
            }
        }
        Ok(Self { descriptors })
    }

    pub fn descriptors(&self) -> &[RouteDescriptor] {
        &self.descriptors
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteDescriptor> {
        self.descriptors.iter()
    }

    /// 精确查找
    pub fn get(&self, path: &RoutePath) -> Option<&RouteDescriptor> {
        self.descriptors.iter().find(|d| &d.path == path)
    }

    /// 管辖 `path` 的条目: 自身或最长的已注册祖先
    pub fn governing(&self, path: &RoutePath) -> Option<&RouteDescriptor> {
        self.descriptors
            .iter()
            .filter(|d| path.is_same_or_descendant_of(&d.path))
            .max_by_key(|d| d.path.as_str().len())
    }

    /// 子页面继承所属条目的最高权限标记
    pub fn requires_highest_privilege(&self, path: &RoutePath) -> bool {
        self.governing(path)
            .is_some_and(|d| d.requires_highest_privilege)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RouteRegistry {
        RouteRegistry::new(vec![
            RouteDescriptor::parse("/dashboard", "Overview").unwrap(),
            RouteDescriptor::parse("/dashboard/payment-manager", "Payments").unwrap(),
            RouteDescriptor::parse("/dashboard/admins", "Admins")
                .unwrap()
                .highest_privilege(),
        ])
        .unwrap()
    }

    fn p(raw: &str) -> RoutePath {
        RoutePath::parse(raw).unwrap()
    }

    #[test]
    fn test_duplicate_path_is_rejected() {
        let result = RouteRegistry::new(vec![
            RouteDescriptor::parse("/dashboard/users", "Users").unwrap(),
            RouteDescriptor::parse("/dashboard/users/", "Users again").unwrap(),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_governing_picks_longest_ancestor() {
        let registry = registry();
        assert_eq!(
            registry.governing(&p("/dashboard/admins/new")).unwrap().label,
            "Admins"
        );
        assert_eq!(
            registry.governing(&p("/dashboard/reports")).unwrap().label,
            "Overview"
        );
        assert!(registry.governing(&p("/login")).is_none());
    }

    #[test]
    fn test_highest_privilege_is_inherited_by_sub_pages() {
        let registry = registry();
        assert!(registry.requires_highest_privilege(&p("/dashboard/admins")));
        assert!(registry.requires_highest_privilege(&p("/dashboard/admins/7/edit")));
        assert!(!registry.requires_highest_privilege(&p("/dashboard/adminsx")));
        assert!(!registry.requires_highest_privilege(&p("/dashboard/payment-manager")));
    }

    #[test]
    fn test_order_is_preserved() {
        let labels: Vec<_> = registry().iter().map(|d| d.label.clone()).collect();
        assert_eq!(labels, ["Overview", "Payments", "Admins"]);
    }
}
