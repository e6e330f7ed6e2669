//! 路由路径与允许列表

use std::fmt;
use std::str::FromStr;

use console_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// 经过校验的绝对路由路径
///
/// 规则: 以 `/` 开头; 不含通配符、查询串、锚点或空白; 不含空段 (`//`)。
/// 结尾的单个 `/` 会被去掉 (根路径 `/` 除外)。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoutePath(String);

impl RoutePath {
    pub fn parse(raw: &str) -> AppResult<Self> {
        if !raw.starts_with('/') {
            return Err(AppError::validation(format!(
                "route path must be absolute: {:?}",
                raw
            )));
        }

        if let Some(c) = raw
            .chars()
            .find(|c| c.is_whitespace() || matches!(c, '*' | '?' | '#'))
        {
            return Err(AppError::validation(format!(
                "route path contains forbidden character {:?}: {:?}",
                c, raw
            )));
        }

        let normalized = if raw.len() > 1 {
            raw.strip_suffix('/').unwrap_or(raw)
        } else {
            raw
        };

        if normalized.len() > 1 && normalized[1..].split('/').any(str::is_empty) {
            return Err(AppError::validation(format!(
                "route path contains an empty segment: {:?}",
                raw
            )));
        }

        Ok(Self(normalized.to_string()))
    }

    pub fn root() -> Self {
        Self("/".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// `self` 是否以 `ancestor + "/"` 开头
    ///
    /// 必须落在 `/` 边界上: `/a` 不是 `/ab` 的祖先
    pub fn is_descendant_of(&self, ancestor: &RoutePath) -> bool {
        self.0.len() > ancestor.0.len()
            && self.0.starts_with(&ancestor.0)
            && self.0.as_bytes()[ancestor.0.len()] == b'/'
    }

    /// 等于 `ancestor` 或为其后代
    pub fn is_same_or_descendant_of(&self, ancestor: &RoutePath) -> bool {
        self == ancestor || self.is_descendant_of(ancestor)
    }

    /// 是否位于受保护前缀之下，根前缀包含一切路径
    pub fn is_within(&self, prefix: &RoutePath) -> bool {
        prefix.is_root() || self.is_same_or_descendant_of(prefix)
    }
}

impl fmt::Display for RoutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RoutePath {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RoutePath {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoutePath> for String {
    fn from(path: RoutePath) -> Self {
        path.0
    }
}

impl AsRef<str> for RoutePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 有序、去重的路由允许列表
///
/// 插入顺序有意义: 第一个条目是拒绝访问时的兜底重定向目标。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<RoutePath>", into = "Vec<RoutePath>")]
pub struct AllowList {
    entries: Vec<RoutePath>,
}

impl AllowList {
    pub fn new(entries: impl IntoIterator<Item = RoutePath>) -> Self {
        let mut deduped: Vec<RoutePath> = Vec::new();
        for entry in entries {
            if !deduped.contains(&entry) {
                deduped.push(entry);
            }
        }
        Self { entries: deduped }
    }

    /// 解析原始字符串列表，任何一个条目非法都会整体失败
    pub fn parse<I, S>(raw: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = raw
            .into_iter()
            .map(|s| RoutePath::parse(s.as_ref()))
            .collect::<AppResult<Vec<_>>>()?;
        Ok(Self::new(entries))
    }

    pub fn first(&self) -> Option<&RoutePath> {
        self.entries.first()
    }

    /// 精确匹配 (导航菜单使用)
    pub fn lists(&self, path: &RoutePath) -> bool {
        self.entries.iter().any(|entry| entry == path)
    }

    /// 精确或后代匹配 (访问决策使用)
    pub fn permits(&self, path: &RoutePath) -> bool {
        self.entries
            .iter()
            .any(|entry| path.is_same_or_descendant_of(entry))
    }

    /// 所有条目都必须位于受保护前缀之下
    pub fn ensure_within(&self, prefix: &RoutePath) -> AppResult<()> {
        match self.entries.iter().find(|entry| !entry.is_within(prefix)) {
            Some(entry) => Err(AppError::validation(format!(
                "allowed route {} is outside the protected prefix {}",
                entry, prefix
            ))),
            None => Ok(()),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoutePath> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<RoutePath>> for AllowList {
    fn from(entries: Vec<RoutePath>) -> Self {
        Self::new(entries)
    }
}

impl From<AllowList> for Vec<RoutePath> {
    fn from(list: AllowList) -> Self {
        list.entries
    }
}

impl<'a> IntoIterator for &'a AllowList {
    type Item = &'a RoutePath;
    type IntoIter = std::slice::Iter<'a, RoutePath>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(raw: &str) -> RoutePath {
        RoutePath::parse(raw).unwrap()
    }

    #[test]
    fn test_parse_normalizes_trailing_slash() {
        assert_eq!(p("/dashboard/users/").as_str(), "/dashboard/users");
        assert_eq!(p("/").as_str(), "/");
        assert!(p("/").is_root());
    }

    #[test]
    fn test_parse_rejects_invalid_paths() {
        for raw in [
            "",
            "dashboard",
            "/dashboard/*",
            "/dashboard?tab=1",
            "/dashboard#top",
            "/dash board",
            "//dashboard",
            "/dashboard//users",
            "/dashboard//",
        ] {
            assert!(RoutePath::parse(raw).is_err(), "{:?} should be rejected", raw);
        }
    }

    #[test]
    fn test_descendant_requires_slash_boundary() {
        assert!(p("/a/b").is_descendant_of(&p("/a")));
        assert!(p("/a/b/c").is_descendant_of(&p("/a")));
        assert!(!p("/ab").is_descendant_of(&p("/a")));
        assert!(!p("/a").is_descendant_of(&p("/a")));
        assert!(!p("/a").is_descendant_of(&p("/a/b")));
    }

    #[test]
    fn test_is_within_prefix() {
        let prefix = p("/dashboard");
        assert!(p("/dashboard").is_within(&prefix));
        assert!(p("/dashboard/kyc").is_within(&prefix));
        assert!(!p("/dashboards").is_within(&prefix));
        assert!(!p("/login").is_within(&prefix));
        assert!(p("/anything").is_within(&RoutePath::root()));
    }

    #[test]
    fn test_serde_rejects_malformed_path() {
        let ok: RoutePath = serde_json::from_str("\"/dashboard/\"").unwrap();
        assert_eq!(ok.as_str(), "/dashboard");
        assert!(serde_json::from_str::<RoutePath>("\"dashboard\"").is_err());
    }

    #[test]
    fn test_allow_list_dedupes_and_keeps_first_position() {
        let list = AllowList::parse(["/d/payments", "/d/users", "/d/payments/"]).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.first(), Some(&p("/d/payments")));
    }

    #[test]
    fn test_lists_is_exact_and_permits_includes_descendants() {
        let list = AllowList::parse(["/d/payments"]).unwrap();

        assert!(list.lists(&p("/d/payments")));
        assert!(!list.lists(&p("/d/payments/withdrawals")));

        assert!(list.permits(&p("/d/payments")));
        assert!(list.permits(&p("/d/payments/withdrawals")));
        assert!(!list.permits(&p("/d/paymentsx")));
        assert!(!list.permits(&p("/d")));
    }

    #[test]
    fn test_empty_allow_list_permits_nothing() {
        let list = AllowList::default();
        assert!(list.is_empty());
        assert_eq!(list.first(), None);
        assert!(!list.permits(&p("/d")));
    }

    #[test]
    fn test_ensure_within() {
        let prefix = p("/dashboard");
        assert!(
            AllowList::parse(["/dashboard/users", "/dashboard"])
                .unwrap()
                .ensure_within(&prefix)
                .is_ok()
        );
        assert!(
            AllowList::parse(["/dashboard/users", "/admin"])
                .unwrap()
                .ensure_within(&prefix)
                .is_err()
        );
    }
}
