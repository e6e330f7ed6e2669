//! 导航历史

use console_auth_core::RoutePath;

/// 已访问路径的栈
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<RoutePath>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: RoutePath) {
        // 重复进入同一路径不产生新条目
        if self.current() == Some(&path) {
            return;
        }
        self.entries.push(path);
    }

    /// 替换当前条目，历史为空时等同于 push
    pub fn replace(&mut self, path: RoutePath) {
        match self.entries.last_mut() {
            Some(current) => *current = path,
            None => self.entries.push(path),
        }
    }

    /// 回到上一条目，已在栈底时返回 None 且不做修改
    pub fn back(&mut self) -> Option<&RoutePath> {
        if self.entries.len() < 2 {
            return None;
        }
        self.entries.pop();
        self.entries.last()
    }

    pub fn current(&self) -> Option<&RoutePath> {
        self.entries.last()
    }

    pub fn entries(&self) -> &[RoutePath] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
