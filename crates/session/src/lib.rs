//! console-session - 会话存储
//!
//! 登录主体的唯一事实来源。只有 [`SessionStore`] 的 `hydrate`、`login`、
//! `logout` 和强制登出会写入主体，其他组件通过 [`SessionState`] 快照只读访问。

mod settings;
mod snapshot;
mod state;
mod store;

pub use settings::*;
pub use state::*;
pub use store::*;
