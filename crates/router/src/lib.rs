//! console-router - 路由守卫组合
//!
//! 把屏幕绑定到注册表中的路径，每次导航都先经过授权引擎。
//! 被拒绝的路径不会进入历史记录，重定向目标只评估一次。

mod history;
mod navigator;
mod table;

pub use history::*;
pub use navigator::*;
pub use table::*;
