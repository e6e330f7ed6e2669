//! console-auth-core - 路由授权核心库
//!
//! 角色、路由路径、允许列表、路由注册表，以及基于它们的访问决策和导航过滤。
//! 本库不做任何 IO，会话状态由调用方以 [`SessionContext`] 注入。

mod authorizer;
mod decision;
mod navigation;
mod path;
mod principal;
mod registry;
mod role;
mod token;

pub use authorizer::*;
pub use decision::*;
pub use navigation::*;
pub use path::*;
pub use principal::*;
pub use registry::*;
pub use role::*;
pub use token::*;
