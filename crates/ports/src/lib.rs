//! ports - 抽象 trait 层
//!
//! 会话存储、认证后端和已认证会话句柄的抽象接口

mod auth_backend;
mod session;
mod storage;

pub use auth_backend::*;
pub use session::*;
pub use storage::*;
