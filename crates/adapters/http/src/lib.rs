//! console-adapter-http - REST 后端适配器
//!
//! 登录接口 ([`HttpAuthBackend`]) 和携带 bearer token 的业务接口客户端 ([`ApiClient`])。

mod backend;
mod client;
mod error_body;
mod settings;

pub use backend::*;
pub use client::*;
pub use settings::*;
