//! 会话存储 trait 定义

use async_trait::async_trait;
use console_errors::AppResult;

/// 持久化键值存储
///
/// 会话只用到两个字符串条目: bearer token 和主体快照
#[async_trait]
pub trait SessionStoragePort: Send + Sync {
    /// 读取条目
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// 写入条目
    async fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// 删除条目，不存在时视为成功
    async fn delete(&self, key: &str) -> AppResult<()>;
}
