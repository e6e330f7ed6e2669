//! console-adapter-storage - 会话持久化适配器

mod file;
mod memory;

pub use file::*;
pub use memory::*;
