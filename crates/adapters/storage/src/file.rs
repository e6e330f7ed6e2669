//! 文件存储
//!
//! 所有条目保存在一个 JSON 对象文件中，写入时先写临时文件再 rename。

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use console_errors::{AppError, AppResult};
use console_ports::SessionStoragePort;
use tokio::sync::Mutex;
use tracing::{debug, warn};

type Entries = BTreeMap<String, String>;

/// JSON 文件存储
pub struct FileStorage {
    path: PathBuf,
    // 串行化读-改-写
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> AppResult<Entries> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => {
                return Err(AppError::storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        serde_json::from_str(&raw).map_err(|e| {
            AppError::malformed_persisted_state(format!(
                "{} is not a JSON object of strings: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// 写入前读取，损坏的文件会被覆盖
    ///
    /// 第二个值表示文件已损坏，调用方必须回写以替换它。
    async fn read_entries_for_update(&self) -> AppResult<(Entries, bool)> {
        match self.read_entries().await {
            Ok(entries) => Ok((entries, false)),
            Err(AppError::MalformedPersistedState(reason)) => {
                warn!(path = %self.path.display(), %reason, "Overwriting malformed storage file");
                Ok((Entries::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    async fn write_entries(&self, entries: &Entries) -> AppResult<()> {
        if entries.is_empty() {
            return match tokio::fs::remove_file(&self.path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(AppError::storage(format!(
                    "Failed to remove {}: {}",
                    self.path.display(),
                    e
                ))),
            };
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let body = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");

        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| AppError::storage(format!("Failed to write {}: {}", tmp.display(), e)))?;

        // 文件里有 bearer token，只允许当前用户读写
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))
                .await
                .map_err(|e| {
                    AppError::storage(format!("Failed to restrict {}: {}", tmp.display(), e))
                })?;
        }

        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            AppError::storage(format!(
                "Failed to move {} into place: {}",
                tmp.display(),
                e
            ))
        })?;

        debug!(path = %self.path.display(), entries = entries.len(), "Storage file written");
        Ok(())
    }
}

#[async_trait]
impl SessionStoragePort for FileStorage {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_entries().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let (mut entries, _) = self.read_entries_for_update().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let (mut entries, malformed) = self.read_entries_for_update().await?;
        if entries.remove(key).is_none() && !malformed {
            return Ok(());
        }
        self.write_entries(&entries).await
    }
}
