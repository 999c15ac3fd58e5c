use async_trait::async_trait;
use kabu_core::session::entity::Session;
use kabu_core::session::port::SessionStore;
use kabu_core::store::error::StoreError;
use std::path::{Path, PathBuf};
use tokio::fs;

/// # Summary
/// 基于 JSON 文件的会话凭据存储。文件即记录：整个存储只有一条会话，
/// 键为 `access_token` / `user_id` / `user_name` / `created_date` / `created_time`。
///
/// # Invariants
/// * 写入走"写临时文件再重命名"，同目录内 rename 原子生效，
///   读者永远看不到半写文件。
/// * 缺失、无法解析或字段残缺的文件一律按"无会话"处理，不报错。
pub struct JsonSessionStore {
    path: PathBuf,
}

impl JsonSessionStore {
    /// 指定会话文件路径创建存储实例，路径由应用配置注入。
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStore for JsonSessionStore {
    /// # Summary
    /// 加载会话记录。
    ///
    /// # Logic
    /// 1. 文件不存在直接返回 `None`。
    /// 2. 读取并反序列化；解析失败按残缺记录处理，返回 `None` 并告警。
    /// 3. 字段残缺 (`is_complete` 不成立) 同样返回 `None`。
    async fn load(&self) -> Result<Option<Session>, StoreError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let session: Session = match serde_json::from_str(&raw) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("会话文件无法解析，按无会话处理: {}", e);
                return Ok(None);
            }
        };

        if !session.is_complete() {
            tracing::warn!("会话文件字段残缺，按无会话处理");
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// # Summary
    /// 原子覆写会话记录。
    ///
    /// # Logic
    /// 1. 序列化为带缩进的 JSON。
    /// 2. 写入同目录下的 `.tmp` 临时文件并 flush。
    /// 3. rename 到目标路径，一步完成替换。
    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(session)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json.as_bytes()).await?;
        fs::rename(&tmp, &self.path).await?;

        tracing::info!(user = %session.user_id, "会话凭据已持久化");
        Ok(())
    }

    /// 删除会话文件。幂等，返回是否确实删除了记录。
    async fn clear(&self) -> Result<bool, StoreError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
