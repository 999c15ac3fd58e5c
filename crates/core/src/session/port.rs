use super::entity::Session;
use crate::store::error::StoreError;
use async_trait::async_trait;

/// # Summary
/// 会话凭据持久化接口。纯粹的被动存储协作者，不包含任何业务判断：
/// 凭据是否有效、何时重新认证均由上层会话管理器决定。
///
/// # Invariants
/// - 实现必须是 `Send + Sync`，同一存储可能被多个并发请求共享。
/// - `save` 必须是原子落盘：要么读到完整的新记录，要么读到旧记录，
///   不允许出现半写状态。
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// # Summary
    /// 加载持久化的会话记录。
    ///
    /// # Logic
    /// 1. 读取并反序列化存储介质中的记录。
    /// 2. 记录缺失、无法解析或字段残缺时返回 `None`（残缺视为不存在）。
    ///
    /// # Returns
    /// 存在且完整返回 `Some(Session)`，否则返回 `None`。
    async fn load(&self) -> Result<Option<Session>, StoreError>;

    /// # Summary
    /// 保存（覆盖）会话记录。
    ///
    /// # Arguments
    /// * `session`: 待持久化的完整会话。
    async fn save(&self, session: &Session) -> Result<(), StoreError>;

    /// # Summary
    /// 删除持久化的会话记录。幂等：记录不存在时不报错。
    ///
    /// # Returns
    /// 返回是否确实删除了一条记录。
    async fn clear(&self) -> Result<bool, StoreError>;
}
