use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// # Summary
/// 会话实体，代表一次已通过券商认证的交易身份。
/// 由授权流程在换码成功后创建，立即持久化，进程或请求启动时加载。
///
/// # Invariants
/// - 会话要么完整存在（所有必填字段非空），要么视为不存在；
///   残缺记录一律按不存在处理，不允许半初始化状态流入下游。
/// - 凭据失效时仅作"无效化"（丢弃内存态），持久化记录是否删除由配置决定；
///   显式登出才会删除持久化记录。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// 券商颁发的不透明访问凭据
    pub access_token: String,
    /// 券商侧用户唯一标识
    pub user_id: String,
    /// 用户显示名称
    pub user_name: String,
    /// 会话创建日期 (ISO 8601)
    pub created_date: DateTime<Utc>,
    /// 会话创建时刻 (HH:MM:SS，便于人工核对当日会话)
    pub created_time: String,
}

impl Session {
    /// # Logic
    /// 以当前时间戳构建一个全新的会话记录。
    pub fn new(
        access_token: String,
        user_id: String,
        user_name: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token,
            user_id,
            user_name,
            created_date: now,
            created_time: now.format("%H:%M:%S").to_string(),
        }
    }

    /// 判断记录是否完整。任一必填字段为空即视为残缺。
    pub fn is_complete(&self) -> bool {
        !self.access_token.is_empty() && !self.user_id.is_empty()
    }
}
