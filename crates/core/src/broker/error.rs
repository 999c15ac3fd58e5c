use thiserror::Error;

/// # Summary
/// 券商通道错误的类型化边界。适配器必须在此处完成归类，
/// 上层（错误分类器）按枚举匹配，而不是对异常文本盲猜。
///
/// # Invariants
/// - `Auth` 仅用于凭据过期/无效类失败，它会触发会话管理器的重新认证路径。
/// - `Network` 表示连接层失败，属于瞬态错误，绝不触发重新认证。
/// - 每个变体都携带券商侧的原始报文文本，供细粒度的文案分类使用。
#[derive(Error, Debug, Clone)]
pub enum BrokerError {
    /// 订单参数或输入被券商拒绝 (InputException)
    #[error("broker input error: {0}")]
    Input(String),
    /// 访问凭据过期或无效 (TokenException)
    #[error("broker auth error: {0}")]
    Auth(String),
    /// 网络或连接层失败
    #[error("broker network error: {0}")]
    Network(String),
    /// 未知或未分类的券商错误
    #[error("broker error: {0}")]
    Unknown(String),
}

impl BrokerError {
    /// 取出券商侧的原始报文文本
    pub fn raw_message(&self) -> &str {
        match self {
            BrokerError::Input(m)
            | BrokerError::Auth(m)
            | BrokerError::Network(m)
            | BrokerError::Unknown(m) => m,
        }
    }

    /// 是否属于认证类失败（需要重新走授权流程）
    pub fn is_auth(&self) -> bool {
        matches!(self, BrokerError::Auth(_))
    }
}
