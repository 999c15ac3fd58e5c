use kabu_core::broker::error::BrokerError;
use kabu_core::store::error::StoreError;
use thiserror::Error;

/// # Summary
/// 会话生命周期环节的统一错误类型。
/// 这是整个核心中唯一向上冒泡硬失败的路径：存量会话不可用
/// 且新的授权流程无法完成时，调用方确实没有凭据可用。
#[derive(Error, Debug)]
pub enum AuthError {
    /// 在配置的时限内未收到授权码回传
    #[error("等待授权码回传超时，请重新发起登录")]
    Timeout,
    /// 券商拒绝了授权码换取 (已使用/过期/非法)
    #[error("授权码换取会话失败: {0}")]
    CodeExchange(String),
    /// 授权码获取协作者自身失败 (监听器绑定失败、输入流关闭等)
    #[error("授权码获取失败: {0}")]
    CodeAcquisition(String),
    /// 探活或换码过程中的券商通道错误 (瞬态，不代表需要重新认证)
    #[error("券商通道错误: {0}")]
    Broker(#[from] BrokerError),
    /// 会话持久化失败
    #[error("会话存储错误: {0}")]
    Store(#[from] StoreError),
}
