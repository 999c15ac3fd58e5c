use super::entity::{BrokerOrder, BrokerSession, NetPosition, OrderParams, Profile};
use super::error::BrokerError;
use crate::trade::entity::Variety;
use async_trait::async_trait;

/// # Summary
/// 券商通道抽象接口。会话管理器与订单网关通过此端口与真实券商 API 通讯，
/// 测试环境注入脚本化的 Mock 实现。
///
/// # Invariants
/// - 实现必须是 `Send + Sync`，可被任意数量并发请求共享。
/// - 适配器本身无会话状态：访问凭据由调用方逐次传入，
///   唯一的会话所有者是上层会话管理器。
/// - 所有失败必须归类为 `BrokerError` 的四个变体之一，不允许裸异常穿透。
#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// 券商登录页 URL，用户在该页面完成认证后授权码回传至 redirect_uri。
    fn login_url(&self) -> String;

    /// # Summary
    /// 用一次性授权码交换完整会话。
    ///
    /// # Logic
    /// 1. 按券商规范计算校验和并提交换码请求。
    /// 2. 授权码已用/过期/非法时返回 `BrokerError::Input`。
    ///
    /// # Arguments
    /// * `request_token`: 回调捕获到的一次性授权码。
    async fn exchange_code(&self, request_token: &str) -> Result<BrokerSession, BrokerError>;

    /// # Summary
    /// 拉取用户概要，作为凭据有效性探针。
    ///
    /// # Returns
    /// 凭据有效返回概要；过期/无效返回 `BrokerError::Auth`；
    /// 连接失败返回 `BrokerError::Network` (瞬态，不代表凭据失效)。
    async fn profile(&self, access_token: &str) -> Result<Profile, BrokerError>;

    /// # Summary
    /// 提交一笔委托。单次提交，无任何自动重试。
    ///
    /// # Returns
    /// 成功返回券商订单号 (结构化对象或裸字符串均被适配器接受并归一)。
    async fn submit_order(
        &self,
        access_token: &str,
        variety: Variety,
        params: &OrderParams,
    ) -> Result<String, BrokerError>;

    /// 拉取当日订单簿 (用于下单后的最佳努力状态回查)。
    async fn list_orders(&self, access_token: &str) -> Result<Vec<BrokerOrder>, BrokerError>;

    /// 拉取净持仓列表。
    async fn net_positions(&self, access_token: &str) -> Result<Vec<NetPosition>, BrokerError>;
}
