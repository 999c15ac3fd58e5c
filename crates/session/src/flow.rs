use crate::code_source::AuthCodeSource;
use crate::error::AuthError;
use chrono::Utc;
use kabu_core::broker::port::BrokerClient;
use kabu_core::session::entity::Session;
use std::sync::Arc;
use std::time::Duration;

/// 无显示名账户的兜底文案
const UNKNOWN_USER: &str = "Unknown";

/// # Summary
/// 授权流程：登录 URL → 等待一次性授权码 → 单次换码 → 完整会话。
///
/// # Invariants
/// - 等待授权码的时间由 `timeout` 严格约束，超时返回 `AuthError::Timeout`
///   并释放授权码协作者占用的资源。
/// - 换码恰好执行一次，失败即终止，绝不重试 (授权码是一次性的)。
/// - 本流程只产出会话，不负责持久化；落盘顺序由会话管理器保证。
pub struct AuthFlow {
    broker: Arc<dyn BrokerClient>,
    code_source: Arc<dyn AuthCodeSource>,
    timeout: Duration,
}

impl AuthFlow {
    pub fn new(
        broker: Arc<dyn BrokerClient>,
        code_source: Arc<dyn AuthCodeSource>,
        timeout: Duration,
    ) -> Self {
        Self {
            broker,
            code_source,
            timeout,
        }
    }

    /// # Summary
    /// 执行一轮完整的授权流程。
    ///
    /// # Logic
    /// 1. 向券商取得登录 URL。
    /// 2. 在超时界内等待授权码协作者交回一次性授权码。
    /// 3. 单次换码；券商拒绝时归为 `CodeExchange` 失败。
    /// 4. 以当前时间戳组装会话实体返回。
    ///
    /// # Returns
    /// * `Ok(Session)` - 全新的完整会话。
    /// * `Err(AuthError)` - 超时、换码被拒或通道故障。
    pub async fn run(&self) -> Result<Session, AuthError> {
        let login_url = self.broker.login_url();
        tracing::info!("发起券商授权流程");

        let request_token =
            tokio::time::timeout(self.timeout, self.code_source.obtain_code(&login_url))
                .await
                .map_err(|_| AuthError::Timeout)??;

        tracing::info!("授权码已捕获，正在换取访问凭据");

        let broker_session = self
            .broker
            .exchange_code(&request_token)
            .await
            .map_err(|e| AuthError::CodeExchange(e.raw_message().to_string()))?;

        let session = Session::new(
            broker_session.access_token,
            broker_session.user_id,
            broker_session
                .user_name
                .unwrap_or_else(|| UNKNOWN_USER.to_string()),
            Utc::now(),
        );

        tracing::info!(user = %session.user_id, "授权流程完成");
        Ok(session)
    }
}
