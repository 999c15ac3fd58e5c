use crate::code_source::AuthCodeSource;
use crate::error::AuthError;
use crate::flow::AuthFlow;
use kabu_core::broker::port::BrokerClient;
use kabu_core::config::AuthConfig;
use kabu_core::session::entity::Session;
use kabu_core::session::port::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// # Summary
/// 会话管理器，进程内唯一的会话所有者。
/// 订单网关与持仓读取器都通过它获取可用凭据，自身不持有任何凭据副本。
///
/// # Invariants
/// - 内存会话与授权流程的状态迁移全部串行在同一把异步互斥锁之后：
///   任意时刻至多一轮授权流程在途，并发触发的调用方排队共享其结果。
/// - "先持久化再交付凭据"：换码成功后必须先落盘，再把凭据返回给调用方，
///   换码后崩溃不会丢失已取得的会话。
/// - 探活失败仅在认证类错误时触发重新认证；瞬态错误原样上抛。
pub struct SessionManager {
    broker: Arc<dyn BrokerClient>,
    store: Arc<dyn SessionStore>,
    flow: AuthFlow,
    /// 探活失败时是否连同持久化记录一起清除 (默认仅丢弃内存态)
    clear_store_on_invalid: bool,
    /// 进程内唯一的会话实例
    current: Mutex<Option<Session>>,
}

impl SessionManager {
    /// # Summary
    /// 组装会话管理器。
    ///
    /// # Arguments
    /// * `broker` - 券商通道端口。
    /// * `store` - 会话持久化端口。
    /// * `code_source` - 授权码获取协作者 (按配置选择实现)。
    /// * `auth` - 授权相关配置 (超时、探活失败策略)。
    pub fn new(
        broker: Arc<dyn BrokerClient>,
        store: Arc<dyn SessionStore>,
        code_source: Arc<dyn AuthCodeSource>,
        auth: &AuthConfig,
    ) -> Arc<Self> {
        let flow = AuthFlow::new(
            broker.clone(),
            code_source,
            Duration::from_secs(auth.login_timeout_secs),
        );
        Arc::new(Self {
            broker,
            store,
            flow,
            clear_store_on_invalid: auth.clear_store_on_invalid,
            current: Mutex::new(None),
        })
    }

    /// # Summary
    /// 返回一个当前可用的访问凭据，必要时透明地走一轮授权流程。
    ///
    /// # Logic
    /// 1. 内存无会话时从持久化存储加载。
    /// 2. 仍无会话 → 直接发起授权流程。
    /// 3. 有会话 → 以拉取用户概要作为轻量探活。
    /// 4. 探活通过 → 返回存量凭据。
    /// 5. 探活报认证错误 → 丢弃内存态 (按策略决定是否清文件)，重新授权。
    /// 6. 探活报其他错误 → 视为瞬态故障上抛，不触发重新认证。
    ///
    /// # Returns
    /// * `Ok(String)` - 可用的访问凭据。
    /// * `Err(AuthError)` - 存量会话不可用且新授权流程未能完成。
    pub async fn get_valid_credential(&self) -> Result<String, AuthError> {
        let mut current = self.current.lock().await;

        if current.is_none() {
            *current = self.store.load().await?;
        }

        let Some(session) = current.as_ref() else {
            tracing::info!("无存量会话，发起全新授权");
            return self.authenticate(&mut current).await;
        };

        match self.broker.profile(&session.access_token).await {
            Ok(profile) => {
                tracing::debug!(user = %profile.user_id, "存量凭据探活通过");
                Ok(session.access_token.clone())
            }
            Err(e) if e.is_auth() => {
                tracing::warn!("存量凭据已失效，需要重新认证: {}", e.raw_message());
                *current = None;
                if self.clear_store_on_invalid {
                    self.store.clear().await?;
                }
                self.authenticate(&mut current).await
            }
            Err(e) => {
                tracing::warn!("凭据探活遭遇瞬态故障: {}", e.raw_message());
                Err(AuthError::Broker(e))
            }
        }
    }

    /// 执行授权流程并按"先持久化再交付"落位新会话
    async fn authenticate(
        &self,
        current: &mut Option<Session>,
    ) -> Result<String, AuthError> {
        let session = self.flow.run().await?;
        self.store.save(&session).await?;

        let token = session.access_token.clone();
        *current = Some(session);
        Ok(token)
    }

    /// # Summary
    /// 判断当前是否处于已认证状态。
    ///
    /// # Logic
    /// 1. 加载持久化会话，缺失即未认证。
    /// 2. 对存量凭据做一次探活，任何失败都按未认证处理。
    ///
    /// # Invariants
    /// - 永不失败、永不触发授权流程、不产生任何持久化写入。
    pub async fn is_authenticated(&self) -> bool {
        match self.store.load().await {
            Ok(Some(session)) => self.broker.profile(&session.access_token).await.is_ok(),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!("读取会话存储失败: {}", e);
                false
            }
        }
    }

    /// # Summary
    /// 显式登出：删除持久化记录并丢弃内存会话。幂等。
    ///
    /// # Returns
    /// 返回是否确实删除了一条持久化记录。
    pub async fn clear_session(&self) -> Result<bool, AuthError> {
        let mut current = self.current.lock().await;
        *current = None;
        let removed = self.store.clear().await?;
        if removed {
            tracing::info!("会话已清除，下次操作将要求重新认证");
        }
        Ok(removed)
    }

    /// 读取持久化的会话概要 (供状态查询接口展示，不做探活)
    pub async fn session_info(&self) -> Option<Session> {
        self.store.load().await.ok().flatten()
    }
}
