use async_trait::async_trait;
use chrono::Utc;
use kabu_core::broker::error::BrokerError;
use kabu_core::config::AuthConfig;
use kabu_core::config::CodeSourceKind;
use kabu_core::session::entity::Session;
use kabu_core::session::port::SessionStore;
use kabu_core::test_utils::{MemorySessionStore, MockBroker};
use kabu_session::code_source::AuthCodeSource;
use kabu_session::error::AuthError;
use kabu_session::manager::SessionManager;
use std::sync::Arc;
use std::sync::atomic::Ordering;

/// 始终立即交回固定授权码的测试替身
struct FixedCodeSource(&'static str);

#[async_trait]
impl AuthCodeSource for FixedCodeSource {
    async fn obtain_code(&self, _login_url: &str) -> Result<String, AuthError> {
        Ok(self.0.to_string())
    }
}

/// 永远不交回授权码，用于超时路径
struct NeverCodeSource;

#[async_trait]
impl AuthCodeSource for NeverCodeSource {
    async fn obtain_code(&self, _login_url: &str) -> Result<String, AuthError> {
        std::future::pending().await
    }
}

fn auth_config(timeout_secs: u64, clear_store_on_invalid: bool) -> AuthConfig {
    AuthConfig {
        login_timeout_secs: timeout_secs,
        clear_store_on_invalid,
        code_source: CodeSourceKind::Callback,
    }
}

fn stored_session(token: &str) -> Session {
    Session::new(token.into(), "AB1234".into(), "Test User".into(), Utc::now())
}

fn manager(
    broker: Arc<MockBroker>,
    store: Arc<MemorySessionStore>,
    auth: &AuthConfig,
) -> Arc<SessionManager> {
    SessionManager::new(broker, store, Arc::new(FixedCodeSource("reqtok")), auth)
}

#[tokio::test]
async fn test_valid_stored_session_returns_without_flow() {
    let broker = Arc::new(MockBroker::always_ok());
    let store = Arc::new(MemorySessionStore::with_session(stored_session("stored_tok")));
    let mgr = manager(broker.clone(), store.clone(), &auth_config(300, false));

    let token = mgr.get_valid_credential().await.unwrap();
    assert_eq!(token, "stored_tok");
    assert_eq!(broker.exchange_calls.load(Ordering::SeqCst), 0, "探活通过不应触发授权流程");
    assert_eq!(store.save_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_session_runs_flow_and_persists_before_return() {
    let broker = Arc::new(MockBroker::always_ok());
    let store = Arc::new(MemorySessionStore::new());
    let mgr = manager(broker.clone(), store.clone(), &auth_config(300, false));

    let token = mgr.get_valid_credential().await.unwrap();
    assert_eq!(token, "fresh_token");
    assert_eq!(broker.exchange_calls.load(Ordering::SeqCst), 1);
    // 先持久化再交付：凭据返回时记录必须已经落位
    assert_eq!(store.save_calls.load(Ordering::SeqCst), 1);
    let persisted = store.load().await.unwrap().expect("新会话应已持久化");
    assert_eq!(persisted.access_token, "fresh_token");
}

#[tokio::test]
async fn test_invalid_token_triggers_reauth_keeping_file_by_default() {
    let broker = Arc::new(MockBroker::always_ok());
    broker.set_profile_result(Err(BrokerError::Auth("Incorrect api_key or access_token".into())));
    let store = Arc::new(MemorySessionStore::with_session(stored_session("stale_tok")));
    let mgr = manager(broker.clone(), store.clone(), &auth_config(300, false));

    let token = mgr.get_valid_credential().await.unwrap();
    assert_eq!(token, "fresh_token");
    assert_eq!(broker.exchange_calls.load(Ordering::SeqCst), 1);
    // 默认策略：不主动删除持久化记录，由新会话覆盖
    assert_eq!(store.clear_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_invalid_token_clears_store_when_configured() {
    let broker = Arc::new(MockBroker::always_ok());
    broker.set_profile_result(Err(BrokerError::Auth("token expired".into())));
    let store = Arc::new(MemorySessionStore::with_session(stored_session("stale_tok")));
    let mgr = manager(broker.clone(), store.clone(), &auth_config(300, true));

    mgr.get_valid_credential().await.unwrap();
    assert_eq!(store.clear_calls.load(Ordering::SeqCst), 1, "配置要求探活失败时清除文件");
}

#[tokio::test]
async fn test_transient_probe_failure_does_not_reauth() {
    let broker = Arc::new(MockBroker::always_ok());
    broker.set_profile_result(Err(BrokerError::Network("connection reset".into())));
    let store = Arc::new(MemorySessionStore::with_session(stored_session("stored_tok")));
    let mgr = manager(broker.clone(), store.clone(), &auth_config(300, false));

    let err = mgr.get_valid_credential().await.unwrap_err();
    assert!(matches!(err, AuthError::Broker(BrokerError::Network(_))), "瞬态故障应原样上抛");
    assert_eq!(broker.exchange_calls.load(Ordering::SeqCst), 0, "网络故障不得触发重新认证");

    // 故障恢复后存量凭据继续可用
    broker.set_profile_result(Ok(kabu_core::broker::entity::Profile {
        user_id: "AB1234".into(),
        user_name: "Test User".into(),
    }));
    assert_eq!(mgr.get_valid_credential().await.unwrap(), "stored_tok");
}

#[tokio::test]
async fn test_is_authenticated_is_idempotent_and_writes_nothing() {
    let broker = Arc::new(MockBroker::always_ok());
    let store = Arc::new(MemorySessionStore::with_session(stored_session("stored_tok")));
    let mgr = manager(broker.clone(), store.clone(), &auth_config(300, false));

    let first = mgr.is_authenticated().await;
    let second = mgr.is_authenticated().await;
    assert!(first && second, "连续两次查询结果应一致");
    assert_eq!(store.save_calls.load(Ordering::SeqCst), 0, "状态查询不得产生持久化写入");
    assert_eq!(broker.exchange_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_is_authenticated_false_without_session_or_on_probe_failure() {
    let broker = Arc::new(MockBroker::always_ok());
    let empty = Arc::new(MemorySessionStore::new());
    let mgr = manager(broker.clone(), empty, &auth_config(300, false));
    assert!(!mgr.is_authenticated().await);

    broker.set_profile_result(Err(BrokerError::Auth("expired".into())));
    let store = Arc::new(MemorySessionStore::with_session(stored_session("stale")));
    let mgr = manager(broker.clone(), store, &auth_config(300, false));
    assert!(!mgr.is_authenticated().await);
}

#[tokio::test]
async fn test_clear_session_then_not_authenticated() {
    let broker = Arc::new(MockBroker::always_ok());
    let store = Arc::new(MemorySessionStore::with_session(stored_session("stored_tok")));
    let mgr = manager(broker, store, &auth_config(300, false));

    assert!(mgr.clear_session().await.unwrap(), "首次登出应删除记录");
    assert!(!mgr.is_authenticated().await);
    assert!(!mgr.clear_session().await.unwrap(), "重复登出应幂等返回 false");
}

#[tokio::test]
async fn test_flow_timeout_surfaces_as_timeout_error() {
    let broker = Arc::new(MockBroker::always_ok());
    let store = Arc::new(MemorySessionStore::new());
    let mgr = SessionManager::new(
        broker,
        store,
        Arc::new(NeverCodeSource),
        &auth_config(0, false),
    );

    let err = mgr.get_valid_credential().await.unwrap_err();
    assert!(matches!(err, AuthError::Timeout));
}

#[tokio::test]
async fn test_code_exchange_rejection_surfaces() {
    let broker = Arc::new(MockBroker::always_ok());
    broker.set_exchange_result(Err(BrokerError::Input(
        "Token is invalid or has expired.".into(),
    )));
    let store = Arc::new(MemorySessionStore::new());
    let mgr = manager(broker, store.clone(), &auth_config(300, false));

    let err = mgr.get_valid_credential().await.unwrap_err();
    match err {
        AuthError::CodeExchange(msg) => assert!(msg.contains("invalid or has expired")),
        other => panic!("错误类型不符: {:?}", other),
    }
    assert_eq!(store.save_calls.load(Ordering::SeqCst), 0, "换码失败不得落盘");
}

#[tokio::test]
async fn test_concurrent_callers_share_single_flow() {
    let broker = Arc::new(MockBroker::always_ok());
    let store = Arc::new(MemorySessionStore::new());
    let mgr = manager(broker.clone(), store, &auth_config(300, false));

    let a = {
        let mgr = mgr.clone();
        tokio::spawn(async move { mgr.get_valid_credential().await })
    };
    let b = {
        let mgr = mgr.clone();
        tokio::spawn(async move { mgr.get_valid_credential().await })
    };

    let (ra, rb) = (a.await.unwrap().unwrap(), b.await.unwrap().unwrap());
    assert_eq!(ra, "fresh_token");
    assert_eq!(rb, "fresh_token");
    // 两个并发调用方排队共享一轮流程，换码只发生一次
    assert_eq!(broker.exchange_calls.load(Ordering::SeqCst), 1);
}
