//! # 测试替身
//!
//! 为下游 crate 的集成测试提供端口的内存版实现：
//! 可脚本化的 Mock 券商通道、内存会话存储、内存订单日志。
//! 仅在 `test-utils` feature 下编译，严禁用于生产路径。

use crate::broker::entity::{BrokerOrder, BrokerSession, NetPosition, OrderParams, Profile};
use crate::broker::error::BrokerError;
use crate::broker::port::BrokerClient;
use crate::session::entity::Session;
use crate::session::port::SessionStore;
use crate::store::error::StoreError;
use crate::trade::entity::{OrderLogEntry, Variety};
use crate::trade::port::OrderLog;
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// # Summary
/// 脚本化的 Mock 券商通道。每个操作的返回值都可以在测试中预置，
/// 并记录调用次数供断言。
pub struct MockBroker {
    profile_result: Mutex<Result<Profile, BrokerError>>,
    submit_result: Mutex<Result<String, BrokerError>>,
    exchange_result: Mutex<Result<BrokerSession, BrokerError>>,
    orders: Mutex<Result<Vec<BrokerOrder>, BrokerError>>,
    positions: Mutex<Result<Vec<NetPosition>, BrokerError>>,
    pub profile_calls: AtomicUsize,
    pub submit_calls: AtomicUsize,
    pub exchange_calls: AtomicUsize,
}

impl MockBroker {
    /// 全部操作成功的基准 Mock：探活通过、下单返回固定订单号。
    pub fn always_ok() -> Self {
        Self {
            profile_result: Mutex::new(Ok(Profile {
                user_id: "AB1234".into(),
                user_name: "Test User".into(),
            })),
            submit_result: Mutex::new(Ok("171000001".into())),
            exchange_result: Mutex::new(Ok(BrokerSession {
                access_token: "fresh_token".into(),
                user_id: "AB1234".into(),
                user_name: Some("Test User".into()),
            })),
            orders: Mutex::new(Ok(vec![BrokerOrder {
                order_id: "171000001".into(),
                status: "COMPLETE".into(),
            }])),
            positions: Mutex::new(Ok(vec![])),
            profile_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
            exchange_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_profile_result(&self, r: Result<Profile, BrokerError>) {
        *self.profile_result.lock().unwrap() = r;
    }

    pub fn set_submit_result(&self, r: Result<String, BrokerError>) {
        *self.submit_result.lock().unwrap() = r;
    }

    pub fn set_exchange_result(&self, r: Result<BrokerSession, BrokerError>) {
        *self.exchange_result.lock().unwrap() = r;
    }

    pub fn set_orders(&self, r: Result<Vec<BrokerOrder>, BrokerError>) {
        *self.orders.lock().unwrap() = r;
    }

    pub fn set_positions(&self, r: Result<Vec<NetPosition>, BrokerError>) {
        *self.positions.lock().unwrap() = r;
    }
}

#[async_trait]
impl BrokerClient for MockBroker {
    fn login_url(&self) -> String {
        "https://broker.test/connect/login?v=3&api_key=test".into()
    }

    async fn exchange_code(&self, _request_token: &str) -> Result<BrokerSession, BrokerError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        self.exchange_result.lock().unwrap().clone()
    }

    async fn profile(&self, _access_token: &str) -> Result<Profile, BrokerError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        self.profile_result.lock().unwrap().clone()
    }

    async fn submit_order(
        &self,
        _access_token: &str,
        _variety: Variety,
        _params: &OrderParams,
    ) -> Result<String, BrokerError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submit_result.lock().unwrap().clone()
    }

    async fn list_orders(&self, _access_token: &str) -> Result<Vec<BrokerOrder>, BrokerError> {
        self.orders.lock().unwrap().clone()
    }

    async fn net_positions(&self, _access_token: &str) -> Result<Vec<NetPosition>, BrokerError> {
        self.positions.lock().unwrap().clone()
    }
}

/// # Summary
/// 内存版会话存储，并记录写入次数供幂等性断言。
#[derive(Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
    pub save_calls: AtomicUsize,
    pub clear_calls: AtomicUsize,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置一条已存在的会话记录
    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
            save_calls: AtomicUsize::new(0),
            clear_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<Session>, StoreError> {
        let guard = self.session.lock().unwrap();
        // 残缺记录与缺失同义
        Ok(guard.clone().filter(Session::is_complete))
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<bool, StoreError> {
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.session.lock().unwrap().take().is_some())
    }
}

/// # Summary
/// 内存版订单日志，按行收集渲染结果供断言。
#[derive(Default)]
pub struct MemoryOrderLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryOrderLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderLog for MemoryOrderLog {
    async fn append(&self, entry: &OrderLogEntry) {
        self.lines.lock().unwrap().push(entry.to_line());
    }
}
