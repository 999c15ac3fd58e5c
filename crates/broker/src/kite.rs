use async_trait::async_trait;
use kabu_core::broker::entity::{BrokerOrder, BrokerSession, NetPosition, OrderParams, Profile};
use kabu_core::broker::error::BrokerError;
use kabu_core::broker::port::BrokerClient;
use kabu_core::trade::entity::Variety;
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;

/// Kite Connect REST API 根地址
const DEFAULT_API_BASE: &str = "https://api.kite.trade";
/// Kite 登录页根地址
const LOGIN_BASE: &str = "https://kite.zerodha.com/connect/login";
/// 接口版本头，Kite 要求所有请求携带
const KITE_VERSION: &str = "3";

/// # Summary
/// Kite Connect 券商通道实现。
///
/// # Invariants
/// - 使用 `reqwest` 异步客户端进行通讯，10 秒超时。
/// - 适配器无会话状态：访问凭据逐次由调用方传入，
///   以 `Authorization: token api_key:access_token` 头发出。
#[derive(Clone)]
pub struct KiteClient {
    /// 内部使用的 HTTP 客户端
    client: Client,
    api_key: String,
    api_secret: String,
    api_base: String,
}

impl KiteClient {
    /// # Summary
    /// 创建一个新的 KiteClient 实例。
    ///
    /// # Logic
    /// 1. 配置 10 秒超时与 `X-Kite-Version` 默认头。
    /// 2. 初始化 reqwest 客户端。
    ///
    /// # Arguments
    /// * `api_key` / `api_secret`: 券商后台签发的应用凭据。
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Ok(v) = KITE_VERSION.parse() {
            headers.insert("X-Kite-Version", v);
        }

        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .default_headers(headers)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// 覆盖 API 根地址 (集成测试指向本地假券商)。
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    fn auth_header(&self, access_token: &str) -> String {
        format!("token {}:{}", self.api_key, access_token)
    }

    /// 换码请求的校验和: SHA-256(api_key + request_token + api_secret) 十六进制
    fn checksum(&self, request_token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.api_key.as_bytes());
        hasher.update(request_token.as_bytes());
        hasher.update(self.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// # Summary
    /// 解析 Kite 的统一 JSON 信封并完成错误归类。
    ///
    /// # Logic
    /// 1. `status == "error"` 时按 `error_type` 归类:
    ///    TokenException → Auth, InputException → Input,
    ///    NetworkException → Network, 其余 → Unknown。
    /// 2. 成功但缺少 data 字段视为 Unknown (协议异常)。
    async fn parse_envelope<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, BrokerError> {
        let http_status = resp.status();
        let envelope: KiteEnvelope<T> = resp
            .json()
            .await
            .map_err(|e| BrokerError::Network(format!("Malformed broker response: {}", e)))?;

        if envelope.status == "success" {
            return envelope
                .data
                .ok_or_else(|| BrokerError::Unknown("Broker response missing data".into()));
        }

        let message = envelope
            .message
            .unwrap_or_else(|| format!("HTTP {}", http_status));
        Err(match envelope.error_type.as_deref() {
            Some("TokenException") => BrokerError::Auth(message),
            Some("InputException") => BrokerError::Input(message),
            Some("NetworkException") => BrokerError::Network(message),
            _ if http_status.is_server_error() => BrokerError::Network(message),
            _ => BrokerError::Unknown(message),
        })
    }

    fn transport_error(e: reqwest::Error) -> BrokerError {
        BrokerError::Network(e.to_string())
    }
}

/// # Summary
/// Kite API 统一响应信封。
#[derive(Deserialize, Debug)]
struct KiteEnvelope<T> {
    status: String,
    data: Option<T>,
    message: Option<String>,
    error_type: Option<String>,
}

/// # Summary
/// 下单接口返回的订单号载荷。
/// Kite 偶尔直接返回裸字符串订单号，两种形态都要接受。
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum OrderIdPayload {
    Object { order_id: String },
    Bare(String),
}

impl OrderIdPayload {
    fn into_order_id(self) -> String {
        match self {
            OrderIdPayload::Object { order_id } => order_id,
            OrderIdPayload::Bare(s) => s,
        }
    }
}

/// # Summary
/// 持仓接口的 data 载荷，净持仓位于 `net` 数组。
#[derive(Deserialize, Debug)]
struct PositionsPayload {
    net: Vec<NetPosition>,
}

#[async_trait]
impl BrokerClient for KiteClient {
    fn login_url(&self) -> String {
        format!("{}?v=3&api_key={}", LOGIN_BASE, self.api_key)
    }

    /// # Summary
    /// 用一次性授权码交换访问凭据。
    ///
    /// # Logic
    /// 1. 计算校验和并以表单提交 `/session/token`。
    /// 2. 授权码已用/过期时 Kite 返回 TokenException——对换码而言
    ///    这属于输入拒绝而非会话失效，归类为 `Input` 交由流程层处理。
    async fn exchange_code(&self, request_token: &str) -> Result<BrokerSession, BrokerError> {
        let form = [
            ("api_key", self.api_key.clone()),
            ("request_token", request_token.to_string()),
            ("checksum", self.checksum(request_token)),
        ];

        tracing::debug!("向券商发起授权码换取");
        let resp = self
            .client
            .post(format!("{}/session/token", self.api_base))
            .form(&form)
            .send()
            .await
            .map_err(Self::transport_error)?;

        match Self::parse_envelope::<BrokerSession>(resp).await {
            Ok(session) => Ok(session),
            // 换码阶段的 TokenException 意味着授权码本身被拒绝
            Err(BrokerError::Auth(msg)) => Err(BrokerError::Input(msg)),
            Err(e) => Err(e),
        }
    }

    async fn profile(&self, access_token: &str) -> Result<Profile, BrokerError> {
        let resp = self
            .client
            .get(format!("{}/user/profile", self.api_base))
            .header("Authorization", self.auth_header(access_token))
            .send()
            .await
            .map_err(Self::transport_error)?;

        Self::parse_envelope(resp).await
    }

    /// # Summary
    /// 提交一笔委托。单次提交，无自动重试。
    ///
    /// # Logic
    /// 1. 将标准化参数逐字段映射为 Kite 表单；未设置的价格字段整体省略。
    /// 2. POST `/orders/{variety}`。
    /// 3. 归一订单号载荷 (对象或裸字符串)。
    async fn submit_order(
        &self,
        access_token: &str,
        variety: Variety,
        params: &OrderParams,
    ) -> Result<String, BrokerError> {
        let mut form = vec![
            ("exchange", params.exchange.to_string()),
            ("tradingsymbol", params.tradingsymbol.clone()),
            ("transaction_type", params.transaction_type.to_string()),
            ("quantity", params.quantity.to_string()),
            ("product", params.product.to_string()),
            ("order_type", params.order_type.to_string()),
            ("validity", params.validity.to_string()),
        ];
        if let Some(price) = params.price {
            form.push(("price", price.to_string()));
        }
        if let Some(trigger) = params.trigger_price {
            form.push(("trigger_price", trigger.to_string()));
        }

        tracing::debug!(symbol = %params.tradingsymbol, variety = %variety, "提交委托到券商");
        let resp = self
            .client
            .post(format!("{}/orders/{}", self.api_base, variety))
            .header("Authorization", self.auth_header(access_token))
            .form(&form)
            .send()
            .await
            .map_err(Self::transport_error)?;

        Self::parse_envelope::<OrderIdPayload>(resp)
            .await
            .map(OrderIdPayload::into_order_id)
    }

    async fn list_orders(&self, access_token: &str) -> Result<Vec<BrokerOrder>, BrokerError> {
        let resp = self
            .client
            .get(format!("{}/orders", self.api_base))
            .header("Authorization", self.auth_header(access_token))
            .send()
            .await
            .map_err(Self::transport_error)?;

        Self::parse_envelope(resp).await
    }

    async fn net_positions(&self, access_token: &str) -> Result<Vec<NetPosition>, BrokerError> {
        let resp = self
            .client
            .get(format!("{}/portfolio/positions", self.api_base))
            .header("Authorization", self.auth_header(access_token))
            .send()
            .await
            .map_err(Self::transport_error)?;

        Self::parse_envelope::<PositionsPayload>(resp)
            .await
            .map(|p| p.net)
    }
}
