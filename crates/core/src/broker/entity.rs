use crate::trade::entity::{Exchange, OrderKind, OrderSide, Product, Validity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// # Summary
/// 券商原生下单参数集。由订单网关从标准化请求直接映射而来，
/// 可选价格字段未设置时在报文中整体省略。
#[derive(Debug, Clone, Serialize)]
pub struct OrderParams {
    pub exchange: Exchange,
    pub tradingsymbol: String,
    pub transaction_type: OrderSide,
    pub quantity: u32,
    pub product: Product,
    pub order_type: OrderKind,
    pub validity: Validity,
    pub price: Option<Decimal>,
    pub trigger_price: Option<Decimal>,
}

/// # Summary
/// 券商订单簿中一条委托的最小投影，用于下单后的状态回查。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerOrder {
    pub order_id: String,
    /// 券商侧状态文本 (OPEN / COMPLETE / REJECTED ...)
    pub status: String,
}

/// # Summary
/// 券商净持仓记录。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetPosition {
    pub tradingsymbol: String,
    pub quantity: i64,
    pub last_price: Decimal,
}

/// # Summary
/// 券商用户概要，作为凭据有效性的轻量探针返回值。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub user_name: String,
}

/// # Summary
/// 换码成功后券商返回的完整会话数据。
#[derive(Debug, Clone, Deserialize)]
pub struct BrokerSession {
    pub access_token: String,
    pub user_id: String,
    /// 部分账户无显示名，缺失时由上层以占位值兜底
    #[serde(default)]
    pub user_name: Option<String>,
}
