//! # DTO (Data Transfer Object) 层
//!
//! 将内部领域模型转化为面向客户端 JSON 输出的轻量结构体。
//! 所有 DTO 必须派生 `utoipa::ToSchema` 以自动进入 Swagger 文档。

use kabu_core::session::entity::Session;
use kabu_core::trade::entity::{OrderRequest, OrderSide};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================
//  交易相关 DTO
// ============================================================

fn default_exchange() -> String {
    "NSE".to_string()
}
fn default_product() -> String {
    "CNC".to_string()
}
fn default_order_type() -> String {
    "MARKET".to_string()
}
fn default_variety() -> String {
    "regular".to_string()
}
fn default_validity() -> String {
    "DAY".to_string()
}

/// 下单请求体 (买卖共用，方向由路由决定)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderPlacementRequest {
    /// 标的代码
    #[schema(example = "RELIANCE")]
    pub stock: String,
    /// 委托数量
    #[schema(example = 10)]
    pub qty: u32,
    /// 交易所 (NSE, BSE, NFO, MCX, CDS)
    #[serde(default = "default_exchange")]
    #[schema(example = "NSE")]
    pub exchange: String,
    /// 产品类型 (CNC, MIS, NRML)
    #[serde(default = "default_product")]
    #[schema(example = "CNC")]
    pub product: String,
    /// 委托类型 (MARKET, LIMIT, SL, SL-M)
    #[serde(default = "default_order_type")]
    #[schema(example = "MARKET")]
    pub order_type: String,
    /// 限价 (LIMIT / SL 委托必填)
    #[schema(example = 2500.5)]
    pub price: Option<Decimal>,
    /// 触发价 (SL / SL-M 委托必填)
    pub trigger_price: Option<Decimal>,
    /// 委托分类 (regular, amo, co, iceberg)
    #[serde(default = "default_variety")]
    #[schema(example = "regular")]
    pub variety: String,
    /// 有效期 (DAY, IOC)
    #[serde(default = "default_validity")]
    #[schema(example = "DAY")]
    pub validity: String,
}

impl OrderPlacementRequest {
    /// # Summary
    /// 解析为标准化领域请求。枚举字段非法时返回错误文案 (映射 400)。
    pub fn into_domain(self, side: OrderSide) -> Result<OrderRequest, String> {
        Ok(OrderRequest {
            symbol: self.stock,
            quantity: self.qty,
            side,
            exchange: self.exchange.parse()?,
            product: self.product.parse()?,
            order_kind: self.order_type.parse()?,
            price: self.price,
            trigger_price: self.trigger_price,
            variety: self.variety.parse()?,
            validity: self.validity.parse()?,
        })
    }
}

/// 委托回显明细
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderDetails {
    #[schema(example = "RELIANCE")]
    pub stock: String,
    #[schema(example = 10)]
    pub quantity: u32,
    #[schema(example = "BUY")]
    pub transaction_type: String,
    #[schema(example = "NSE")]
    pub exchange: String,
    #[schema(example = "CNC")]
    pub product: String,
    #[schema(example = "MARKET")]
    pub order_type: String,
    pub price: Option<Decimal>,
    pub trigger_price: Option<Decimal>,
}

impl OrderDetails {
    pub fn from_domain(request: &OrderRequest) -> Self {
        Self {
            stock: request.symbol.clone(),
            quantity: request.quantity,
            transaction_type: request.side.to_string(),
            exchange: request.exchange.to_string(),
            product: request.product.to_string(),
            order_type: request.order_kind.to_string(),
            price: request.price,
            trigger_price: request.trigger_price,
        }
    }
}

/// 下单响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderPlacementResponse {
    /// 是否成功
    pub success: bool,
    /// 人类可读的结果描述
    #[schema(example = "BUY order placed: 10 units of RELIANCE")]
    pub message: String,
    /// 券商订单号 (成功时)
    #[schema(example = "171000001")]
    pub order_id: Option<String>,
    /// 券商侧订单状态 (成功时，最佳努力回查)
    #[schema(example = "COMPLETE")]
    pub order_status: Option<String>,
    /// 委托回显明细
    pub details: Option<OrderDetails>,
}

/// 持仓查询响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PositionsResponse {
    pub success: bool,
    #[schema(example = "Portfolio retrieved successfully")]
    pub message: String,
    /// 逐行格式化的持仓摘要
    #[schema(example = "RELIANCE: 10 shares @ ₹2501.5")]
    pub positions: Option<String>,
}

// ============================================================
//  鉴权相关 DTO
// ============================================================

/// 会话概要 (不含凭据本体)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionInfo {
    #[schema(example = "AB1234")]
    pub user_id: String,
    #[schema(example = "Example User")]
    pub user_name: String,
    /// 会话创建日期 (ISO 8601)
    #[schema(example = "2026-08-06T09:30:15Z")]
    pub created_date: String,
    /// 会话创建时刻
    #[schema(example = "09:30:15")]
    pub created_time: String,
}

impl From<Session> for SessionInfo {
    fn from(s: Session) -> Self {
        Self {
            user_id: s.user_id,
            user_name: s.user_name,
            created_date: s.created_date.to_rfc3339(),
            created_time: s.created_time,
        }
    }
}

/// 认证状态/登出响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    #[schema(example = "Authenticated")]
    pub message: String,
    /// 当前会话概要 (已认证时)
    pub user_info: Option<SessionInfo>,
}

// ============================================================
//  通用响应 DTO
// ============================================================

/// 健康检查响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "running")]
    pub status: String,
    #[schema(example = "Kabu Trading API")]
    pub service: String,
    #[schema(example = "0.1.0")]
    pub version: String,
    /// 服务器当前时间 (ISO 8601)
    pub timestamp: String,
}

/// 统一失败响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 固定为 false
    pub success: bool,
    /// 错误描述信息
    pub message: String,
}

impl ApiErrorResponse {
    /// 从错误信息构建
    pub fn from_msg(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            message: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults_fill_in() {
        let req: OrderPlacementRequest =
            serde_json::from_str(r#"{"stock": "RELIANCE", "qty": 10}"#).unwrap();
        assert_eq!(req.exchange, "NSE");
        assert_eq!(req.product, "CNC");
        assert_eq!(req.order_type, "MARKET");
        assert_eq!(req.variety, "regular");
        assert_eq!(req.validity, "DAY");
    }

    #[test]
    fn test_into_domain_parses_enums() {
        let req: OrderPlacementRequest = serde_json::from_str(
            r#"{"stock": "NIFTY2561926000CE", "qty": 50, "exchange": "NFO", "product": "NRML", "order_type": "SL-M", "trigger_price": 120.5}"#,
        )
        .unwrap();
        let domain = req.into_domain(OrderSide::Sell).unwrap();
        assert_eq!(domain.exchange.to_string(), "NFO");
        assert_eq!(domain.order_kind.to_string(), "SL-M");
        assert_eq!(domain.side, OrderSide::Sell);
    }

    #[test]
    fn test_into_domain_rejects_unknown_exchange() {
        let req: OrderPlacementRequest =
            serde_json::from_str(r#"{"stock": "RELIANCE", "qty": 10, "exchange": "NYSE"}"#)
                .unwrap();
        let err = req.into_domain(OrderSide::Buy).unwrap_err();
        assert!(err.contains("Unknown exchange"));
    }
}
