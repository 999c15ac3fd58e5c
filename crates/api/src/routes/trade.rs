//! # 订单交易路由控制器
//!
//! 买入、卖出与持仓查询。请求体解析为标准化领域请求后全部经由
//! `OrderGateway` 提交；归一化失败按分类映射 HTTP 状态
//! (AUTH_ERROR → 401，其余 → 400)。

use axum::Json;
use axum::extract::State;

use kabu_core::trade::entity::{ErrorKind, OrderResult, OrderSide};

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{
    OrderDetails, OrderPlacementRequest, OrderPlacementResponse, PositionsResponse,
};

/// 买卖共用的下单管线
async fn place(
    state: &AppState,
    request: OrderPlacementRequest,
    side: OrderSide,
) -> Result<Json<OrderPlacementResponse>, ApiError> {
    let domain = request
        .into_domain(side)
        .map_err(ApiError::BadRequest)?;
    let details = OrderDetails::from_domain(&domain);

    // 回显文案: "10 units of RELIANCE at ₹2500.5 (LIMIT)"
    let mut described = format!("{} units of {}", domain.quantity, domain.symbol);
    if let Some(price) = domain.price {
        described.push_str(&format!(" at ₹{}", price));
    }
    if domain.order_kind != kabu_core::trade::entity::OrderKind::Market {
        described.push_str(&format!(" ({})", domain.order_kind));
    }

    match state.gateway.place_order(domain).await {
        OrderResult::Success {
            order_id,
            broker_status,
        } => Ok(Json(OrderPlacementResponse {
            success: true,
            message: format!("{} order placed: {}", side, described),
            order_id: Some(order_id),
            order_status: Some(broker_status),
            details: Some(details),
        })),
        OrderResult::Failure { kind, message, .. } => match kind {
            ErrorKind::Auth => Err(ApiError::Unauthorized(message)),
            _ => Err(ApiError::BadRequest(message)),
        },
    }
}

/// 买入
///
/// 支持股票、期货、期权等全部可交易标的，覆盖所有交易所与委托类型。
#[utoipa::path(
    post,
    path = "/trade/buy",
    tag = "订单交易 (Trade)",
    request_body = OrderPlacementRequest,
    responses(
        (status = 200, description = "委托提交成功", body = OrderPlacementResponse),
        (status = 400, description = "参数非法或券商拒单"),
        (status = 401, description = "会话失效，需要重新认证")
    )
)]
pub async fn buy_stock(
    State(state): State<AppState>,
    Json(request): Json<OrderPlacementRequest>,
) -> Result<Json<OrderPlacementResponse>, ApiError> {
    place(&state, request, OrderSide::Buy).await
}

/// 卖出
///
/// 与买入同构，方向固定为 SELL。
#[utoipa::path(
    post,
    path = "/trade/sell",
    tag = "订单交易 (Trade)",
    request_body = OrderPlacementRequest,
    responses(
        (status = 200, description = "委托提交成功", body = OrderPlacementResponse),
        (status = 400, description = "参数非法或券商拒单"),
        (status = 401, description = "会话失效，需要重新认证")
    )
)]
pub async fn sell_stock(
    State(state): State<AppState>,
    Json(request): Json<OrderPlacementRequest>,
) -> Result<Json<OrderPlacementResponse>, ApiError> {
    place(&state, request, OrderSide::Sell).await
}

/// 查询持仓
///
/// 返回逐行格式化的净持仓摘要，零仓记录已过滤。
#[utoipa::path(
    get,
    path = "/trade/positions",
    tag = "订单交易 (Trade)",
    responses(
        (status = 200, description = "持仓查询成功", body = PositionsResponse),
        (status = 401, description = "会话失效，需要重新认证")
    )
)]
pub async fn get_portfolio(State(state): State<AppState>) -> Json<PositionsResponse> {
    let summary = state.positions.summary().await;
    Json(PositionsResponse {
        success: true,
        message: "Portfolio retrieved successfully".into(),
        positions: Some(summary),
    })
}
