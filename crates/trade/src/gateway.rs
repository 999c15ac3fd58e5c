use crate::classify::classify;
use chrono::Utc;
use kabu_core::broker::entity::OrderParams;
use kabu_core::broker::port::BrokerClient;
use kabu_core::trade::entity::{ErrorKind, OrderLogEntry, OrderRequest, OrderResult};
use kabu_core::trade::port::OrderLog;
use kabu_session::manager::SessionManager;
use rust_decimal::Decimal;
use std::sync::Arc;

/// 状态回查失败时的哨兵值 (回查是最佳努力，失败不影响下单结果)
const STATUS_CHECK_FAILED: &str = "STATUS_CHECK_FAILED";
/// 订单簿中找不到新订单时的状态兜底
const STATUS_UNKNOWN: &str = "UNKNOWN";

/// # Summary
/// 订单网关，系统的中心操作。把一笔标准化请求走完
/// "校验 → 凭据 → 单次提交 → 状态回查 → 审计 → 归一结果" 的完整管线。
///
/// # Invariants
/// - 任何失败都不会以异常形式穿透：`place_order` 恒定返回 `OrderResult`。
/// - 券商提交恰好一次，任何失败类别都不自动重试——盲目重试下单调用
///   存在重复成交的风险。
/// - 每次下单尝试（无论成败）恰好产生一条审计日志。
pub struct OrderGateway {
    session: Arc<SessionManager>,
    broker: Arc<dyn BrokerClient>,
    order_log: Arc<dyn OrderLog>,
}

impl OrderGateway {
    pub fn new(
        session: Arc<SessionManager>,
        broker: Arc<dyn BrokerClient>,
        order_log: Arc<dyn OrderLog>,
    ) -> Self {
        Self {
            session,
            broker,
            order_log,
        }
    }

    /// # Summary
    /// 提交一笔委托并返回归一化结果。
    ///
    /// # Logic
    /// 1. 本地快速失败校验 (数量、价格字段约束)，不产生任何网络调用。
    /// 2. 向会话管理器取有效凭据；失败记 AUTH_FAILED 并直接返回，不提交。
    /// 3. 字段直映射构造券商原生参数，未设置的价格字段整体省略。
    /// 4. 单次提交。
    /// 5. 成功: 最佳努力回查券商侧订单状态 (回查失败记哨兵值，不算失败)，
    ///    记 SUCCESS 审计行。
    /// 6. 失败: 分类器定类 + 文案，记 FAILED 审计行 (携带原始报文)。
    pub async fn place_order(&self, request: OrderRequest) -> OrderResult {
        // 1. 本地校验先行，坏请求不应触发授权流程
        if let Some((kind, message, raw)) = validation_error(&request) {
            tracing::warn!(symbol = %request.symbol, kind = %kind, "本地校验拒绝: {}", raw);
            self.log_attempt(&request, "FAILED", None, Some("VALIDATION_FAILED"), Some(raw))
                .await;
            return OrderResult::Failure {
                kind,
                message: message.to_string(),
                raw_detail: raw.to_string(),
            };
        }

        // 2. 凭据
        let access_token = match self.session.get_valid_credential().await {
            Ok(token) => token,
            Err(e) => {
                let raw = e.to_string();
                tracing::warn!(symbol = %request.symbol, "下单前取凭据失败: {}", raw);
                self.log_attempt(&request, "FAILED", None, Some("AUTH_FAILED"), Some(&raw))
                    .await;
                return OrderResult::Failure {
                    kind: ErrorKind::Auth,
                    message: "Authentication token expired or invalid. Please re-authenticate."
                        .to_string(),
                    raw_detail: raw,
                };
            }
        };

        // 3. 字段直映射
        let params = OrderParams {
            exchange: request.exchange,
            tradingsymbol: request.symbol.clone(),
            transaction_type: request.side,
            quantity: request.quantity,
            product: request.product,
            order_type: request.order_kind,
            validity: request.validity,
            price: request.price,
            trigger_price: request.trigger_price,
        };

        // 4. 单次提交，绝不重试
        match self
            .broker
            .submit_order(&access_token, request.variety, &params)
            .await
        {
            Ok(order_id) => {
                // 5. 最佳努力状态回查
                let broker_status = match self.broker.list_orders(&access_token).await {
                    Ok(orders) => orders
                        .into_iter()
                        .find(|o| o.order_id == order_id)
                        .map(|o| o.status)
                        .unwrap_or_else(|| STATUS_UNKNOWN.to_string()),
                    Err(e) => {
                        tracing::warn!(order_id = %order_id, "订单状态回查失败 (不影响结果): {}", e.raw_message());
                        STATUS_CHECK_FAILED.to_string()
                    }
                };

                tracing::info!(order_id = %order_id, status = %broker_status, symbol = %request.symbol, "委托提交成功");
                self.log_attempt(
                    &request,
                    "SUCCESS",
                    Some(&order_id),
                    Some(&broker_status),
                    None,
                )
                .await;

                OrderResult::Success {
                    order_id,
                    broker_status,
                }
            }
            Err(e) => {
                // 6. 定类、审计、归一返回
                let (kind, message) = classify(&e);
                let raw = e.raw_message().to_string();
                let order_status = match kind {
                    ErrorKind::Auth => "AUTH_FAILED",
                    ErrorKind::Network => "NETWORK_ERROR",
                    ErrorKind::Unknown => "UNKNOWN_ERROR",
                    _ => "REJECTED",
                };

                tracing::warn!(symbol = %request.symbol, kind = %kind, "委托提交失败: {}", raw);
                self.log_attempt(&request, "FAILED", None, Some(order_status), Some(&raw))
                    .await;

                OrderResult::Failure {
                    kind,
                    message,
                    raw_detail: raw,
                }
            }
        }
    }

    async fn log_attempt(
        &self,
        request: &OrderRequest,
        status: &str,
        order_id: Option<&str>,
        order_status: Option<&str>,
        error_message: Option<&str>,
    ) {
        let entry = OrderLogEntry {
            timestamp: Utc::now(),
            status: status.to_string(),
            side: request.side,
            symbol: request.symbol.clone(),
            quantity: request.quantity,
            exchange: request.exchange,
            product: request.product,
            order_kind: request.order_kind,
            price: request.price,
            trigger_price: request.trigger_price,
            order_id: order_id.map(str::to_string),
            order_status: order_status.map(str::to_string),
            error_message: error_message.map(str::to_string),
        };
        self.order_log.append(&entry).await;
    }
}

/// # Summary
/// 本地快速失败校验：数量必须为正，LIMIT / SL 必须携带正的限价，
/// SL / SL-M 必须携带正的触发价。
///
/// # Returns
/// 命中返回 `(错误分类, 用户文案, 原始原因)`，通过返回 `None`。
fn validation_error(request: &OrderRequest) -> Option<(ErrorKind, &'static str, &'static str)> {
    if request.quantity == 0 {
        return Some((
            ErrorKind::InvalidQuantity,
            "Invalid quantity. Quantity must be a positive number of shares.",
            "quantity must be greater than zero",
        ));
    }
    if request.order_kind.requires_price() && !request.price.is_some_and(|p| p > Decimal::ZERO) {
        return Some((
            ErrorKind::InvalidPrice,
            "Invalid price specified. Please check your limit/trigger price.",
            "a positive price is required for LIMIT and SL orders",
        ));
    }
    if request.order_kind.requires_trigger()
        && !request.trigger_price.is_some_and(|p| p > Decimal::ZERO)
    {
        return Some((
            ErrorKind::InvalidPrice,
            "Invalid price specified. Please check your limit/trigger price.",
            "a positive trigger price is required for SL and SL-M orders",
        ));
    }
    None
}
