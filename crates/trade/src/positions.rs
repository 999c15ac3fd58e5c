use crate::classify::classify;
use kabu_core::broker::error::BrokerError;
use kabu_core::broker::port::BrokerClient;
use kabu_session::manager::SessionManager;
use std::sync::Arc;

/// 组合为空时的明确提示 (区别于"全部为零仓")
const NO_POSITIONS: &str = "No positions found in your portfolio.";
/// 过滤后为空时的明确提示
const ALL_ZERO: &str = "No active positions found (all positions have zero quantity).";

/// # Summary
/// 持仓读取器。面向展示的只读路径：按需拉取、过滤零仓、逐行格式化，
/// 从不缓存券商状态。
///
/// # Invariants
/// - 永不向调用方抛错：网络/认证失败都转成描述性文案返回，
///   保持展示路径的平稳。
pub struct PositionsReader {
    session: Arc<SessionManager>,
    broker: Arc<dyn BrokerClient>,
}

impl PositionsReader {
    pub fn new(session: Arc<SessionManager>, broker: Arc<dyn BrokerClient>) -> Self {
        Self { session, broker }
    }

    /// # Summary
    /// 拉取并格式化当前持仓摘要。
    ///
    /// # Logic
    /// 1. 向会话管理器取有效凭据；失败返回认证提示文案。
    /// 2. 拉取净持仓并过滤数量为零的记录。
    /// 3. 每条持仓一行 `{标的}: {数量} shares @ ₹{最新价}`；
    ///    空组合与全零仓分别返回明确的提示语，不以空串含糊带过。
    pub async fn summary(&self) -> String {
        let access_token = match self.session.get_valid_credential().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("查询持仓前取凭据失败: {}", e);
                return "Authentication error: Please re-authenticate to view positions."
                    .to_string();
            }
        };

        match self.broker.net_positions(&access_token).await {
            Ok(net) => {
                if net.is_empty() {
                    return NO_POSITIONS.to_string();
                }

                let lines: Vec<String> = net
                    .iter()
                    .filter(|p| p.quantity != 0)
                    .map(|p| {
                        format!(
                            "{}: {} shares @ ₹{}",
                            p.tradingsymbol, p.quantity, p.last_price
                        )
                    })
                    .collect();

                if lines.is_empty() {
                    ALL_ZERO.to_string()
                } else {
                    lines.join("\n")
                }
            }
            Err(BrokerError::Network(e)) => {
                tracing::warn!("拉取持仓网络失败: {}", e);
                "Network error: Unable to fetch positions. Please check your connection."
                    .to_string()
            }
            Err(e) if e.is_auth() => {
                "Authentication error: Please re-authenticate to view positions.".to_string()
            }
            Err(e) => {
                let (_, message) = classify(&e);
                format!("Error fetching positions: {}", message)
            }
        }
    }
}
