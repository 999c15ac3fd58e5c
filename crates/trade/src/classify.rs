use kabu_core::broker::error::BrokerError;
use kabu_core::trade::entity::ErrorKind;

/// 凭据类失败的固定文案
const AUTH_MESSAGE: &str = "Authentication token expired or invalid. Please re-authenticate.";
/// 网络类失败的固定文案
const NETWORK_MESSAGE: &str =
    "Network connection error. Please check your internet connection and try again.";

/// # Summary
/// 报文文案规则表。按序求值，首个命中即返回，匹配对报文大小写不敏感。
///
/// # Invariants
/// - 规则顺序即优先级，调整顺序属于行为变更，必须连同测试一起改。
const TEXT_RULES: &[(&[&str], ErrorKind, &str)] = &[
    (
        &["insufficient stock holding", "holding quantity: 0"],
        ErrorKind::InsufficientHoldings,
        "Cannot sell: You don't own this stock or don't have enough shares to sell.",
    ),
    (
        &["insufficient funds", "insufficient balance"],
        ErrorKind::InsufficientFunds,
        "Cannot buy: Insufficient funds in your account.",
    ),
    (
        &["invalid tradingsymbol", "instrument not found"],
        ErrorKind::InvalidSymbol,
        "Invalid stock symbol. Please check the stock name/symbol.",
    ),
    (
        &["market is closed", "outside market hours"],
        ErrorKind::MarketClosed,
        "Market is closed. Trading hours are 9:30 AM to 3:30 PM on weekdays.",
    ),
    (
        &["price band", "circuit limit"],
        ErrorKind::PriceBand,
        "Price is outside allowed range (circuit limits). Please adjust your price.",
    ),
    (
        &["minimum quantity", "lot size"],
        ErrorKind::InvalidQuantity,
        "Invalid quantity. Please check minimum lot size requirements for this instrument.",
    ),
    (
        &["pending orders"],
        ErrorKind::PendingOrders,
        "You have pending orders for this stock. Cancel them first or wait for execution.",
    ),
    (
        &["invalid price"],
        ErrorKind::InvalidPrice,
        "Invalid price specified. Please check your limit/trigger price.",
    ),
    (
        &["order rejected"],
        ErrorKind::ExchangeRejected,
        "Order rejected by exchange. Please check order parameters and try again.",
    ),
];

/// # Summary
/// 把类型化的券商错误归入稳定分类学并产出用户文案。
///
/// # Logic
/// 1. 异常类别规则优先：认证/网络类错误直接定类，不参与文案匹配。
/// 2. 其余错误取出原始报文，按 `TEXT_RULES` 顺序做大小写不敏感的子串匹配。
/// 3. 全部未命中时归为 `Unknown`，原始报文透传进文案。
///
/// # Returns
/// `(ErrorKind, 用户可读文案)`
pub fn classify(error: &BrokerError) -> (ErrorKind, String) {
    match error {
        BrokerError::Auth(_) => (ErrorKind::Auth, AUTH_MESSAGE.to_string()),
        BrokerError::Network(_) => (ErrorKind::Network, NETWORK_MESSAGE.to_string()),
        BrokerError::Input(raw) | BrokerError::Unknown(raw) => classify_message(raw),
    }
}

/// 按规则表对券商自由文本报文定类
pub fn classify_message(raw: &str) -> (ErrorKind, String) {
    let lowered = raw.to_lowercase();
    for (patterns, kind, message) in TEXT_RULES {
        if patterns.iter().any(|p| lowered.contains(p)) {
            return (*kind, (*message).to_string());
        }
    }
    (ErrorKind::Unknown, format!("Trading error: {}", raw))
}
