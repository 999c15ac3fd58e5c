use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// # Summary
/// 订单交易方向。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    /// 买入
    Buy,
    /// 卖出
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// # Summary
/// 交易所枚举 (印度市场)。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Exchange {
    /// 国家证券交易所 (现货)
    Nse,
    /// 孟买证券交易所
    Bse,
    /// NSE 衍生品板块
    Nfo,
    /// 大宗商品交易所
    Mcx,
    /// 货币衍生品板块
    Cds,
}

impl std::fmt::Display for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Exchange::Nse => write!(f, "NSE"),
            Exchange::Bse => write!(f, "BSE"),
            Exchange::Nfo => write!(f, "NFO"),
            Exchange::Mcx => write!(f, "MCX"),
            Exchange::Cds => write!(f, "CDS"),
        }
    }
}

impl FromStr for Exchange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NSE" => Ok(Exchange::Nse),
            "BSE" => Ok(Exchange::Bse),
            "NFO" => Ok(Exchange::Nfo),
            "MCX" => Ok(Exchange::Mcx),
            "CDS" => Ok(Exchange::Cds),
            _ => Err(format!("Unknown exchange: {}", s)),
        }
    }
}

/// # Summary
/// 产品类型：现货交割、日内、普通保证金。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Product {
    /// Cash and Carry (现货交割)
    Cnc,
    /// Margin Intraday Squareoff (日内)
    Mis,
    /// Normal (衍生品普通保证金)
    Nrml,
}

impl std::fmt::Display for Product {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Product::Cnc => write!(f, "CNC"),
            Product::Mis => write!(f, "MIS"),
            Product::Nrml => write!(f, "NRML"),
        }
    }
}

impl FromStr for Product {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CNC" => Ok(Product::Cnc),
            "MIS" => Ok(Product::Mis),
            "NRML" => Ok(Product::Nrml),
            _ => Err(format!("Unknown product: {}", s)),
        }
    }
}

/// # Summary
/// 委托类型。限价与止损类委托要求对应的价格字段存在。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderKind {
    /// 市价单
    Market,
    /// 限价单 (要求 price)
    Limit,
    /// 止损限价单 (要求 price 和 trigger_price)
    StopLoss,
    /// 止损市价单 (要求 trigger_price)
    StopLossMarket,
}

impl OrderKind {
    /// 该委托类型是否要求限价字段
    pub fn requires_price(&self) -> bool {
        matches!(self, OrderKind::Limit | OrderKind::StopLoss)
    }

    /// 该委托类型是否要求触发价字段
    pub fn requires_trigger(&self) -> bool {
        matches!(self, OrderKind::StopLoss | OrderKind::StopLossMarket)
    }
}

impl std::fmt::Display for OrderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderKind::Market => write!(f, "MARKET"),
            OrderKind::Limit => write!(f, "LIMIT"),
            OrderKind::StopLoss => write!(f, "SL"),
            OrderKind::StopLossMarket => write!(f, "SL-M"),
        }
    }
}

impl FromStr for OrderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MARKET" => Ok(OrderKind::Market),
            "LIMIT" => Ok(OrderKind::Limit),
            "SL" => Ok(OrderKind::StopLoss),
            "SL-M" | "SLM" => Ok(OrderKind::StopLossMarket),
            _ => Err(format!("Unknown order type: {}", s)),
        }
    }
}

/// # Summary
/// 委托分类 (券商路由通道)。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variety {
    /// 普通委托
    Regular,
    /// 盘后委托 (After Market Order)
    Amo,
    /// 附带止损的保证金委托 (Cover Order)
    Co,
    /// 冰山委托
    Iceberg,
}

impl std::fmt::Display for Variety {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Variety::Regular => write!(f, "regular"),
            Variety::Amo => write!(f, "amo"),
            Variety::Co => write!(f, "co"),
            Variety::Iceberg => write!(f, "iceberg"),
        }
    }
}

impl FromStr for Variety {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "regular" => Ok(Variety::Regular),
            "amo" => Ok(Variety::Amo),
            "co" => Ok(Variety::Co),
            "iceberg" => Ok(Variety::Iceberg),
            _ => Err(format!("Unknown variety: {}", s)),
        }
    }
}

/// # Summary
/// 委托有效期。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Validity {
    /// 当日有效
    Day,
    /// 立即成交否则撤销
    Ioc,
}

impl std::fmt::Display for Validity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Validity::Day => write!(f, "DAY"),
            Validity::Ioc => write!(f, "IOC"),
        }
    }
}

impl FromStr for Validity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DAY" => Ok(Validity::Day),
            "IOC" => Ok(Validity::Ioc),
            _ => Err(format!("Unknown validity: {}", s)),
        }
    }
}

/// # Summary
/// 标准化的下单请求。由前端（REST / 工具协议）构造后交给订单网关。
///
/// # Invariants
/// - `quantity` 必须大于 0。
/// - `price` 仅在委托类型要求限价时出现，`trigger_price` 仅在止损类委托出现。
///   网关在提交前做快速失败校验，兜底仍以券商侧拒单为准。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    /// 交易标的代码 (例如 RELIANCE)
    pub symbol: String,
    /// 委托数量
    pub quantity: u32,
    /// 买卖方向
    pub side: OrderSide,
    /// 交易所
    pub exchange: Exchange,
    /// 产品类型
    pub product: Product,
    /// 委托类型
    pub order_kind: OrderKind,
    /// 限价 (LIMIT / SL 委托必填)
    pub price: Option<Decimal>,
    /// 触发价 (SL / SL-M 委托必填)
    pub trigger_price: Option<Decimal>,
    /// 委托分类
    pub variety: Variety,
    /// 有效期
    pub validity: Validity,
}

impl OrderRequest {
    /// # Logic
    /// 构造一笔市价现货委托，其余字段取默认通道 (NSE / CNC / regular / DAY)。
    pub fn market(symbol: impl Into<String>, quantity: u32, side: OrderSide) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            side,
            exchange: Exchange::Nse,
            product: Product::Cnc,
            order_kind: OrderKind::Market,
            price: None,
            trigger_price: None,
            variety: Variety::Regular,
            validity: Validity::Day,
        }
    }
}

/// # Summary
/// 稳定的错误分类学。`Display` 输出固定的 SCREAMING_SNAKE 代码，
/// 供前端映射 HTTP 状态与客户端展示，禁止随意更名。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// 凭据过期或无效，需要重新认证
    Auth,
    /// 网络连接失败，稍后重试
    Network,
    /// 持仓不足，无法卖出
    InsufficientHoldings,
    /// 资金不足，无法买入
    InsufficientFunds,
    /// 标的代码不存在
    InvalidSymbol,
    /// 非交易时段
    MarketClosed,
    /// 价格超出涨跌停区间
    PriceBand,
    /// 数量不满足最小申报单位
    InvalidQuantity,
    /// 同标的存在未完结委托
    PendingOrders,
    /// 限价/触发价非法
    InvalidPrice,
    /// 交易所通用拒单
    ExchangeRejected,
    /// 未分类错误，透传原始报文
    Unknown,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            ErrorKind::Auth => "AUTH_ERROR",
            ErrorKind::Network => "NETWORK_ERROR",
            ErrorKind::InsufficientHoldings => "INSUFFICIENT_HOLDINGS",
            ErrorKind::InsufficientFunds => "INSUFFICIENT_FUNDS",
            ErrorKind::InvalidSymbol => "INVALID_SYMBOL",
            ErrorKind::MarketClosed => "MARKET_CLOSED",
            ErrorKind::PriceBand => "PRICE_BAND",
            ErrorKind::InvalidQuantity => "INVALID_QUANTITY",
            ErrorKind::PendingOrders => "PENDING_ORDERS",
            ErrorKind::InvalidPrice => "INVALID_PRICE",
            ErrorKind::ExchangeRejected => "EXCHANGE_REJECTED",
            ErrorKind::Unknown => "UNKNOWN_ERROR",
        };
        write!(f, "{}", code)
    }
}

/// # Summary
/// 下单操作的统一结果。网关保证每次调用恰好返回其中一个分支，
/// 券商侧异常绝不穿透到调用方。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OrderResult {
    /// 提交成功
    Success {
        /// 券商返回的订单号
        order_id: String,
        /// 券商侧订单状态 (最佳努力回查，失败时为 STATUS_CHECK_FAILED)
        broker_status: String,
    },
    /// 提交失败 (含本地校验失败与认证失败)
    Failure {
        /// 稳定错误分类
        kind: ErrorKind,
        /// 面向用户的可读文案
        message: String,
        /// 券商或底层错误的原始文本
        raw_detail: String,
    },
}

impl OrderResult {
    pub fn is_success(&self) -> bool {
        matches!(self, OrderResult::Success { .. })
    }
}

/// # Summary
/// 订单审计日志的单条记录。每次下单尝试（无论成败）恰好产生一条，
/// 只追加、不修改、不删除。
#[derive(Debug, Clone)]
pub struct OrderLogEntry {
    pub timestamp: DateTime<Utc>,
    /// 总体结果: SUCCESS / FAILED
    pub status: String,
    pub side: OrderSide,
    pub symbol: String,
    pub quantity: u32,
    pub exchange: Exchange,
    pub product: Product,
    pub order_kind: OrderKind,
    pub price: Option<Decimal>,
    pub trigger_price: Option<Decimal>,
    pub order_id: Option<String>,
    /// 券商侧订单状态或失败归类 (REJECTED / AUTH_FAILED / NETWORK_ERROR ...)
    pub order_status: Option<String>,
    pub error_message: Option<String>,
}

impl OrderLogEntry {
    /// # Summary
    /// 渲染为单行竖线分隔的审计文本。
    ///
    /// # Logic
    /// 1. 固定前缀: 时间戳、总体结果、方向、标的、数量、交易所、产品、委托类型。
    /// 2. 可选字段按存在性依次追加: Price、Trigger、OrderID、OrderStatus。
    /// 3. 仅当总体结果为失败时追加 Error 字段。
    ///
    /// # Invariants
    /// - 输出恰好一行，不含换行符；字段顺序与存在性规则固定，下游按此解析。
    pub fn to_line(&self) -> String {
        let mut parts = vec![
            self.timestamp.to_rfc3339(),
            self.status.clone(),
            self.side.to_string(),
            self.symbol.clone(),
            format!("Qty: {}", self.quantity),
            self.exchange.to_string(),
            self.product.to_string(),
            self.order_kind.to_string(),
        ];
        if let Some(price) = self.price {
            parts.push(format!("Price: {}", price));
        }
        if let Some(trigger) = self.trigger_price {
            parts.push(format!("Trigger: {}", trigger));
        }
        if let Some(order_id) = &self.order_id {
            parts.push(format!("OrderID: {}", order_id));
        }
        if let Some(order_status) = &self.order_status {
            parts.push(format!("OrderStatus: {}", order_status));
        }
        if self.status.contains("FAILED")
            && let Some(err) = &self.error_message
        {
            parts.push(format!("Error: {}", err));
        }
        parts.join(" | ")
    }
}

/// # Summary
/// 券商持仓的只读投影。按需拉取，从不缓存。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    /// 标的代码
    pub symbol: String,
    /// 净持仓数量 (正=多头, 负=空头)
    pub quantity: i64,
    /// 最新成交价
    pub last_price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn base_entry() -> OrderLogEntry {
        OrderLogEntry {
            timestamp: "2026-08-06T10:00:00Z".parse().unwrap(),
            status: "SUCCESS".into(),
            side: OrderSide::Buy,
            symbol: "RELIANCE".into(),
            quantity: 10,
            exchange: Exchange::Nse,
            product: Product::Cnc,
            order_kind: OrderKind::Market,
            price: None,
            trigger_price: None,
            order_id: Some("171000001".into()),
            order_status: Some("COMPLETE".into()),
            error_message: None,
        }
    }

    #[test]
    fn test_success_line_layout() {
        let line = base_entry().to_line();
        assert!(line.contains("SUCCESS | BUY | RELIANCE | Qty: 10 | NSE | CNC | MARKET | OrderID: 171000001"));
        assert!(!line.contains("Error:"));
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_failed_line_carries_error() {
        let mut entry = base_entry();
        entry.status = "FAILED".into();
        entry.order_id = None;
        entry.order_status = Some("REJECTED".into());
        entry.error_message = Some("Insufficient funds".into());

        let line = entry.to_line();
        assert!(line.contains("FAILED | BUY | RELIANCE"));
        assert!(line.contains("OrderStatus: REJECTED"));
        assert!(line.ends_with("Error: Insufficient funds"));
        assert!(!line.contains("OrderID:"));
    }

    #[test]
    fn test_optional_price_fields_in_order() {
        let mut entry = base_entry();
        entry.order_kind = OrderKind::StopLoss;
        entry.price = Some(Decimal::new(25005, 1));
        entry.trigger_price = Some(Decimal::new(2498, 0));

        let line = entry.to_line();
        let price_idx = line.find("Price: 2500.5").unwrap();
        let trigger_idx = line.find("Trigger: 2498").unwrap();
        assert!(price_idx < trigger_idx);
    }

    #[test]
    fn test_order_kind_wire_format() {
        assert_eq!(OrderKind::StopLossMarket.to_string(), "SL-M");
        assert_eq!("sl-m".parse::<OrderKind>().unwrap(), OrderKind::StopLossMarket);
        assert_eq!("market".parse::<OrderKind>().unwrap(), OrderKind::Market);
        assert!("GTC".parse::<OrderKind>().is_err());
    }

    #[test]
    fn test_error_kind_stable_codes() {
        assert_eq!(ErrorKind::Auth.to_string(), "AUTH_ERROR");
        assert_eq!(ErrorKind::InsufficientFunds.to_string(), "INSUFFICIENT_FUNDS");
        assert_eq!(ErrorKind::Unknown.to_string(), "UNKNOWN_ERROR");
    }
}
