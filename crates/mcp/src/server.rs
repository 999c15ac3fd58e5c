use crate::protocol::{
    INTERNAL_ERROR, INVALID_REQUEST, PARSE_ERROR, PROTOCOL_VERSION, RpcRequest, error_content,
    error_response, result_response, text_content,
};
use kabu_core::trade::entity::{OrderRequest, OrderResult, OrderSide};
use kabu_trade::gateway::OrderGateway;
use kabu_trade::positions::PositionsReader;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

/// 买卖工具共用的入参结构 (缺省值与 REST 层一致)
#[derive(Debug, Deserialize)]
struct TradeToolInput {
    stock: String,
    qty: u32,
    #[serde(default = "default_exchange")]
    exchange: String,
    #[serde(default = "default_product")]
    product: String,
    #[serde(default = "default_order_type")]
    order_type: String,
    price: Option<Decimal>,
    trigger_price: Option<Decimal>,
}

fn default_exchange() -> String {
    "NSE".to_string()
}
fn default_product() -> String {
    "CNC".to_string()
}
fn default_order_type() -> String {
    "MARKET".to_string()
}

impl TradeToolInput {
    fn into_domain(self, side: OrderSide) -> Result<OrderRequest, String> {
        let mut request = OrderRequest::market(self.stock, self.qty, side);
        request.exchange = self.exchange.parse()?;
        request.product = self.product.parse()?;
        request.order_kind = self.order_type.parse()?;
        request.price = self.price;
        request.trigger_price = self.trigger_price;
        Ok(request)
    }
}

/// # Summary
/// 行式 JSON-RPC 工具服务。协议分发与工具执行都在这里完成，
/// 业务语义完全复用订单网关与持仓读取器。
///
/// # Invariants
/// - 每读入一行恰好回写至多一行响应 (空行跳过)。
/// - 工具执行的业务失败通过 `isError` 内容块表达，
///   协议级错误才使用 JSON-RPC error 对象。
pub struct ToolServer {
    name: String,
    version: String,
    gateway: Arc<OrderGateway>,
    positions: Arc<PositionsReader>,
}

impl ToolServer {
    pub fn new(gateway: Arc<OrderGateway>, positions: Arc<PositionsReader>) -> Self {
        Self {
            name: "Kabu Trading Server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            gateway,
            positions,
        }
    }

    /// # Summary
    /// 主循环：逐行读入、分发、逐行回写。EOF 退出。
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!(name = %self.name, version = %self.version, "工具服务已启动");

        let mut lines = BufReader::new(reader).lines();
        while let Some(line) = lines.next_line().await? {
            let Some(response) = self.handle_line(&line).await else {
                continue;
            };
            let rendered = response.to_string();
            writer.write_all(rendered.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        tracing::info!("输入流关闭，工具服务退出");
        Ok(())
    }

    /// 处理一行输入。空行返回 `None` (不回写)。
    pub async fn handle_line(&self, line: &str) -> Option<Value> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let parsed: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(_) => return Some(error_response(None, PARSE_ERROR, "Parse error")),
        };

        if !parsed.is_object() {
            return Some(error_response(None, INVALID_REQUEST, "Invalid Request"));
        }

        let request: RpcRequest = match serde_json::from_value(parsed) {
            Ok(r) => r,
            Err(_) => return Some(error_response(None, INVALID_REQUEST, "Invalid Request")),
        };

        Some(self.handle_request(request).await)
    }

    /// # Summary
    /// 分发一条结构化请求。
    ///
    /// # Logic
    /// 1. 校验 jsonrpc 版本与 method 存在性 (-32600)。
    /// 2. initialize / tools/list / tools/call 按方法处理。
    /// 3. 未知方法与工具执行异常归为 -32603。
    pub async fn handle_request(&self, request: RpcRequest) -> Value {
        let id = request.id;

        if request.jsonrpc.as_deref() != Some("2.0") {
            return error_response(id.as_ref(), INVALID_REQUEST, "Invalid JSON-RPC version");
        }

        let Some(method) = request.method.as_deref() else {
            return error_response(id.as_ref(), INVALID_REQUEST, "Missing method field");
        };

        match method {
            "initialize" => result_response(
                id.as_ref(),
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {"tools": {}},
                    "serverInfo": {"name": self.name.clone(), "version": self.version.clone()}
                }),
            ),
            "tools/list" => result_response(id.as_ref(), json!({"tools": tool_descriptors()})),
            "tools/call" => {
                let name = request.params.get("name").and_then(Value::as_str);
                let arguments = request
                    .params
                    .get("arguments")
                    .cloned()
                    .unwrap_or_else(|| json!({}));

                let Some(name) = name else {
                    return error_response(id.as_ref(), INTERNAL_ERROR, "Missing tool name");
                };

                match self.call_tool(name, arguments).await {
                    Ok(result) => result_response(id.as_ref(), result),
                    Err(message) => error_response(id.as_ref(), INTERNAL_ERROR, message),
                }
            }
            other => error_response(
                id.as_ref(),
                INTERNAL_ERROR,
                format!("Unknown method: {}", other),
            ),
        }
    }

    /// # Summary
    /// 执行一个具名工具。入参非法走 `isError` 内容块而非协议错误，
    /// 宿主会把文本原样呈现给最终用户。
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, String> {
        match name {
            "buy-a-stock" => Ok(self.trade_tool(arguments, OrderSide::Buy).await),
            "sell-a-stock" => Ok(self.trade_tool(arguments, OrderSide::Sell).await),
            "show-portfolio" => {
                let summary = self.positions.summary().await;
                Ok(text_content(format!("Current Portfolio:\n{}", summary)))
            }
            other => Err(format!("Tool '{}' not found", other)),
        }
    }

    async fn trade_tool(&self, arguments: Value, side: OrderSide) -> Value {
        let input: TradeToolInput = match serde_json::from_value(arguments) {
            Ok(i) => i,
            Err(e) => return error_content(format!("Invalid input: {}", e)),
        };
        let request = match input.into_domain(side) {
            Ok(r) => r,
            Err(e) => return error_content(format!("Invalid input: {}", e)),
        };

        // 回显文案与 REST 层保持同构
        let mut described = format!("{} units of {}", request.quantity, request.symbol);
        if let Some(price) = request.price {
            described.push_str(&format!(" at ₹{}", price));
        }
        let exchange = request.exchange;
        let product = request.product;

        match self.gateway.place_order(request).await {
            OrderResult::Success { order_id, .. } => text_content(format!(
                "{} order placed: {}\nOrder ID: {}\nExchange: {} | Product: {}",
                side, described, order_id, exchange, product
            )),
            OrderResult::Failure { message, .. } => error_content(message),
        }
    }
}

/// 三个交易工具的静态描述 (名称、说明、输入 JSON Schema)
fn tool_descriptors() -> Value {
    let trade_schema = json!({
        "type": "object",
        "properties": {
            "stock": {"type": "string", "description": "Trading symbol, e.g. RELIANCE"},
            "qty": {"type": "integer", "description": "Quantity to trade"},
            "exchange": {"type": "string", "description": "NSE, BSE, NFO, MCX or CDS", "default": "NSE"},
            "product": {"type": "string", "description": "CNC, MIS or NRML", "default": "CNC"},
            "order_type": {"type": "string", "description": "MARKET, LIMIT, SL or SL-M", "default": "MARKET"},
            "price": {"type": "number", "description": "Limit price for LIMIT/SL orders"},
            "trigger_price": {"type": "number", "description": "Trigger price for SL/SL-M orders"}
        },
        "required": ["stock", "qty"]
    });

    json!([
        {
            "name": "buy-a-stock",
            "description": "Buy stocks, futures, options, or any tradeable instrument. Supports all exchanges (NSE, NFO, MCX) and order types (MARKET, LIMIT, SL, SL-M). Requires stock symbol and quantity.",
            "inputSchema": trade_schema.clone()
        },
        {
            "name": "sell-a-stock",
            "description": "Sell stocks, futures, options, or any tradeable instrument. Supports all exchanges (NSE, NFO, MCX) and order types (MARKET, LIMIT, SL, SL-M). Requires stock symbol and quantity.",
            "inputSchema": trade_schema
        },
        {
            "name": "show-portfolio",
            "description": "Show current portfolio positions",
            "inputSchema": {"type": "object", "properties": {}, "required": []}
        }
    ])
}
