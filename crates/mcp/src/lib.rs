//! # `kabu-mcp` - 行式 JSON-RPC 工具服务
//!
//! 面向 AI 助手宿主的工具调用前端：标准输入逐行读取 JSON-RPC 2.0 请求，
//! 标准输出逐行回写响应。暴露三个交易工具 (买入 / 卖出 / 持仓)，
//! 全部转发到与 REST 层相同的 `OrderGateway` 操作。

pub mod protocol;
pub mod server;
