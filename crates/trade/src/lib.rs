//! # `kabu-trade` - 订单路由核心
//!
//! 系统的中心操作所在：
//! - `OrderGateway`: 标准化请求 → 单次提交 → 结果归一 → 审计落盘
//! - `classify`: 券商异常/报文 → 稳定错误分类学 + 用户可读文案
//! - `PositionsReader`: 面向展示的持仓摘要读取

pub mod classify;
pub mod gateway;
pub mod positions;
