//! # `kabu-store` - 文件持久化适配层
//!
//! 实现核心端口中与持久化相关的两个协作者：
//! - `JsonSessionStore`: 单条会话凭据的 JSON 文件存储 (原子覆写)
//! - `FileOrderLog`: 只追加的订单审计日志 (每次尝试一行，逐条落盘)

pub mod order_log;
pub mod session;
