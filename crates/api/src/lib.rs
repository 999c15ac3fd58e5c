//! # `kabu-api` - HTTP API 网关
//!
//! 本 crate 是 Kabu 订单路由网关的 HTTP/REST 服务入口。
//! 使用 `axum` 构建路由与控制器，通过 `utoipa` 自动生成 OpenAPI 3.0 Swagger 文档。
//!
//! ## 架构职责
//! - 接收交易客户端的 HTTP 请求并转换为标准化领域请求
//! - 对交易路由执行会话鉴权 (委托给下层 `SessionManager`)
//! - 调用 `OrderGateway` / `PositionsReader` 完成业务操作
//! - 把归一化结果转换为 DTO；AUTH_ERROR 映射 401，其余失败映射 400

pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod types;
