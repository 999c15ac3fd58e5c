//! # `kabu-core` - 领域核心
//!
//! 定义 Kabu 订单路由网关的全部领域实体、端口 (Trait) 与错误类型。
//! 本 crate 不依赖任何具体基础设施，所有外设（券商 HTTP 通道、文件存储、
//! 回调监听器）都以 `async_trait` 端口的形式抽象，由外层 crate 注入实现。

pub mod broker;
pub mod config;
pub mod session;
pub mod store;
pub mod trade;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
