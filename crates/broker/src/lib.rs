//! # `kabu-broker` - 券商通道适配层
//!
//! `BrokerClient` 端口面向 Zerodha Kite Connect v3 REST API 的具体实现。
//! 负责把 Kite 的 JSON 信封与异常类型收敛到核心定义的类型化错误边界
//! (`BrokerError`)，上层永远不会看到裸的 HTTP 细节。

pub mod kite;
