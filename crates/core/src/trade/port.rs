use super::entity::OrderLogEntry;
use async_trait::async_trait;

/// # Summary
/// 订单审计日志端口。进程级共享资源，记录每一次下单尝试。
///
/// # Invariants
/// - 只追加语义：实现不得提供修改或删除能力。
/// - `append` 永不向调用方抛错——审计写入失败不能反过来让交易操作失败，
///   实现应在内部吞掉错误并另行上报 (tracing)。
/// - 并发写入安全：多个请求可能同时追加，实现必须串行化或使用原子追加原语。
#[async_trait]
pub trait OrderLog: Send + Sync {
    /// 同步落盘 (flush) 一条审计记录。
    async fn append(&self, entry: &OrderLogEntry);
}
