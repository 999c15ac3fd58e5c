use thiserror::Error;

/// # Summary
/// 存储层错误枚举，处理会话文件与订单日志的读写失败。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
#[derive(Error, Debug)]
pub enum StoreError {
    /// 底层文件 IO 失败
    #[error("Io error: {0}")]
    Io(String),
    /// 序列化/反序列化失败
    #[error("Serde error: {0}")]
    Serde(String),
    /// 未知或未分类的错误
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serde(e.to_string())
    }
}
