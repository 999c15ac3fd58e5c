use async_trait::async_trait;
use kabu_core::trade::entity::OrderLogEntry;
use kabu_core::trade::port::OrderLog;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// # Summary
/// 只追加的订单审计日志文件实现。每条记录渲染为一行竖线分隔文本，
/// 逐条 flush 落盘。
///
/// # Invariants
/// * 并发写入由内部异步互斥锁串行化，行与行之间不会交错。
/// * 写入失败被吞掉并通过 tracing 告警——审计失败不能使交易操作失败。
pub struct FileOrderLog {
    path: PathBuf,
    // 串行化并发追加，保证单行原子性
    write_lock: Mutex<()>,
}

impl FileOrderLog {
    /// 指定日志文件路径创建实例，路径由应用配置注入。
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    async fn try_append(&self, line: &str) -> std::io::Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl OrderLog for FileOrderLog {
    /// # Summary
    /// 追加一条审计记录。
    ///
    /// # Logic
    /// 1. 渲染为单行文本。
    /// 2. 加锁后以 append 模式写入并 flush。
    /// 3. 任何写入错误只告警，不向调用方传播。
    async fn append(&self, entry: &OrderLogEntry) {
        let line = entry.to_line();
        if let Err(e) = self.try_append(&line).await {
            tracing::warn!(path = %self.path.display(), "订单审计日志写入失败: {}", e);
        }
    }
}
