use chrono::Utc;
use kabu_core::trade::entity::{Exchange, OrderKind, OrderLogEntry, OrderSide, Product};
use kabu_core::trade::port::OrderLog;
use kabu_store::order_log::FileOrderLog;
use std::sync::Arc;

fn entry(symbol: &str, status: &str) -> OrderLogEntry {
    OrderLogEntry {
        timestamp: Utc::now(),
        status: status.into(),
        side: OrderSide::Buy,
        symbol: symbol.into(),
        quantity: 10,
        exchange: Exchange::Nse,
        product: Product::Cnc,
        order_kind: OrderKind::Market,
        price: None,
        trigger_price: None,
        order_id: Some("171000001".into()),
        order_status: Some("COMPLETE".into()),
        error_message: None,
    }
}

#[tokio::test]
async fn test_append_writes_one_line_per_entry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("order.log");
    let log = FileOrderLog::at(&path);

    log.append(&entry("RELIANCE", "SUCCESS")).await;
    log.append(&entry("TCS", "FAILED")).await;

    let raw = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = raw.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("BUY | RELIANCE | Qty: 10 | NSE | CNC | MARKET"));
    assert!(lines[1].contains("FAILED"));
}

#[tokio::test]
async fn test_concurrent_appends_do_not_interleave() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("order.log");
    let log = Arc::new(FileOrderLog::at(&path));

    let mut handles = Vec::new();
    for i in 0..32 {
        let log = log.clone();
        handles.push(tokio::spawn(async move {
            log.append(&entry(&format!("SYM{}", i), "SUCCESS")).await;
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    let raw = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = raw.lines().collect();
    assert_eq!(lines.len(), 32, "每次尝试恰好一行");
    for line in lines {
        // 每一行都必须是完整格式，不允许交错截断
        assert!(line.contains(" | BUY | SYM"), "行内容被交错破坏: {}", line);
        assert!(line.contains("OrderID: 171000001"));
    }
}

#[tokio::test]
async fn test_append_failure_is_swallowed() {
    // 指向不存在的目录：写入必然失败，但 append 不应 panic 或报错
    let log = FileOrderLog::at("/nonexistent-kabu-dir/order.log");
    log.append(&entry("RELIANCE", "SUCCESS")).await;
}
