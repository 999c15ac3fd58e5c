use kabu_core::test_utils::MockBroker;
use kabu_session::code_source::{AuthCodeSource, CallbackCodeSource};
use kabu_session::error::AuthError;
use kabu_session::flow::AuthFlow;
use kabu_session::listener::CallbackListener;
use std::sync::Arc;
use std::time::Duration;

/// 安装 rustls 加密提供者 (整进程一次)；`rustls-no-provider` 特性要求
/// 在构建任何 reqwest 客户端前完成此步。
fn ensure_crypto_provider() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// 模拟券商重定向：带重试地向本地回调地址发起 GET
async fn redirect_with_token(url: &str) -> reqwest::Response {
    ensure_crypto_provider();
    let client = reqwest::Client::new();
    for _ in 0..50 {
        if let Ok(resp) = client.get(url).send().await {
            return resp;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("回调监听器始终不可达: {}", url);
}

#[tokio::test]
async fn test_listener_captures_request_token() {
    let listener = CallbackListener::bind(0, "/callback").await.unwrap();
    let addr = listener.local_addr();

    let wait = tokio::spawn(listener.wait_for_token());

    let resp = redirect_with_token(&format!(
        "http://{}/callback?action=login&request_token=tok_abc&status=success",
        addr
    ))
    .await;
    assert!(resp.status().is_success());
    let body = resp.text().await.unwrap();
    assert!(body.contains("Authorization Successful"));

    let token = wait.await.unwrap().unwrap();
    assert_eq!(token, "tok_abc");
}

#[tokio::test]
async fn test_listener_rejects_missing_token() {
    let listener = CallbackListener::bind(0, "/callback").await.unwrap();
    let addr = listener.local_addr();

    let wait = tokio::spawn(listener.wait_for_token());

    // 未携带授权码：应返回 400 并继续等待
    let resp = redirect_with_token(&format!("http://{}/callback?action=login", addr)).await;
    assert_eq!(resp.status().as_u16(), 400);

    // 再以合法参数回调
    let resp = redirect_with_token(&format!(
        "http://{}/callback?request_token=tok_retry",
        addr
    ))
    .await;
    assert!(resp.status().is_success());
    assert_eq!(wait.await.unwrap().unwrap(), "tok_retry");
}

#[tokio::test]
async fn test_full_callback_flow_produces_session() {
    // 固定端口：flow 内部由 redirect_uri 决定绑定位置
    let port = 47631;
    let broker: Arc<MockBroker> = Arc::new(MockBroker::always_ok());
    let source = Arc::new(CallbackCodeSource::new(format!(
        "http://127.0.0.1:{}/callback",
        port
    )));
    let flow = AuthFlow::new(broker.clone(), source, Duration::from_secs(10));

    let run = tokio::spawn(async move { flow.run().await });

    let resp = redirect_with_token(&format!(
        "http://127.0.0.1:{}/callback?request_token=tok_flow",
        port
    ))
    .await;
    assert!(resp.status().is_success());

    let session = run.await.unwrap().unwrap();
    assert_eq!(session.access_token, "fresh_token");
    assert_eq!(session.user_id, "AB1234");
    assert!(session.is_complete());
}

#[tokio::test]
async fn test_timeout_releases_listener_port() {
    let port = 47632;
    let broker: Arc<MockBroker> = Arc::new(MockBroker::always_ok());
    let source = Arc::new(CallbackCodeSource::new(format!(
        "http://127.0.0.1:{}/callback",
        port
    )));
    let flow = AuthFlow::new(broker, source, Duration::from_millis(200));

    let err = flow.run().await.unwrap_err();
    assert!(matches!(err, AuthError::Timeout));

    // 超时路径必须释放端口：随后的一轮流程可以重新绑定
    let mut rebound = false;
    for _ in 0..50 {
        if tokio::net::TcpListener::bind(("0.0.0.0", port)).await.is_ok() {
            rebound = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(rebound, "超时后监听端口未被释放");
}

#[tokio::test]
async fn test_second_flow_can_reuse_port_after_success() {
    let port = 47633;
    for round in 0..2 {
        let source = CallbackCodeSource::new(format!("http://127.0.0.1:{}/callback", port));

        let obtain = tokio::spawn(async move {
            source
                .obtain_code("https://broker.test/connect/login")
                .await
        });

        let resp = redirect_with_token(&format!(
            "http://127.0.0.1:{}/callback?request_token=tok_{}",
            port, round
        ))
        .await;
        assert!(resp.status().is_success());
        assert_eq!(obtain.await.unwrap().unwrap(), format!("tok_{}", round));
    }
}
