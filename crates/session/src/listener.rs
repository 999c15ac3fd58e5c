use crate::error::AuthError;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// 授权成功后回显给浏览器的页面
const SUCCESS_PAGE: &str = "<html>\
<head><title>Authorization Successful</title></head>\
<body style=\"font-family: sans-serif; text-align: center; margin-top: 100px;\">\
<h1>Authorization Successful</h1>\
<p>You can close this window and return to the application.</p>\
</body></html>";

/// 未携带授权码时的错误页面
const FAILURE_PAGE: &str = "<html>\
<head><title>Authorization Failed</title></head>\
<body style=\"font-family: sans-serif; text-align: center; margin-top: 100px;\">\
<h1>Authorization Failed</h1>\
<p>No request token received. Please try again.</p>\
</body></html>";

/// 持有后台 serve 协程的句柄，Drop 时中止并释放监听端口。
/// 超时路径上外层 future 被取消时，监听器随之关闭，端口可立即复用。
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// # Summary
/// 本地授权回调监听器。在 redirect_uri 指定的端口上临时架起一个
/// 单路由 HTTP 服务，捕获券商重定向回传的一次性授权码。
///
/// # Invariants
/// - 生命周期与一次授权流程等同：成功、超时或取消时都会释放端口，
///   后续流程可以重新绑定同一端口。
/// - 只接受注册路径上的请求，其余路径返回 404 (axum 默认 fallback)。
pub struct CallbackListener {
    rx: mpsc::Receiver<String>,
    local_addr: SocketAddr,
    _guard: AbortOnDrop,
}

impl CallbackListener {
    /// # Summary
    /// 绑定端口并启动回调捕获服务。
    ///
    /// # Logic
    /// 1. 在指定端口上绑定 TCP 监听 (端口 0 表示系统分配，测试用)。
    /// 2. 注册回调路径路由，通过 mpsc 通道把首个授权码交回等待方。
    /// 3. serve 协程由 `AbortOnDrop` 句柄持有。
    ///
    /// # Arguments
    /// * `port`: 监听端口，取自 redirect_uri。
    /// * `path`: 回调路径，取自 redirect_uri。
    pub async fn bind(port: u16, path: &str) -> Result<Self, AuthError> {
        let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
            .await
            .map_err(|e| AuthError::CodeAcquisition(format!("回调监听器绑定端口 {} 失败: {}", port, e)))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| AuthError::CodeAcquisition(e.to_string()))?;

        let (tx, rx) = mpsc::channel::<String>(1);
        let route_path = if path.is_empty() { "/" } else { path };
        let router = Router::new()
            .route(route_path, get(capture_token))
            .with_state(tx);

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::warn!("回调监听器退出异常: {}", e);
            }
        });

        tracing::info!(%local_addr, path = route_path, "回调监听器已就绪");
        Ok(Self {
            rx,
            local_addr,
            _guard: AbortOnDrop(handle),
        })
    }

    /// 实际绑定的地址 (端口 0 绑定时用于获知分配结果)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// # Summary
    /// 挂起等待首个授权码。超时约束由调用方 (授权流程) 施加；
    /// 本方法返回后或所在 future 被取消后，监听器即被释放。
    pub async fn wait_for_token(mut self) -> Result<String, AuthError> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| AuthError::CodeAcquisition("回调监听器通道意外关闭".into()))
    }
}

/// 回调处理器: 提取 `request_token` 查询参数并回显结果页
async fn capture_token(
    State(tx): State<mpsc::Sender<String>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    match params.get("request_token") {
        Some(token) if !token.is_empty() => {
            tx.send(token.clone()).await.ok();
            Html(SUCCESS_PAGE).into_response()
        }
        _ => (StatusCode::BAD_REQUEST, Html(FAILURE_PAGE)).into_response(),
    }
}
