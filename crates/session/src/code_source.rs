use crate::error::AuthError;
use crate::listener::CallbackListener;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};

/// # Summary
/// 授权码获取协作者的可插拔抽象。交互式浏览器、容器内打印等待、
/// 无头手动输入等差异全部收敛在实现内部，授权流程本身保持唯一。
///
/// # Invariants
/// - `obtain_code` 可能无限等待，超时约束由授权流程统一施加；
///   实现必须在被取消时释放自己占用的资源 (监听端口、输入流)。
#[async_trait]
pub trait AuthCodeSource: Send + Sync {
    /// 引导用户完成登录并返回捕获到的一次性授权码。
    async fn obtain_code(&self, login_url: &str) -> Result<String, AuthError>;
}

/// # Summary
/// 本地回调监听实现：打印登录 URL，等待浏览器完成认证后
/// 由券商重定向把授权码回传到本机端口。
/// 同时覆盖交互式与容器 (复制链接到宿主机浏览器) 两种场景。
pub struct CallbackCodeSource {
    redirect_uri: String,
}

impl CallbackCodeSource {
    pub fn new(redirect_uri: impl Into<String>) -> Self {
        Self {
            redirect_uri: redirect_uri.into(),
        }
    }
}

#[async_trait]
impl AuthCodeSource for CallbackCodeSource {
    /// # Logic
    /// 1. 从 redirect_uri 解析监听端口与回调路径。
    /// 2. 绑定回调监听器 (成功/超时/取消路径都会释放端口)。
    /// 3. 打印登录 URL 供操作者在浏览器中打开。
    /// 4. 挂起等待首个授权码。
    async fn obtain_code(&self, login_url: &str) -> Result<String, AuthError> {
        let (port, path) = parse_redirect_uri(&self.redirect_uri);
        let listener = CallbackListener::bind(port, &path).await?;

        tracing::info!("请在浏览器中打开以下链接完成券商登录:");
        tracing::info!("  {}", login_url);
        tracing::info!("登录完成后授权码将自动回传，无需手动操作");

        listener.wait_for_token().await
    }
}

/// # Summary
/// 手动输入实现：打印登录 URL，从标准输入读取授权码。
/// 适用于无法回连本机端口的无头/容器环境。
pub struct StdinCodeSource;

#[async_trait]
impl AuthCodeSource for StdinCodeSource {
    /// # Logic
    /// 1. 打印登录 URL 与操作指引。
    /// 2. 读取一行输入；允许直接粘贴整个重定向 URL，自动提取授权码。
    async fn obtain_code(&self, login_url: &str) -> Result<String, AuthError> {
        tracing::info!("请在浏览器中打开以下链接完成券商登录:");
        tracing::info!("  {}", login_url);
        tracing::info!("完成后将重定向地址中的 request_token (或整个 URL) 粘贴到此处:");

        let mut line = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        reader
            .read_line(&mut line)
            .await
            .map_err(|e| AuthError::CodeAcquisition(format!("标准输入读取失败: {}", e)))?;

        let token = extract_request_token(line.trim());
        if token.is_empty() {
            return Err(AuthError::CodeAcquisition("未输入授权码".into()));
        }
        Ok(token)
    }
}

/// 从 redirect_uri 中解析 (端口, 路径)。无端口时默认 8080。
fn parse_redirect_uri(uri: &str) -> (u16, String) {
    let after_scheme = uri.split_once("://").map_or(uri, |(_, rest)| rest);
    let (authority, path) = match after_scheme.find('/') {
        Some(idx) => (&after_scheme[..idx], after_scheme[idx..].to_string()),
        None => (after_scheme, "/".to_string()),
    };
    let port = authority
        .rsplit_once(':')
        .and_then(|(_, p)| p.parse().ok())
        .unwrap_or(8080);
    (port, path)
}

/// 输入既可以是裸授权码，也可以是携带 `request_token=` 的完整重定向 URL
fn extract_request_token(input: &str) -> String {
    match input.split_once("request_token=") {
        Some((_, rest)) => rest.split('&').next().unwrap_or_default().to_string(),
        None => input.to_string(),
    }
}
