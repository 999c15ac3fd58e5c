//! # 会话鉴权中间件
//!
//! 交易路由的准入检查：向会话管理器确认当前持有可通过探活的券商会话。
//! 与传统的请求级 Token 鉴权不同，这里的"登录态"是网关对券商的单一会话。

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::server::AppState;

/// 校验当前是否持有有效券商会话，未认证一律 401
pub async fn require_session(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.session.is_authenticated().await {
        tracing::warn!(path = %req.uri().path(), "拒绝未认证请求");
        return Err(ApiError::Unauthorized(
            "Not authenticated. Please run the auth-setup utility first.".into(),
        ));
    }

    Ok(next.run(req).await)
}
