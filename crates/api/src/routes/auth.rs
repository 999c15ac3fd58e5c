//! # 认证状态路由控制器
//!
//! 查询会话状态、触发登出。授权流程本身由服务器宿主上的
//! `auth-setup` 工具驱动 (浏览器登录 + 本地回调)，HTTP 层不代理该交互。

use axum::Json;
use axum::extract::State;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::AuthResponse;

/// 查询认证状态
///
/// 已认证时附带当前会话概要 (用户与创建时间，不含凭据)。
#[utoipa::path(
    get,
    path = "/auth/status",
    tag = "鉴权 (Auth)",
    responses(
        (status = 200, description = "状态查询成功", body = AuthResponse)
    )
)]
pub async fn auth_status(State(state): State<AppState>) -> Json<AuthResponse> {
    if state.session.is_authenticated().await {
        let user_info = state.session.session_info().await.map(Into::into);
        Json(AuthResponse {
            success: true,
            message: "Authenticated".into(),
            user_info,
        })
    } else {
        Json(AuthResponse {
            success: false,
            message: "Not authenticated. Please run the auth-setup utility first.".into(),
            user_info: None,
        })
    }
}

/// 触发登录 (指引)
///
/// 浏览器授权必须在服务器宿主上完成，此接口仅返回操作指引。
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "鉴权 (Auth)",
    responses(
        (status = 200, description = "返回登录指引", body = AuthResponse)
    )
)]
pub async fn login() -> Json<AuthResponse> {
    Json(AuthResponse {
        success: false,
        message: "Please run the auth-setup utility on the server host to complete broker login."
            .into(),
        user_info: None,
    })
}

/// 登出
///
/// 删除持久化会话，下一次交易操作将要求重新认证。幂等。
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "鉴权 (Auth)",
    responses(
        (status = 200, description = "登出结果", body = AuthResponse),
        (status = 500, description = "会话存储故障")
    )
)]
pub async fn logout(State(state): State<AppState>) -> Result<Json<AuthResponse>, ApiError> {
    let removed = state
        .session
        .clear_session()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to clear session: {}", e)))?;

    if removed {
        Ok(Json(AuthResponse {
            success: true,
            message: "Session cleared successfully".into(),
            user_info: None,
        }))
    } else {
        Ok(Json(AuthResponse {
            success: false,
            message: "No session found to clear".into(),
            user_info: None,
        }))
    }
}
