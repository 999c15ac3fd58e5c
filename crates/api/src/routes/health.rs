//! # 健康检查路由

use axum::Json;
use chrono::Utc;

use crate::types::HealthResponse;

/// 服务健康检查
///
/// 返回服务名、版本与服务器当前时间。
#[utoipa::path(
    get,
    path = "/",
    tag = "系统 (System)",
    responses(
        (status = 200, description = "服务运行中", body = HealthResponse)
    )
)]
pub async fn root() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "running".into(),
        service: "Kabu Trading API".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
