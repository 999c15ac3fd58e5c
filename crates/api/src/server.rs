//! # API 服务启动器
//!
//! 组装 axum 路由、挂载 Swagger UI、配置 CORS 并绑定 TCP 端口对外提供服务。
//! 本模块不直接启动 `main()`, 而是由 `crates/app` 的 DI 容器持有并调用。

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_swagger_ui::SwaggerUi;

use kabu_session::manager::SessionManager;
use kabu_trade::gateway::OrderGateway;
use kabu_trade::positions::PositionsReader;

use crate::routes::{auth, health, trade};

// ============================================================
//  共享应用状态
// ============================================================

/// 全局应用状态，通过 axum 的 `State` 提取器注入到每个 Handler 中。
///
/// # Invariants
/// - 三个服务实例在启动前由 DI 容器注入，生命周期与进程等同；
///   它们共享同一个 `SessionManager` (进程内唯一的会话所有者)。
#[derive(Clone)]
pub struct AppState {
    /// 会话管理器 (鉴权与凭据续期)
    pub session: Arc<SessionManager>,
    /// 订单网关 (下单中心操作)
    pub gateway: Arc<OrderGateway>,
    /// 持仓读取器 (展示路径)
    pub positions: Arc<PositionsReader>,
}

// ============================================================
//  OpenAPI 文档定义
// ============================================================

/// 全局 OpenAPI 文档结构
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kabu Trading API",
        version = "0.1.0",
        description = "Kite Connect 订单路由网关的 RESTful API。提供认证状态管理、买卖下单与持仓查询。",
        contact(name = "Kabu Team"),
        license(name = "MIT")
    ),
    tags(
        (name = "系统 (System)", description = "健康检查"),
        (name = "鉴权 (Auth)", description = "券商会话状态查询与登出"),
        (name = "订单交易 (Trade)", description = "买入、卖出与持仓查询")
    )
)]
pub struct ApiDoc;

// ============================================================
//  服务构建与启动
// ============================================================

/// 构建完整的 axum 应用路由树 (测试可直接挂载，不绑定端口)。
pub fn build_router(state: AppState) -> Router {
    // 1. 无需会话的公开路由
    let public_router = OpenApiRouter::new()
        .routes(routes!(health::root))
        .routes(routes!(auth::auth_status))
        .routes(routes!(auth::login))
        .routes(routes!(auth::logout));

    // 2. 要求有效券商会话的交易路由
    let trade_router = OpenApiRouter::new()
        .routes(routes!(trade::buy_stock))
        .routes(routes!(trade::sell_stock))
        .routes(routes!(trade::get_portfolio))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::auth::require_session,
        ));

    // 3. 合并所有路由与自动收集的 OpenAPI Doc
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(public_router)
        .merge(trade_router)
        .with_state(state)
        .split_for_parts();

    // 4. 配置 CORS (开发阶段允许所有来源)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 5. 合并 Swagger UI 路由并应用中间件
    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(cors)
}

/// 构建路由树并启动 HTTP 监听。
///
/// # Arguments
/// * `state` - 由外部 DI 容器注入的共享状态
/// * `bind_addr` - 监听的地址与端口，如 `"0.0.0.0:8000"`
pub async fn start_server(
    state: AppState,
    bind_addr: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(state);

    tracing::info!("🚀 Kabu API Server listening on {}", bind_addr);
    tracing::info!("📖 Swagger UI: http://{}/swagger-ui/", bind_addr);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
