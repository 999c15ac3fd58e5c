use kabu_api::server::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// # Summary
/// REST API 服务器入口。
///
/// # Logic
/// 1. 初始化全局日志 (非阻塞 stdout 写入)。
/// 2. 加载配置并组装核心服务。
/// 3. 交由 `kabu-api` 绑定端口对外服务，直至进程终止。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 初始化日志
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .init();

    info!("Kabu order-routing gateway starting...");

    // 2. 配置与服务组装
    let config = kabu_app::load_config()?;
    let services = kabu_app::build_services(&config)?;

    let state = AppState {
        session: services.session,
        gateway: services.gateway,
        positions: services.positions,
    };

    // 3. 启动 HTTP 服务 (阻塞至进程退出)
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    kabu_api::server::start_server(state, &bind_addr).await
}
