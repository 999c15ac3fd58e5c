use kabu_mcp::server::ToolServer;
use tracing_subscriber::EnvFilter;

/// # Summary
/// 工具协议服务器入口。标准输出是协议通道，日志必须全部走 stderr。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = kabu_app::load_config()?;
    let services = kabu_app::build_services(&config)?;

    let server = ToolServer::new(services.gateway, services.positions);
    server.run(tokio::io::stdin(), tokio::io::stdout()).await?;

    Ok(())
}
