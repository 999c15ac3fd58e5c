use tracing_subscriber::EnvFilter;

/// # Summary
/// 交互式会话引导工具。服务器宿主上运行一次，完成浏览器登录并持久化会话，
/// 之后 REST / 工具服务即可静默复用该会话。
///
/// # Logic
/// 1. 已持有有效会话时只报告状态，不重复认证。
/// 2. 否则驱动一轮完整授权流程 (登录 URL → 回调/手动输入 → 换码 → 落盘)。
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

    println!("Kabu - Kite Connect Authentication Setup");
    println!("========================================");

    // 1. 已认证则直接报告
    if services.session.is_authenticated().await {
        if let Some(info) = services.session.session_info().await {
            println!("Already authenticated as: {} ({})", info.user_name, info.user_id);
            println!("Session created: {} {}", info.created_date.date_naive(), info.created_time);
        }
        println!("No re-authentication needed.");
        return Ok(());
    }

    // 2. 发起全新授权流程
    println!("Starting fresh authentication...");
    match services.session.get_valid_credential().await {
        Ok(_) => {
            println!("Authentication successful!");
            if let Some(info) = services.session.session_info().await {
                println!("User: {} ({})", info.user_name, info.user_id);
                println!("Session date: {}", info.created_date.date_naive());
            }
            println!("The REST and tool servers can now use this session automatically.");
            Ok(())
        }
        Err(e) => {
            eprintln!("Authentication failed: {}", e);
            std::process::exit(1);
        }
    }
}
