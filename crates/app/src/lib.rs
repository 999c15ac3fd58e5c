//! # `kabu-app` - 组装与启动
//!
//! 纯粹的 DI 容器：加载配置、实例化具体实现并注入到核心服务。
//! 三个入口二进制共用同一套装配逻辑：
//! - `kabu-app`: REST API 服务器
//! - `kabu-mcp`: 标准输入输出上的工具协议服务器
//! - `auth-setup`: 交互式会话引导工具

use std::path::Path;
use std::sync::Arc;

use kabu_broker::kite::KiteClient;
use kabu_core::broker::port::BrokerClient;
use kabu_core::config::{AppConfig, CodeSourceKind};
use kabu_session::code_source::{AuthCodeSource, CallbackCodeSource, StdinCodeSource};
use kabu_session::manager::SessionManager;
use kabu_store::order_log::FileOrderLog;
use kabu_store::session::JsonSessionStore;
use kabu_trade::gateway::OrderGateway;
use kabu_trade::positions::PositionsReader;

/// 组装完成的核心服务集
pub struct Services {
    pub session: Arc<SessionManager>,
    pub gateway: Arc<OrderGateway>,
    pub positions: Arc<PositionsReader>,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}

/// # Summary
/// 加载应用配置。
///
/// # Logic
/// 1. 以 `AppConfig::default()` 为基底。
/// 2. 依次叠加可选的 `config/kabu.toml` 与 `KABU__*` 环境变量
///    (双下划线分层，如 `KABU__BROKER__API_KEY`)。
pub fn load_config() -> Result<AppConfig, config::ConfigError> {
    let defaults = config::Config::try_from(&AppConfig::default())?;
    let settings = config::Config::builder()
        .add_source(defaults)
        .add_source(config::File::with_name("config/kabu").required(false))
        .add_source(
            config::Environment::with_prefix("KABU")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

/// # Summary
/// 实例化基础设施并注入核心服务。
///
/// # Logic
/// 1. 校验券商应用凭据已配置。
/// 2. 实例化文件存储 (会话 + 订单日志) 与 Kite 通道。
/// 3. 按配置选择授权码获取方式。
/// 4. 构造 SessionManager / OrderGateway / PositionsReader。
pub fn build_services(cfg: &AppConfig) -> Result<Services, Box<dyn std::error::Error>> {
    if cfg.broker.api_key.is_empty() || cfg.broker.api_secret.is_empty() {
        return Err(
            "broker credentials missing: set KABU__BROKER__API_KEY and KABU__BROKER__API_SECRET"
                .into(),
        );
    }

    // 1. 基础设施层
    let data_dir = Path::new(&cfg.storage.data_dir);
    std::fs::create_dir_all(data_dir)?;
    let session_store = Arc::new(JsonSessionStore::at(data_dir.join(&cfg.storage.session_file)));
    let order_log = Arc::new(FileOrderLog::at(data_dir.join(&cfg.storage.order_log_file)));

    let broker: Arc<dyn BrokerClient> = Arc::new(KiteClient::new(
        cfg.broker.api_key.clone(),
        cfg.broker.api_secret.clone(),
    ));

    // 2. 授权码获取方式 (配置可插拔)
    let code_source: Arc<dyn AuthCodeSource> = match cfg.auth.code_source {
        CodeSourceKind::Callback => {
            Arc::new(CallbackCodeSource::new(cfg.broker.redirect_uri.clone()))
        }
        CodeSourceKind::Manual => Arc::new(StdinCodeSource),
    };

    // 3. 核心服务层
    let session = SessionManager::new(broker.clone(), session_store, code_source, &cfg.auth);
    let gateway = Arc::new(OrderGateway::new(
        session.clone(),
        broker.clone(),
        order_log,
    ));
    let positions = Arc::new(PositionsReader::new(session.clone(), broker));

    Ok(Services {
        session,
        gateway,
        positions,
    })
}
