use serde::{Deserialize, Serialize};

/// 全局应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub broker: BrokerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 券商开放平台应用凭据 (Kite Connect)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    pub api_key: String,
    pub api_secret: String,
    /// 注册在券商后台的回调地址，授权码将回传到此 URL
    pub redirect_uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    /// 会话凭据文件名 (位于 data_dir 下)
    pub session_file: String,
    /// 订单审计日志文件名 (位于 data_dir 下)
    pub order_log_file: String,
}

/// 授权码获取方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeSourceKind {
    /// 本地回调监听: 打印登录 URL 并等待浏览器重定向回传授权码
    Callback,
    /// 手动模式: 打印登录 URL 并从标准输入读取授权码 (容器/无头环境)
    Manual,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// 等待授权码回传的超时秒数
    pub login_timeout_secs: u64,
    /// 探活失败 (凭据被券商判定失效) 时是否同时删除持久化的会话文件。
    /// false 表示仅丢弃内存态，文件保留待重新认证后覆盖。
    pub clear_store_on_invalid: bool,
    pub code_source: CodeSourceKind,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            broker: BrokerConfig {
                api_key: String::new(),
                api_secret: String::new(),
                redirect_uri: "http://localhost:8080/callback".to_string(),
            },
            storage: StorageConfig {
                data_dir: "data".to_string(),
                session_file: "kite_session.json".to_string(),
                order_log_file: "order.log".to_string(),
            },
            auth: AuthConfig {
                login_timeout_secs: 300,
                clear_store_on_invalid: false,
                code_source: CodeSourceKind::Callback,
            },
        }
    }
}
