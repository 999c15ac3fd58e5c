//! # `kabu-session` - 会话生命周期管理
//!
//! 负责访问凭据的获取、探活、透明续期与登出：
//! - `SessionManager`: 进程内唯一的会话所有者，串行化授权流程
//! - `AuthFlow`: 一次性授权码 → 完整会话的换取流程 (超时有界)
//! - `AuthCodeSource`: 可插拔的授权码获取协作者 (本地回调监听 / 手动输入)

pub mod code_source;
pub mod error;
pub mod flow;
pub mod listener;
pub mod manager;
