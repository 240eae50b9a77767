use crate::config::AppConfig;
use crate::errors::Result;
use crate::storage::Storage;
use std::sync::Arc;
use tracing::{info, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
}

/// 准备服务器启动的上下文
/// 连接数据库并执行迁移
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let config = AppConfig::get();
    info!(
        "Connecting to database (pool size {}, timeout {}s)",
        config.database.pool_size, config.database.timeout
    );

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    Ok(StartupContext { storage })
}
