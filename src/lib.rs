//! 按设备跳转应用商店的重定向服务
//!
//! 请求路径先匹配自定义 slug 规则，再匹配页面规则；根据 User-Agent 判定设备，
//! 移动端展示跳转中间页，桌面端跳转到备用地址。

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod logger;
pub mod middleware;
pub mod models;
pub mod redirect;
pub mod server;
pub mod server_utils;
pub mod services;
pub mod store;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

pub use config::Config;
pub use error::{RedirectError, Result};
pub use server::{build_router, AppState};

/// 过期缓存清理间隔
const CACHE_CLEANUP_INTERVAL: Duration = Duration::from_secs(600);

/// 启动参数
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config_path: Option<PathBuf>,
    pub port: Option<u16>,
    pub verbose: bool,
    /// 旧版 JSON 配置文件，启动时导入一次
    pub import_legacy: Option<PathBuf>,
}

/// 加载配置并应用命令行覆盖项
pub fn prepare_config(options: &RunOptions) -> Result<Config> {
    let mut config = config::load_config(options.config_path.as_deref())?;
    if let Some(port) = options.port {
        config.server.port = port;
        config::validate_config(&config)?;
    }
    Ok(config)
}

/// 读取旧版 JSON 配置并导入
pub fn import_legacy_file(
    db: &database::DbConnection,
    path: &std::path::Path,
) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("无法读取旧版配置: {}", path.display()))?;
    let entries: BTreeMap<String, database::migration::LegacyEntry> = serde_json::from_str(&data)
        .with_context(|| format!("旧版配置格式错误: {}", path.display()))?;

    let conn = database::lock(db)?;
    let report = database::migration::import_legacy_entries(&conn, &entries)?;
    if report.already_done {
        tracing::info!("[迁移] 旧版配置已导入过，忽略 {}", path.display());
    } else {
        tracing::info!(
            "[迁移] 旧版配置导入完成: imported={}, skipped={}",
            report.imported,
            report.skipped
        );
    }
    Ok(())
}

/// 启动服务，直到收到退出信号
pub async fn run(options: RunOptions) -> anyhow::Result<()> {
    let config = prepare_config(&options)?;

    match logger::init(&config.logging, options.verbose) {
        Ok(Some(path)) => tracing::info!("[LOG] 日志文件: {}", path.display()),
        Ok(None) => {}
        Err(e) => eprintln!("日志文件初始化失败，仅输出到控制台: {}", e),
    }

    let db = database::init_database(config.database.path.as_deref())?;
    if let Some(path) = options.import_legacy.as_deref() {
        import_legacy_file(&db, path)?;
    }

    let state = AppState::new(&config, db)?;

    if config.cache.enabled {
        let redirects = state.redirects.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CACHE_CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                let removed = redirects.cleanup_cache();
                if removed > 0 {
                    tracing::debug!("[CACHE] 清理过期缓存: {}", removed);
                }
            }
        });
    }

    server::serve(&config, state).await?;
    Ok(())
}
