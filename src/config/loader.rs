//! 配置加载与校验

use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::{RedirectError, Result};

/// 从 YAML 文件加载配置
///
/// 文件不存在时返回默认配置；加载后统一校验。
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) if path.exists() => {
            let data = fs::read_to_string(path).map_err(|e| {
                RedirectError::Config(format!("读取配置文件失败 {}: {}", path.display(), e))
            })?;
            parse_config(&data)?
        }
        Some(path) => {
            tracing::warn!("[CONFIG] 配置文件不存在，使用默认配置: {}", path.display());
            Config::default()
        }
        None => Config::default(),
    };

    validate_config(&config)?;
    Ok(config)
}

/// 解析 YAML 配置文本（不校验）
pub fn parse_config(data: &str) -> Result<Config> {
    if data.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(data).map_err(|e| RedirectError::Config(format!("yaml: {}", e)))
}

pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        return Err(RedirectError::Config("server.port must be > 0".into()));
    }
    if config.server.host.trim().is_empty() {
        return Err(RedirectError::Config("server.host is empty".into()));
    }
    if !(300..=399).contains(&config.redirect.status_code) {
        return Err(RedirectError::Config(
            "redirect.status_code must be 300..=399".into(),
        ));
    }
    if config.cache.enabled && config.cache.ttl_secs == 0 {
        return Err(RedirectError::Config(
            "cache.ttl_secs must be > 0 when cache is enabled".into(),
        ));
    }
    match url::Url::parse(&config.site.home_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        _ => {
            return Err(RedirectError::Config(format!(
                "site.home_url is not an absolute http(s) URL: {}",
                config.site.home_url
            )))
        }
    }
    if config.logging.retention_days == 0 {
        return Err(RedirectError::Config(
            "logging.retention_days must be > 0".into(),
        ));
    }
    Ok(())
}
