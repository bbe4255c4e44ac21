//! 配置类型定义
//!
//! 所有字段都有默认值，配置文件只需写出需要覆盖的部分。

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 服务配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub site: SiteConfig,
    pub redirect: RedirectConfig,
    pub cache: CacheConfig,
    pub database: DatabaseConfig,
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
}

/// HTTP 服务配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 请求体大小上限（字节）
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_body_bytes: 64 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 站点配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// 站点首页地址
    pub home_url: String,
    /// 站点基础路径（部署在子目录时使用）
    pub base_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            home_url: "http://localhost:8080".to_string(),
            base_path: String::new(),
        }
    }
}

/// 跳转行为配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedirectConfig {
    /// 服务端跳转使用的状态码
    pub status_code: u16,
    /// Custom 规则无可用地址时跳转首页
    pub home_fallback: bool,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            status_code: 302,
            home_fallback: true,
        }
    }
}

/// 规则缓存配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 3600,
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// 为空时使用 ~/.device-redirect/redirects.db
    pub path: Option<PathBuf>,
}

/// 管理接口配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// 为空时管理接口不做鉴权（由宿主负责）
    pub api_key: Option<String>,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file_enabled: bool,
    /// 为空时使用 ~/.device-redirect/logs
    pub dir: Option<PathBuf>,
    pub retention_days: u32,
    pub max_file_size: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_enabled: false,
            dir: None,
            retention_days: 7,
            max_file_size: 10 * 1024 * 1024,
        }
    }
}
