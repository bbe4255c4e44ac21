//! 配置管理
//!
//! YAML 配置文件，所有字段带默认值；命令行参数可覆盖端口和日志级别。

mod loader;
mod types;

pub use loader::{load_config, parse_config, validate_config};
pub use types::{
    AdminConfig, CacheConfig, Config, DatabaseConfig, LoggingConfig, RedirectConfig,
    ServerConfig, SiteConfig,
};
