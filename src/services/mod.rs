//! 业务服务模块
//!
//! - `redirect_service`：规则管理（增删改查、批量、slug 校验）
//! - `content_service`：站内内容创建与页面列表
//! - `sanitize`：规则 URL 清洗

pub mod content_service;
pub mod redirect_service;
pub mod sanitize;

pub use content_service::ContentService;
pub use redirect_service::{ListQuery, RedirectService};
