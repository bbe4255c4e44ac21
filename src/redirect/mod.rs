//! 重定向核心
//!
//! - `slug`：slug 规范化
//! - `device`：User-Agent 设备识别
//! - `matcher`：规则匹配
//! - `resolver`：按规则和设备给出动作
//! - `conflict`：slug 冲突检测
//! - `route`：请求路径解析
//! - `engine`：串联以上组件处理请求

pub mod conflict;
pub mod device;
pub mod engine;
pub mod matcher;
pub mod resolver;
pub mod route;
pub mod slug;


pub use conflict::{ConflictGuard, SlugCheck};
pub use device::{classify, DeviceClass};
pub use engine::{Decision, EngineOptions, Interstitial, RedirectEngine, ScriptConfig};
pub use matcher::{match_rule, RouteKey, RuleMatcher};
pub use resolver::{resolve, Action};
pub use slug::normalize;
