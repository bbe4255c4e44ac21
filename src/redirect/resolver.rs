//! 重定向决策
//!
//! 将匹配到的规则与设备类型组合为具体动作。纯函数，不执行任何 I/O。

use serde::Serialize;

use crate::models::{RedirectRule, RuleType};
use crate::redirect::device::DeviceClass;

/// 重定向动作
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// 渲染中间页，由客户端脚本跳转到商店
    ShowInterstitial { store_url: String, backup_url: String },
    /// 服务端 3xx 跳转
    ServerRedirect { target_url: String },
    /// 不做处理
    NoAction,
}

impl Action {
    /// 动作的目标 URL（NoAction 为 None）
    pub fn target(&self) -> Option<&str> {
        match self {
            Action::ShowInterstitial { store_url, .. } => Some(store_url),
            Action::ServerRedirect { target_url } => Some(target_url),
            Action::NoAction => None,
        }
    }
}

/// 决策规则
///
/// 按以下优先级：
/// 1. 移动设备且规则配置了该平台的商店 URL → `ShowInterstitial`
/// 2. 配置了备用 URL 且为 Custom 规则 → `ServerRedirect`
/// 3. 其他 → `NoAction`
///
/// Page 规则从不产生服务端跳转：页面本身是有效内容，没有商店 URL 时照常渲染。
pub fn resolve(rule: &RedirectRule, device: DeviceClass) -> Action {
    let store_url = match device {
        DeviceClass::Ios => rule.ios_url.as_str(),
        DeviceClass::Android => rule.android_url.as_str(),
        DeviceClass::Other => "",
    };

    if !store_url.is_empty() {
        return Action::ShowInterstitial {
            store_url: store_url.to_string(),
            backup_url: rule.backup_url.clone(),
        };
    }

    match rule.rule_type {
        RuleType::Custom if !rule.backup_url.is_empty() => Action::ServerRedirect {
            target_url: rule.backup_url.clone(),
        },
        _ => Action::NoAction,
    }
}
