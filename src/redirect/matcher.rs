//! 规则匹配
//!
//! 根据路由键查找唯一适用的启用规则

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{RedirectRule, RuleKey, RuleType};
use crate::store::RuleStore;

/// 请求解析出的路由键
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum RouteKey {
    /// 站内页面 ID
    Page(String),
    /// 规范化后的 slug
    Slug(String),
}

impl RouteKey {
    pub fn rule_type(&self) -> RuleType {
        match self {
            RouteKey::Page(_) => RuleType::Page,
            RouteKey::Slug(_) => RuleType::Custom,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            RouteKey::Page(id) | RouteKey::Slug(id) => id,
        }
    }

    pub fn to_rule_key(&self) -> RuleKey {
        RuleKey::new(self.rule_type(), self.value())
    }
}

/// 在规则列表中查找匹配的启用规则
///
/// 要求：
/// - `enabled == true`
/// - 规则类型与路由键类型一致
/// - `reference_key` 与路由键值完全相等（区分大小写）
pub fn match_rule<'a>(rules: &'a [RedirectRule], route_key: &RouteKey) -> Option<&'a RedirectRule> {
    let rule_type = route_key.rule_type();
    rules.iter().find(|rule| {
        rule.enabled && rule.rule_type == rule_type && rule.reference_key == route_key.value()
    })
}

/// 基于规则存储的匹配器
///
/// 存储按键直接查询，结果与 `match_rule` 对全量列表的扫描一致。
#[derive(Clone)]
pub struct RuleMatcher {
    store: Arc<dyn RuleStore>,
}

impl RuleMatcher {
    pub fn new(store: Arc<dyn RuleStore>) -> Self {
        Self { store }
    }

    /// 查找路由键对应的启用规则
    pub fn find(&self, route_key: &RouteKey) -> Result<Option<RedirectRule>> {
        let rule = self
            .store
            .get(route_key.rule_type(), route_key.value())?
            .filter(|rule| rule.enabled);

        if let Some(ref rule) = rule {
            // 存储返回的规则必须与查询键一致
            if rule.rule_type != route_key.rule_type() || rule.reference_key != route_key.value() {
                tracing::error!(
                    rule_id = %rule.id,
                    route = %route_key.to_rule_key(),
                    "[REDIRECT] 存储返回的规则与路由键不一致，已忽略"
                );
                return Ok(None);
            }
        }
        Ok(rule)
    }
}
