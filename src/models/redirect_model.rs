//! 重定向规则模型
//!
//! 规则、规则类型、列表过滤与分页结构定义。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 规则类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    /// 绑定到站内页面 ID
    Page,
    /// 绑定到自定义 slug
    Custom,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::Page => "page",
            RuleType::Custom => "custom",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "page" => Ok(RuleType::Page),
            "custom" => Ok(RuleType::Custom),
            _ => Err(format!("Invalid rule type: {s}")),
        }
    }
}

/// 重定向规则
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedirectRule {
    pub id: String,
    pub rule_type: RuleType,
    /// Page 规则为页面 ID，Custom 规则为规范化后的 slug
    pub reference_key: String,
    pub title: Option<String>,
    #[serde(default)]
    pub ios_url: String,
    #[serde(default)]
    pub android_url: String,
    #[serde(default)]
    pub backup_url: String,
    pub enabled: bool,
    #[serde(default)]
    pub order: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl RedirectRule {
    /// 创建新的规则（启用状态，URL 为空）
    pub fn new(rule_type: RuleType, reference_key: &str) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            rule_type,
            reference_key: reference_key.to_string(),
            title: None,
            ios_url: String::new(),
            android_url: String::new(),
            backup_url: String::new(),
            enabled: true,
            order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn key(&self) -> RuleKey {
        RuleKey::new(self.rule_type, &self.reference_key)
    }
}

/// 规则唯一键 (rule_type, reference_key)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleKey {
    pub rule_type: RuleType,
    pub reference_key: String,
}

impl RuleKey {
    pub fn new(rule_type: RuleType, reference_key: &str) -> Self {
        Self {
            rule_type,
            reference_key: reference_key.to_string(),
        }
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.rule_type, self.reference_key)
    }
}

/// 管理端提交的规则内容（创建/更新）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleInput {
    /// 创建时必填；更新时忽略
    #[serde(default, rename = "type")]
    pub rule_type: Option<RuleType>,
    /// Page 规则为页面 ID，Custom 规则为原始 slug
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub ios_url: String,
    #[serde(default)]
    pub android_url: String,
    #[serde(default)]
    pub backup_url: String,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub order: Option<i32>,
}

/// 被清空的字段及原因
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRejection {
    pub field: String,
    pub message: String,
}

/// 保存结果
#[derive(Debug, Clone, Serialize)]
pub struct SaveOutcome {
    pub rule: RedirectRule,
    pub rejected_fields: Vec<FieldRejection>,
}

/// 列表过滤条件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleFilter {
    pub rule_type: Option<RuleType>,
    /// 按标题或引用键模糊搜索
    pub search: Option<String>,
    /// 按引用键精确过滤
    pub reference: Option<String>,
}

/// 列表项（附带显示标题和访问 URL）
#[derive(Debug, Clone, Serialize)]
pub struct RuleListItem {
    #[serde(flatten)]
    pub rule: RedirectRule,
    pub display_title: String,
    pub url: String,
}

/// 分页结果
#[derive(Debug, Clone, Serialize)]
pub struct RulePage {
    pub items: Vec<RuleListItem>,
    pub total: u64,
    pub pages: u64,
    pub page: u32,
    pub per_page: u32,
}

/// 批量操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Enable,
    Disable,
    Delete,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_type_roundtrip() {
        assert_eq!("page".parse::<RuleType>().unwrap(), RuleType::Page);
        assert_eq!("Custom".parse::<RuleType>().unwrap(), RuleType::Custom);
        assert!("slug".parse::<RuleType>().is_err());
        assert_eq!(RuleType::Custom.to_string(), "custom");
    }

    #[test]
    fn test_new_rule_defaults() {
        let rule = RedirectRule::new(RuleType::Custom, "promo");
        assert!(rule.enabled);
        assert!(rule.ios_url.is_empty() && rule.android_url.is_empty());
        assert!(rule.backup_url.is_empty());
        assert_eq!(rule.key(), RuleKey::new(RuleType::Custom, "promo"));
    }

    #[test]
    fn test_rule_input_uses_type_field() {
        let input: RuleInput =
            serde_json::from_str(r#"{"type":"custom","reference":"Promo","ios_url":"x"}"#).unwrap();
        assert_eq!(input.rule_type, Some(RuleType::Custom));
        assert_eq!(input.reference.as_deref(), Some("Promo"));
        assert!(input.android_url.is_empty());
    }
}
