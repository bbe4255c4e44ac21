//! 重定向规则管理服务
//!
//! 管理端的规则增删改查、批量操作和 slug 校验。所有写入都经过带缓存的规则存储，
//! 缓存失效在写入返回前完成。

use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;

use crate::cache::{CacheStats, RuleCache};
use crate::error::{RedirectError, Result};
use crate::models::{
    BulkAction, RedirectRule, RuleFilter, RuleInput, RuleListItem, RulePage, RuleType,
    SaveOutcome,
};
use crate::redirect::engine::site_url;
use crate::redirect::{slug, ConflictGuard};
use crate::services::sanitize::sanitize_urls;
use crate::store::{ContentLookup, RuleStore};

/// 重复添加页面规则时的冲突原因
pub const PAGE_ALREADY_REDIRECTED: &str = "This page already has a redirect";

const DEFAULT_PER_PAGE: u32 = 20;
const MAX_PER_PAGE: u32 = 100;

/// 列表查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    #[serde(rename = "type")]
    pub rule_type: Option<RuleType>,
    pub search: Option<String>,
    pub reference: Option<String>,
}

#[derive(Clone)]
pub struct RedirectService {
    rules: Arc<dyn RuleStore>,
    content: Arc<dyn ContentLookup>,
    cache: Arc<RuleCache>,
    guard: ConflictGuard,
    home_url: String,
}

impl RedirectService {
    /// `rules` 应为包裹了 `cache` 的 `CachedRuleStore`
    pub fn new(
        rules: Arc<dyn RuleStore>,
        content: Arc<dyn ContentLookup>,
        cache: Arc<RuleCache>,
        home_url: impl Into<String>,
    ) -> Self {
        let guard = ConflictGuard::new(rules.clone(), content.clone());
        Self {
            rules,
            content,
            cache,
            guard,
            home_url: home_url.into(),
        }
    }

    pub fn guard(&self) -> &ConflictGuard {
        &self.guard
    }

    /// 创建规则
    ///
    /// Custom 规则的 slug 先规范化再做冲突检测；Page 规则要求页面存在且尚无规则。
    pub fn create(&self, input: RuleInput) -> Result<SaveOutcome> {
        let rule_type = input
            .rule_type
            .ok_or_else(|| RedirectError::validation("type", "Rule type is required"))?;
        let raw_reference = input.reference.as_deref().unwrap_or_default().trim();
        if raw_reference.is_empty() {
            return Err(RedirectError::validation("reference", "Reference is required"));
        }

        let reference_key = match rule_type {
            RuleType::Custom => {
                let slug = slug::normalize(raw_reference);
                self.guard.check_slug_available(&slug)?.into_result()?;
                slug
            }
            RuleType::Page => {
                let page_id = parse_page_id(raw_reference)?;
                if self.content.get_content(page_id)?.is_none() {
                    return Err(RedirectError::validation(
                        "reference",
                        format!("Page {} does not exist", page_id),
                    ));
                }
                let key = page_id.to_string();
                if self.rules.get(RuleType::Page, &key)?.is_some() {
                    return Err(RedirectError::Conflict(PAGE_ALREADY_REDIRECTED.to_string()));
                }
                key
            }
        };

        let mut rule = RedirectRule::new(rule_type, &reference_key);
        let rejected_fields = apply_input(&mut rule, &input);
        self.rules.upsert(&rule)?;

        tracing::info!(
            "[ADMIN] 创建规则: id={}, key={}, rejected={}",
            rule.id,
            rule.key(),
            rejected_fields.len()
        );
        Ok(SaveOutcome {
            rule,
            rejected_fields,
        })
    }

    /// 更新规则的地址、标题、启用状态和排序
    ///
    /// 规则的类型和引用键创建后不可修改。
    pub fn update(&self, id: &str, input: RuleInput) -> Result<SaveOutcome> {
        let mut rule = self
            .rules
            .get_by_id(id)?
            .ok_or_else(|| RedirectError::NotFound(format!("redirect {}", id)))?;

        if let Some(rule_type) = input.rule_type {
            if rule_type != rule.rule_type {
                return Err(RedirectError::validation(
                    "type",
                    "Rule type cannot be changed",
                ));
            }
        }
        if let Some(reference) = input.reference.as_deref() {
            let requested = match rule.rule_type {
                RuleType::Custom => slug::normalize(reference),
                RuleType::Page => reference.trim().to_string(),
            };
            if requested != rule.reference_key {
                return Err(RedirectError::validation(
                    "reference",
                    "Reference cannot be changed",
                ));
            }
        }

        let rejected_fields = apply_input(&mut rule, &input);
        rule.updated_at = chrono::Utc::now().timestamp();
        self.rules.upsert(&rule)?;

        tracing::info!("[ADMIN] 更新规则: id={}, key={}", rule.id, rule.key());
        Ok(SaveOutcome {
            rule,
            rejected_fields,
        })
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let removed = self.rules.delete_many(&[id.to_string()])?;
        if removed == 0 {
            return Err(RedirectError::NotFound(format!("redirect {}", id)));
        }
        tracing::info!("[ADMIN] 删除规则: id={}", id);
        Ok(())
    }

    /// 批量启用/禁用/删除，整体原子；返回受影响数量（不存在的 id 不计数）
    pub fn bulk(&self, action: BulkAction, ids: &[String]) -> Result<usize> {
        let mut seen = HashSet::new();
        let ids: Vec<String> = ids
            .iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty() && seen.insert(id.clone()))
            .collect();
        if ids.is_empty() {
            return Err(RedirectError::validation("ids", "No redirects selected"));
        }

        let affected = match action {
            BulkAction::Enable => self.rules.set_enabled_many(&ids, true)?,
            BulkAction::Disable => self.rules.set_enabled_many(&ids, false)?,
            BulkAction::Delete => self.rules.delete_many(&ids)?,
        };

        tracing::info!(
            "[ADMIN] 批量操作: action={:?}, requested={}, affected={}",
            action,
            ids.len(),
            affected
        );
        Ok(affected)
    }

    /// 分页列表，附带显示标题和访问地址
    pub fn list(&self, query: &ListQuery) -> Result<RulePage> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        let filter = RuleFilter {
            rule_type: query.rule_type,
            search: query.search.clone(),
            reference: query.reference.clone(),
        };

        let (rules, total) = self.rules.list(&filter, page, per_page)?;
        let items = rules
            .into_iter()
            .map(|rule| self.list_item(rule))
            .collect::<Result<Vec<_>>>()?;

        Ok(RulePage {
            items,
            total,
            pages: total.div_ceil(u64::from(per_page)),
            page,
            per_page,
        })
    }

    fn list_item(&self, rule: RedirectRule) -> Result<RuleListItem> {
        let (display_title, url) = match rule.rule_type {
            RuleType::Page => {
                let page = match rule.reference_key.parse::<i64>() {
                    Ok(id) => self.content.get_content(id)?,
                    Err(_) => None,
                };
                match page {
                    Some(page) => (page.title, site_url(&self.home_url, &page.slug)),
                    None => (
                        format!("Page #{}", rule.reference_key),
                        String::new(),
                    ),
                }
            }
            RuleType::Custom => (
                rule.title
                    .clone()
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| rule.reference_key.clone()),
                site_url(&self.home_url, &rule.reference_key),
            ),
        };

        Ok(RuleListItem {
            rule,
            display_title,
            url,
        })
    }

    /// 按 (类型, 引用键) 查询单条规则
    pub fn get_entry(&self, rule_type: RuleType, reference: &str) -> Result<Option<RedirectRule>> {
        let key = match rule_type {
            RuleType::Custom => slug::normalize(reference),
            RuleType::Page => reference.trim().to_string(),
        };
        if key.is_empty() {
            return Ok(None);
        }
        self.rules.get(rule_type, &key)
    }

    /// 校验自定义 slug，可用时返回规范化后的 slug
    pub fn validate_slug(&self, candidate: &str) -> Result<String> {
        self.guard.check_slug_available(candidate)?.into_result()?;
        Ok(slug::normalize(candidate))
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// 清理过期缓存项，返回清理数量
    pub fn cleanup_cache(&self) -> usize {
        self.cache.cleanup_expired()
    }
}

fn parse_page_id(raw: &str) -> Result<i64> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| RedirectError::validation("reference", "Page reference must be a page id"))
}

/// 将输入写入规则，返回被清空的字段
fn apply_input(rule: &mut RedirectRule, input: &RuleInput) -> Vec<crate::models::FieldRejection> {
    let (urls, rejected) = sanitize_urls(&input.ios_url, &input.android_url, &input.backup_url);
    rule.ios_url = urls.ios_url;
    rule.android_url = urls.android_url;
    rule.backup_url = urls.backup_url;

    if let Some(title) = &input.title {
        let title = title.trim();
        rule.title = (!title.is_empty()).then(|| title.to_string());
    }
    if let Some(enabled) = input.enabled {
        rule.enabled = enabled;
    }
    if let Some(order) = input.order {
        rule.order = order;
    }
    rejected
}
