//! slug 冲突检测
//!
//! 自定义 slug 不能与站内内容或其他重定向重名；新建内容的 slug 也不能抢占已有重定向。
//! 这里只做检查和建议，不修改任何状态。

use std::sync::Arc;

use serde::Serialize;

use crate::error::{RedirectError, Result};
use crate::redirect::slug;
use crate::store::{ContentLookup, RuleStore};

/// slug 已被重定向占用
pub const REDIRECT_CONFLICT: &str = "This slug is already used by a redirect";

/// slug 与服务自身的固定路由重名
pub const RESERVED_CONFLICT: &str = "This slug is reserved";

/// 服务自身占用的一级路径，自定义规则不能使用
pub const RESERVED_SLUGS: [&str; 2] = ["api", "health"];

/// 规范化后的 slug 是否为保留路径
pub fn is_reserved(slug: &str) -> bool {
    RESERVED_SLUGS.contains(&slug)
}

/// slug 可用性检查结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum SlugCheck {
    Available,
    Conflict(String),
}

impl SlugCheck {
    pub fn is_available(&self) -> bool {
        matches!(self, SlugCheck::Available)
    }

    /// 冲突时转换为 `RedirectError::Conflict`
    pub fn into_result(self) -> Result<()> {
        match self {
            SlugCheck::Available => Ok(()),
            SlugCheck::Conflict(reason) => Err(RedirectError::Conflict(reason)),
        }
    }
}

#[derive(Clone)]
pub struct ConflictGuard {
    rules: Arc<dyn RuleStore>,
    content: Arc<dyn ContentLookup>,
}

impl ConflictGuard {
    pub fn new(rules: Arc<dyn RuleStore>, content: Arc<dyn ContentLookup>) -> Self {
        Self { rules, content }
    }

    /// 检查自定义 slug 是否可用
    ///
    /// 依次检查保留路径、站内内容和已有的 Custom 规则（无论是否启用），遇到第一个冲突即返回。
    /// 候选值先规范化；规范化后为空视为校验错误。
    pub fn check_slug_available(&self, candidate: &str) -> Result<SlugCheck> {
        let slug = slug::normalize(candidate);
        if slug.is_empty() {
            return Err(RedirectError::validation("slug", "Slug cannot be empty"));
        }

        if is_reserved(&slug) {
            tracing::debug!("[CONFLICT] slug '{}' 为保留路径", slug);
            return Ok(SlugCheck::Conflict(RESERVED_CONFLICT.to_string()));
        }

        if let Some(content) = self.content.find_content_by_slug(&slug)? {
            tracing::debug!(
                "[CONFLICT] slug '{}' 已被内容占用: {}#{}",
                slug,
                content.content_type,
                content.id
            );
            return Ok(SlugCheck::Conflict(format!(
                "This slug is already used by a {}",
                content.content_type
            )));
        }

        if self.rules.custom_slug_exists(&slug)? {
            tracing::debug!("[CONFLICT] slug '{}' 已被重定向占用", slug);
            return Ok(SlugCheck::Conflict(REDIRECT_CONFLICT.to_string()));
        }

        Ok(SlugCheck::Available)
    }

    /// 为新建或重命名的内容计算最终 slug
    ///
    /// 若期望的 slug 与某条 Custom 规则重名，依次尝试 `-1`、`-2`……直到候选值
    /// 不与其他内容的 slug 冲突（排除内容自身）。已有内容有限，循环必然结束。
    pub fn resolve_new_content_slug(
        &self,
        desired: &str,
        exclude_content_id: Option<i64>,
    ) -> Result<String> {
        if !self.rules.custom_slug_exists(desired)? {
            return Ok(desired.to_string());
        }

        let mut suffix: u64 = 1;
        loop {
            let candidate = format!("{}-{}", desired, suffix);
            if !self
                .content
                .content_slug_exists(&candidate, exclude_content_id)?
            {
                tracing::info!(
                    "[CONFLICT] 内容 slug '{}' 与重定向冲突，改用 '{}'",
                    desired,
                    candidate
                );
                return Ok(candidate);
            }
            suffix += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{self, dao::ContentDao};
    use crate::models::{RedirectRule, RuleType};
    use crate::store::{SqliteContentStore, SqliteRuleStore};

    fn setup() -> (ConflictGuard, database::DbConnection, Arc<SqliteRuleStore>) {
        let db = database::open_in_memory().unwrap();
        let rules = Arc::new(SqliteRuleStore::new(db.clone()));
        let content = Arc::new(SqliteContentStore::new(db.clone()));
        (ConflictGuard::new(rules.clone(), content), db, rules)
    }

    fn add_content(db: &database::DbConnection, content_type: &str, slug: &str) -> i64 {
        let conn = db.lock().unwrap();
        ContentDao::insert(&conn, content_type, slug, slug, "", 0).unwrap()
    }

    #[test]
    fn test_free_slug_is_available() {
        let (guard, _, _) = setup();
        assert_eq!(guard.check_slug_available("promo").unwrap(), SlugCheck::Available);
    }

    #[test]
    fn test_content_conflict_names_content_type() {
        let (guard, db, _) = setup();
        add_content(&db, "post", "news");

        assert_eq!(
            guard.check_slug_available("News").unwrap(),
            SlugCheck::Conflict("This slug is already used by a post".to_string())
        );
    }

    #[test]
    fn test_redirect_conflict_even_when_disabled() {
        let (guard, _, rules) = setup();
        let mut rule = RedirectRule::new(RuleType::Custom, "offer");
        rule.enabled = false;
        rules.upsert(&rule).unwrap();

        let check = guard.check_slug_available("  OFFER ").unwrap();
        assert_eq!(check, SlugCheck::Conflict(REDIRECT_CONFLICT.to_string()));
        assert!(check.into_result().is_err());
    }

    #[test]
    fn test_content_checked_before_redirects() {
        let (guard, db, rules) = setup();
        add_content(&db, "page", "offer");
        rules
            .upsert(&RedirectRule::new(RuleType::Custom, "offer"))
            .unwrap();

        assert_eq!(
            guard.check_slug_available("offer").unwrap(),
            SlugCheck::Conflict("This slug is already used by a page".to_string())
        );
    }

    #[test]
    fn test_reserved_route_slugs_conflict() {
        let (guard, _, _) = setup();
        for candidate in ["health", "API", " Health/ "] {
            assert_eq!(
                guard.check_slug_available(candidate).unwrap(),
                SlugCheck::Conflict(RESERVED_CONFLICT.to_string())
            );
        }
        assert!(guard.check_slug_available("health-tips").unwrap().is_available());
    }

    #[test]
    fn test_reserved_checked_before_content() {
        let (guard, db, _) = setup();
        add_content(&db, "page", "health");

        assert_eq!(
            guard.check_slug_available("health").unwrap(),
            SlugCheck::Conflict(RESERVED_CONFLICT.to_string())
        );
    }

    #[test]
    fn test_empty_slug_is_rejected() {
        let (guard, _, _) = setup();
        let err = guard.check_slug_available("--- ").unwrap_err();
        assert!(matches!(err, RedirectError::Validation { .. }));
    }

    #[test]
    fn test_new_content_slug_without_conflict_is_kept() {
        let (guard, _, _) = setup();
        assert_eq!(guard.resolve_new_content_slug("about", None).unwrap(), "about");
    }

    #[test]
    fn test_new_content_slug_gets_suffix() {
        let (guard, _, rules) = setup();
        rules
            .upsert(&RedirectRule::new(RuleType::Custom, "offer"))
            .unwrap();

        assert_eq!(
            guard.resolve_new_content_slug("offer", Some(42)).unwrap(),
            "offer-1"
        );
    }

    #[test]
    fn test_new_content_slug_skips_taken_suffixes() {
        let (guard, db, rules) = setup();
        rules
            .upsert(&RedirectRule::new(RuleType::Custom, "offer"))
            .unwrap();
        add_content(&db, "page", "offer-1");
        let own_id = add_content(&db, "page", "offer-2");

        assert_eq!(
            guard.resolve_new_content_slug("offer", None).unwrap(),
            "offer-3"
        );
        // 内容自身的 slug 不算冲突
        assert_eq!(
            guard.resolve_new_content_slug("offer", Some(own_id)).unwrap(),
            "offer-2"
        );
    }

    #[test]
    fn test_page_rules_do_not_trigger_rename() {
        let (guard, _, rules) = setup();
        rules.upsert(&RedirectRule::new(RuleType::Page, "12")).unwrap();
        assert_eq!(guard.resolve_new_content_slug("12", None).unwrap(), "12");
    }
}
