//! SQLite 存储实现

use crate::database::dao::{ContentDao, RedirectDao};
use crate::database::{self, DbConnection};
use crate::error::Result;
use crate::models::{Content, ContentRef, RedirectRule, RuleFilter, RuleType};
use crate::store::{ContentLookup, RuleStore};

/// 基于 SQLite 的规则存储
#[derive(Clone)]
pub struct SqliteRuleStore {
    db: DbConnection,
}

impl SqliteRuleStore {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

impl RuleStore for SqliteRuleStore {
    fn get(&self, rule_type: RuleType, reference_key: &str) -> Result<Option<RedirectRule>> {
        let conn = database::lock(&self.db)?;
        Ok(RedirectDao::get_by_key(&conn, rule_type, reference_key)?)
    }

    fn get_by_id(&self, id: &str) -> Result<Option<RedirectRule>> {
        let conn = database::lock(&self.db)?;
        Ok(RedirectDao::get_by_id(&conn, id)?)
    }

    fn list(
        &self,
        filter: &RuleFilter,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<RedirectRule>, u64)> {
        let page_size = page_size.max(1);
        let offset = u64::from(page.max(1) - 1) * u64::from(page_size);
        let conn = database::lock(&self.db)?;
        Ok(RedirectDao::list(&conn, filter, page_size, offset)?)
    }

    fn upsert(&self, rule: &RedirectRule) -> Result<String> {
        let conn = database::lock(&self.db)?;
        RedirectDao::upsert(&conn, rule)?;
        Ok(rule.id.clone())
    }

    fn delete_many(&self, ids: &[String]) -> Result<usize> {
        let conn = database::lock(&self.db)?;
        Ok(RedirectDao::delete_many(&conn, ids)?)
    }

    fn set_enabled_many(&self, ids: &[String], enabled: bool) -> Result<usize> {
        let conn = database::lock(&self.db)?;
        let now = chrono::Utc::now().timestamp();
        Ok(RedirectDao::set_enabled_many(&conn, ids, enabled, now)?)
    }

    fn custom_slug_exists(&self, slug: &str) -> Result<bool> {
        let conn = database::lock(&self.db)?;
        Ok(RedirectDao::custom_slug_exists(&conn, slug)?)
    }
}

/// 基于 SQLite 的内容查询
#[derive(Clone)]
pub struct SqliteContentStore {
    db: DbConnection,
}

impl SqliteContentStore {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

impl ContentLookup for SqliteContentStore {
    fn find_content_by_slug(&self, slug: &str) -> Result<Option<ContentRef>> {
        let conn = database::lock(&self.db)?;
        Ok(ContentDao::find_public_by_slug(&conn, slug)?)
    }

    fn content_slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
        let conn = database::lock(&self.db)?;
        Ok(ContentDao::slug_exists(&conn, slug, exclude_id)?)
    }

    fn get_content(&self, id: i64) -> Result<Option<Content>> {
        let conn = database::lock(&self.db)?;
        Ok(ContentDao::get_by_id(&conn, id)?)
    }
}
