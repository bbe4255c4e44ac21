//! 带缓存的规则存储
//!
//! 读取按 (rule_type, reference_key) 走缓存；所有写操作在返回前同步失效受影响的键。

use std::sync::Arc;

use crate::cache::RuleCache;
use crate::error::Result;
use crate::models::{RedirectRule, RuleFilter, RuleKey, RuleType};
use crate::store::RuleStore;

pub struct CachedRuleStore<S> {
    inner: S,
    cache: Arc<RuleCache>,
}

impl<S: RuleStore> CachedRuleStore<S> {
    pub fn new(inner: S, cache: Arc<RuleCache>) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &Arc<RuleCache> {
        &self.cache
    }

    /// 收集 id 对应的现有键
    ///
    /// 规则的键在创建后不可变，因此写入前读取的键就是写入后需要失效的键。
    fn keys_for(&self, ids: &[String]) -> Result<Vec<RuleKey>> {
        let mut keys = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(rule) = self.inner.get_by_id(id)? {
                keys.push(rule.key());
            }
        }
        Ok(keys)
    }
}

impl<S: RuleStore> RuleStore for CachedRuleStore<S> {
    fn get(&self, rule_type: RuleType, reference_key: &str) -> Result<Option<RedirectRule>> {
        let key = RuleKey::new(rule_type, reference_key);
        self.cache
            .get_or_compute(&key, || self.inner.get(rule_type, reference_key))
    }

    fn get_by_id(&self, id: &str) -> Result<Option<RedirectRule>> {
        self.inner.get_by_id(id)
    }

    fn list(
        &self,
        filter: &RuleFilter,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<RedirectRule>, u64)> {
        self.inner.list(filter, page, page_size)
    }

    fn upsert(&self, rule: &RedirectRule) -> Result<String> {
        let mut keys = self.keys_for(std::slice::from_ref(&rule.id))?;
        keys.push(rule.key());

        let result = self.inner.upsert(rule);
        self.cache.invalidate_many(&keys);
        result
    }

    fn delete_many(&self, ids: &[String]) -> Result<usize> {
        let keys = self.keys_for(ids)?;
        let result = self.inner.delete_many(ids);
        self.cache.invalidate_many(&keys);
        result
    }

    fn set_enabled_many(&self, ids: &[String], enabled: bool) -> Result<usize> {
        let keys = self.keys_for(ids)?;
        let result = self.inner.set_enabled_many(ids, enabled);
        self.cache.invalidate_many(&keys);
        result
    }

    fn custom_slug_exists(&self, slug: &str) -> Result<bool> {
        self.inner.custom_slug_exists(slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database;
    use crate::store::SqliteRuleStore;
    use std::time::Duration;

    fn store() -> CachedRuleStore<SqliteRuleStore> {
        let db = database::open_in_memory().unwrap();
        let cache = Arc::new(RuleCache::new(Duration::from_secs(3600)));
        CachedRuleStore::new(SqliteRuleStore::new(db), cache)
    }

    #[test]
    fn test_miss_then_create_is_visible() {
        let store = store();
        assert!(store.get(RuleType::Custom, "promo").unwrap().is_none());

        let rule = RedirectRule::new(RuleType::Custom, "promo");
        store.upsert(&rule).unwrap();

        assert_eq!(store.get(RuleType::Custom, "promo").unwrap(), Some(rule));
    }

    #[test]
    fn test_update_invalidates_cached_rule() {
        let store = store();
        let mut rule = RedirectRule::new(RuleType::Custom, "promo");
        store.upsert(&rule).unwrap();
        assert!(store.get(RuleType::Custom, "promo").unwrap().unwrap().enabled);

        rule.enabled = false;
        store.upsert(&rule).unwrap();
        assert!(!store.get(RuleType::Custom, "promo").unwrap().unwrap().enabled);
    }

    #[test]
    fn test_bulk_writes_invalidate_every_key() {
        let store = store();
        let a = RedirectRule::new(RuleType::Custom, "a");
        let b = RedirectRule::new(RuleType::Page, "7");
        store.upsert(&a).unwrap();
        store.upsert(&b).unwrap();
        store.get(RuleType::Custom, "a").unwrap();
        store.get(RuleType::Page, "7").unwrap();

        let ids = vec![a.id.clone(), b.id.clone()];
        assert_eq!(store.set_enabled_many(&ids, false).unwrap(), 2);
        assert!(!store.get(RuleType::Custom, "a").unwrap().unwrap().enabled);
        assert!(!store.get(RuleType::Page, "7").unwrap().unwrap().enabled);

        assert_eq!(store.delete_many(&ids).unwrap(), 2);
        assert!(store.get(RuleType::Custom, "a").unwrap().is_none());
        assert!(store.get(RuleType::Page, "7").unwrap().is_none());
    }

    #[test]
    fn test_reads_are_served_from_cache() {
        let store = store();
        store.upsert(&RedirectRule::new(RuleType::Custom, "promo")).unwrap();

        store.get(RuleType::Custom, "promo").unwrap();
        store.get(RuleType::Custom, "promo").unwrap();

        assert_eq!(store.cache().stats().hits, 1);
    }
}
