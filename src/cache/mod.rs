//! 规则读取缓存
//!
//! 位于匹配器和规则存储之间的 TTL 缓存：
//! - `get_or_compute` 读穿透，未命中时调用加载函数
//! - 写入方必须调用 `invalidate` / `invalidate_many` 清除受影响的键
//! - 加载期间发生的失效会阻止旧值写回缓存

use crate::models::{RedirectRule, RuleKey};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// 默认缓存时长（1 小时）
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// 带 TTL 的键值缓存
#[derive(Debug)]
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    ttl: Duration,
    enabled: bool,
    /// 每次失效递增，用于丢弃加载期间过期的结果
    generation: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// 规则缓存：键为 (rule_type, reference_key)，值为查询结果（包括"不存在"）
pub type RuleCache = TtlCache<RuleKey, Option<RedirectRule>>;

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            enabled: true,
            generation: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// 创建不缓存任何内容的实例（每次都调用加载函数）
    pub fn disabled() -> Self {
        let mut cache = Self::new(Duration::ZERO);
        cache.enabled = false;
        cache
    }

    /// 获取未过期的缓存值
    pub fn get(&self, key: &K) -> Option<V> {
        if !self.enabled {
            return None;
        }
        let entries = self.entries.read();
        if let Some(entry) = entries.get(key) {
            if Instant::now() < entry.expires_at {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
        }
        drop(entries);

        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    pub fn insert(&self, key: K, value: V) {
        if !self.enabled {
            return;
        }
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.write().insert(key, entry);
    }

    /// 读穿透：命中直接返回，否则调用 `load` 并缓存成功结果
    ///
    /// 加载失败不缓存。
    pub fn get_or_compute<E, F>(&self, key: &K, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let generation = self.generation.load(Ordering::Acquire);
        let value = load()?;

        if self.enabled {
            let mut entries = self.entries.write();
            // 加载期间有写入失效，结果可能已过时
            if self.generation.load(Ordering::Acquire) == generation {
                entries.insert(
                    key.clone(),
                    CacheEntry {
                        value: value.clone(),
                        expires_at: Instant::now() + self.ttl,
                    },
                );
            }
        }
        Ok(value)
    }

    pub fn invalidate(&self, key: &K) {
        let mut entries = self.entries.write();
        self.generation.fetch_add(1, Ordering::AcqRel);
        entries.remove(key);
    }

    pub fn invalidate_many<'a, I>(&self, keys: I)
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        let mut entries = self.entries.write();
        self.generation.fetch_add(1, Ordering::AcqRel);
        for key in keys {
            entries.remove(key);
        }
    }

    /// 清理过期条目
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            enabled: self.enabled,
            size: self.entries.read().len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            ttl_secs: self.ttl.as_secs(),
        }
    }
}

/// 缓存统计
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub enabled: bool,
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    pub ttl_secs: u64,
}

impl CacheStats {
    /// 命中率 (0.0 - 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RuleType;
    use std::cell::Cell;

    fn key(slug: &str) -> RuleKey {
        RuleKey::new(RuleType::Custom, slug)
    }

    #[test]
    fn test_get_or_compute_caches_value() {
        let cache: RuleCache = TtlCache::new(Duration::from_secs(60));
        let calls = Cell::new(0);

        for _ in 0..3 {
            let value: Result<_, ()> = cache.get_or_compute(&key("promo"), || {
                calls.set(calls.get() + 1);
                Ok(Some(RedirectRule::new(RuleType::Custom, "promo")))
            });
            assert!(value.unwrap().is_some());
        }

        assert_eq!(calls.get(), 1);
        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.size, 1);
    }

    #[test]
    fn test_negative_result_is_cached() {
        let cache: RuleCache = TtlCache::new(Duration::from_secs(60));
        let calls = Cell::new(0);

        for _ in 0..2 {
            let value: Result<_, ()> = cache.get_or_compute(&key("missing"), || {
                calls.set(calls.get() + 1);
                Ok(None)
            });
            assert!(value.unwrap().is_none());
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache: RuleCache = TtlCache::new(Duration::from_secs(60));

        let first: Result<Option<RedirectRule>, &str> =
            cache.get_or_compute(&key("promo"), || Err("db down"));
        assert!(first.is_err());
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn test_expiration() {
        let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_millis(10));
        cache.insert("a".to_string(), 1);
        assert_eq!(cache.get(&"a".to_string()), Some(1));

        std::thread::sleep(Duration::from_millis(20));
        assert!(cache.get(&"a".to_string()).is_none());
        assert_eq!(cache.cleanup_expired(), 1);
    }

    #[test]
    fn test_invalidate_many() {
        let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_secs(60));
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        cache.insert("c".to_string(), 3);

        cache.invalidate_many(&["a".to_string(), "b".to_string()]);

        assert!(cache.get(&"a".to_string()).is_none());
        assert!(cache.get(&"b".to_string()).is_none());
        assert_eq!(cache.get(&"c".to_string()), Some(3));
    }

    #[test]
    fn test_invalidation_during_load_drops_result() {
        let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_secs(60));
        let k = "a".to_string();

        let value: Result<u32, ()> = cache.get_or_compute(&k, || {
            cache.invalidate(&"a".to_string());
            Ok(1)
        });

        assert_eq!(value.unwrap(), 1);
        assert!(cache.get(&k).is_none());
    }

    #[test]
    fn test_disabled_cache_always_loads() {
        let cache: TtlCache<String, u32> = TtlCache::disabled();
        let calls = Cell::new(0);
        for _ in 0..3 {
            let _: Result<u32, ()> = cache.get_or_compute(&"a".to_string(), || {
                calls.set(calls.get() + 1);
                Ok(1)
            });
        }
        assert_eq!(calls.get(), 3);
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats {
            enabled: true,
            size: 0,
            hits: 3,
            misses: 1,
            ttl_secs: 60,
        };
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
    }
}
