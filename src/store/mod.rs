//! 存储接口
//!
//! 规则存储和站点内容查询的抽象，核心组件只依赖这些 trait：
//! - `RuleStore`：规则的查询、分页列表和写入
//! - `ContentLookup`：冲突检测和页面路由所需的内容查询
//! - `CachedRuleStore`：读穿透缓存 + 写入时同步失效

mod cached;
mod sqlite;

pub use cached::CachedRuleStore;
pub use sqlite::{SqliteContentStore, SqliteRuleStore};

use crate::error::Result;
use crate::models::{Content, ContentRef, RedirectRule, RuleFilter, RuleType};

/// 规则存储
pub trait RuleStore: Send + Sync {
    /// 按 (rule_type, reference_key) 查询，不区分启用状态
    fn get(&self, rule_type: RuleType, reference_key: &str) -> Result<Option<RedirectRule>>;

    fn get_by_id(&self, id: &str) -> Result<Option<RedirectRule>>;

    /// 分页列表，`page` 从 1 开始；返回 (当前页, 总数)
    fn list(
        &self,
        filter: &RuleFilter,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<RedirectRule>, u64)>;

    /// 插入或更新（按 id），返回 id
    ///
    /// (rule_type, reference_key) 冲突时返回 `RedirectError::Conflict`。
    fn upsert(&self, rule: &RedirectRule) -> Result<String>;

    /// 批量删除，全部成功或全部回滚；返回实际删除数量
    fn delete_many(&self, ids: &[String]) -> Result<usize>;

    /// 批量启用/禁用，全部成功或全部回滚；返回实际更新数量
    fn set_enabled_many(&self, ids: &[String], enabled: bool) -> Result<usize>;

    /// 是否存在使用该 slug 的 Custom 规则（不区分大小写，不区分启用状态）
    fn custom_slug_exists(&self, slug: &str) -> Result<bool>;
}

/// 站点内容查询
pub trait ContentLookup: Send + Sync {
    /// 在所有公开内容类型中按 slug 查找
    fn find_content_by_slug(&self, slug: &str) -> Result<Option<ContentRef>>;

    /// 内容 slug 是否已存在（排除指定内容自身）
    fn content_slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool>;

    fn get_content(&self, id: i64) -> Result<Option<Content>>;
}
