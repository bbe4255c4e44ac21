//! 站内内容服务
//!
//! 新建内容时 slug 会避开已有的自定义重定向。

use crate::database::dao::ContentDao;
use crate::database::{self, DbConnection};
use crate::error::{RedirectError, Result};
use crate::models::{Content, NewContent, PageOption};
use crate::redirect::{slug, ConflictGuard};

#[derive(Clone)]
pub struct ContentService {
    db: DbConnection,
    guard: ConflictGuard,
}

impl ContentService {
    pub fn new(db: DbConnection, guard: ConflictGuard) -> Self {
        Self { db, guard }
    }

    /// 创建内容
    ///
    /// slug 为空时由标题生成；与自定义重定向重名时自动追加数字后缀。
    pub fn create(&self, input: NewContent) -> Result<Content> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(RedirectError::validation("title", "Title is required"));
        }
        let content_type = slug::normalize(&input.content_type);
        if content_type.is_empty() {
            return Err(RedirectError::validation(
                "content_type",
                "Content type is required",
            ));
        }

        let desired = slug::normalize(input.slug.as_deref().unwrap_or(title));
        if desired.is_empty() {
            return Err(RedirectError::validation("slug", "Slug cannot be empty"));
        }
        let final_slug = self.guard.resolve_new_content_slug(&desired, None)?;

        let conn = database::lock(&self.db)?;
        if ContentDao::slug_exists(&conn, &final_slug, None)? {
            return Err(RedirectError::Conflict(format!(
                "This slug is already used by another {}",
                content_type
            )));
        }

        let now = chrono::Utc::now().timestamp();
        let id = ContentDao::insert(&conn, &content_type, &final_slug, title, &input.body, now)?;
        let content = ContentDao::get_by_id(&conn, id)?
            .ok_or_else(|| RedirectError::Internal(format!("内容 {} 写入后未找到", id)))?;

        tracing::info!(
            "[CONTENT] 创建内容: id={}, type={}, slug={}",
            content.id,
            content.content_type,
            content.slug
        );
        Ok(content)
    }

    /// 页面下拉选项（value 为页面 id）
    pub fn list_pages(&self) -> Result<Vec<PageOption>> {
        let conn = database::lock(&self.db)?;
        let pages = ContentDao::list_by_type(&conn, "page")?;
        Ok(pages
            .into_iter()
            .map(|page| PageOption {
                value: page.id.to_string(),
                label: page.title,
            })
            .collect())
    }
}
