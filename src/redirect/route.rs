//! 请求路径解析
//!
//! 将请求路径转换为候选路由键：自定义 slug 和页面。

use crate::error::Result;
use crate::models::ContentRef;
use crate::redirect::matcher::RouteKey;
use crate::redirect::slug;
use crate::store::ContentLookup;

/// 从请求 URI 中提取相对路径
///
/// 去掉查询串与片段、首尾的 `/`，再去掉站点基础路径前缀。
/// 根路径返回 `None`。
pub fn extract_request_slug(uri: &str, base_path: &str) -> Option<String> {
    let path = uri.split(['?', '#']).next().unwrap_or_default();
    let mut path = path.trim_matches('/');

    let base = base_path.trim_matches('/');
    if !base.is_empty() {
        if path == base {
            path = "";
        } else if let Some(rest) = path
            .strip_prefix(base)
            .and_then(|rest| rest.strip_prefix('/'))
        {
            path = rest.trim_start_matches('/');
        }
    }

    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}

/// 请求路径对应的路由
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRoute {
    /// 原始相对路径
    pub path: String,
    /// 路径已是规范 slug 时的自定义路由键
    pub slug_key: Option<RouteKey>,
    /// 路径命中的站内内容
    pub content: Option<ContentRef>,
}

impl ResolvedRoute {
    pub fn page_key(&self) -> Option<RouteKey> {
        self.content
            .as_ref()
            .map(|content| RouteKey::Page(content.id.to_string()))
    }
}

/// 解析请求路径
///
/// 只有规范形式的路径才会作为 slug 路由键（规则的引用键总是规范化的，
/// 非规范路径不可能精确匹配）。
pub fn resolve_route(path: &str, content: &dyn ContentLookup) -> Result<ResolvedRoute> {
    let slug_key = slug::is_canonical(path).then(|| RouteKey::Slug(path.to_string()));
    let content = content.find_content_by_slug(path)?;

    Ok(ResolvedRoute {
        path: path.to_string(),
        slug_key,
        content,
    })
}
