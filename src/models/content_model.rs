//! 站点内容模型
//!
//! 冲突检测和页面规则所依赖的站内内容（页面、文章等）。

use serde::{Deserialize, Serialize};

/// 站内内容引用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRef {
    pub id: i64,
    /// 内容类型（page、post 或自定义类型）
    pub content_type: String,
    pub slug: String,
    pub title: String,
}

/// 完整内容（用于页面渲染）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub id: i64,
    pub content_type: String,
    pub slug: String,
    pub title: String,
    pub body: String,
    pub public: bool,
    pub created_at: i64,
}

/// 新建内容请求
#[derive(Debug, Clone, Deserialize)]
pub struct NewContent {
    #[serde(default = "default_content_type")]
    pub content_type: String,
    /// 期望的 slug；为空时根据标题生成
    #[serde(default)]
    pub slug: Option<String>,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

fn default_content_type() -> String {
    "page".to_string()
}

/// 页面下拉选项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageOption {
    pub value: String,
    pub label: String,
}
