//! 数据模型

pub mod content_model;
pub mod redirect_model;

pub use content_model::{Content, ContentRef, NewContent, PageOption};
pub use redirect_model::{
    BulkAction, FieldRejection, RedirectRule, RuleFilter, RuleInput, RuleKey, RuleListItem,
    RulePage, RuleType, SaveOutcome,
};
