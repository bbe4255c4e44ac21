//! 错误类型
//!
//! 定义规则写入、匹配和存储过程中可能发生的错误

use thiserror::Error;

/// 重定向服务错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RedirectError {
    /// 输入校验失败（字段为空、格式错误等）
    #[error("校验失败: {field} - {message}")]
    Validation { field: String, message: String },

    /// slug 已被内容或其他重定向占用
    #[error("{0}")]
    Conflict(String),

    /// 目标规则不存在
    #[error("未找到: {0}")]
    NotFound(String),

    /// 存储层错误（写入已回滚）
    #[error("存储错误: {0}")]
    Store(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 内部一致性错误
    #[error("内部错误: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, RedirectError>;

impl RedirectError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        RedirectError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// 获取对应的 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            RedirectError::Validation { .. } => 400,
            RedirectError::Conflict(_) => 409,
            RedirectError::NotFound(_) => 404,
            RedirectError::Store(_) => 500,
            RedirectError::Config(_) => 500,
            RedirectError::Internal(_) => 500,
        }
    }

    /// 获取错误类型字符串
    pub fn error_type(&self) -> &'static str {
        match self {
            RedirectError::Validation { .. } => "validation_error",
            RedirectError::Conflict(_) => "conflict_error",
            RedirectError::NotFound(_) => "not_found",
            RedirectError::Store(_) => "store_error",
            RedirectError::Config(_) => "config_error",
            RedirectError::Internal(_) => "internal_error",
        }
    }

    /// 转换为 JSON 错误响应
    pub fn to_json(&self) -> serde_json::Value {
        let mut body = serde_json::json!({
            "error": {
                "message": self.to_string(),
                "type": self.error_type(),
                "code": self.status_code()
            }
        });
        if let RedirectError::Validation { field, .. } = self {
            body["error"]["field"] = serde_json::Value::String(field.clone());
        }
        body
    }
}

impl From<rusqlite::Error> for RedirectError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, msg)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                let detail = msg.as_deref().unwrap_or_default();
                if detail.contains("redirects.rule_type") || detail.contains("redirects.reference_key") {
                    RedirectError::Conflict("This slug is already used by a redirect".to_string())
                } else {
                    RedirectError::Store(err.to_string())
                }
            }
            _ => RedirectError::Store(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(RedirectError::validation("ios_url", "bad").status_code(), 400);
        assert_eq!(RedirectError::Conflict("x".to_string()).status_code(), 409);
        assert_eq!(RedirectError::NotFound("x".to_string()).status_code(), 404);
        assert_eq!(RedirectError::Store("x".to_string()).status_code(), 500);
        assert_eq!(RedirectError::Internal("x".to_string()).status_code(), 500);
    }

    #[test]
    fn test_conflict_message_is_reason() {
        let err = RedirectError::Conflict("This slug is already used by a page".to_string());
        assert_eq!(err.to_string(), "This slug is already used by a page");
    }

    #[test]
    fn test_to_json() {
        let err = RedirectError::validation("slug", "Please enter a custom slug");
        let json = err.to_json();

        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Please enter a custom slug"));
        assert_eq!(json["error"]["type"], "validation_error");
        assert_eq!(json["error"]["code"], 400);
        assert_eq!(json["error"]["field"], "slug");
    }

    #[test]
    fn test_unique_violation_maps_to_conflict() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE redirects (rule_type TEXT, reference_key TEXT, UNIQUE(rule_type, reference_key));
             INSERT INTO redirects VALUES ('custom', 'offer');",
        )
        .unwrap();
        let err = conn
            .execute("INSERT INTO redirects VALUES ('custom', 'offer')", [])
            .unwrap_err();

        assert!(matches!(RedirectError::from(err), RedirectError::Conflict(_)));
    }
}
