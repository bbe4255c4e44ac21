//! 规则 URL 清洗
//!
//! 不合法的字段清空并记录原因，不拒绝整条规则。

use crate::models::FieldRejection;

const IOS_STORE_PREFIX: &str = "https://apps.apple.com";
const ANDROID_STORE_PREFIX: &str = "https://play.google.com";

/// 清洗后的三个 URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizedUrls {
    pub ios_url: String,
    pub android_url: String,
    pub backup_url: String,
}

/// 清洗 iOS/Android/备用地址
pub fn sanitize_urls(
    ios_url: &str,
    android_url: &str,
    backup_url: &str,
) -> (SanitizedUrls, Vec<FieldRejection>) {
    let mut rejected = Vec::new();

    let ios_url = keep_if(
        "ios_url",
        ios_url,
        |url| is_store_url(url, IOS_STORE_PREFIX),
        "iOS URL must start with https://apps.apple.com",
        &mut rejected,
    );
    let android_url = keep_if(
        "android_url",
        android_url,
        |url| is_store_url(url, ANDROID_STORE_PREFIX),
        "Android URL must start with https://play.google.com",
        &mut rejected,
    );
    let backup_url = keep_if(
        "backup_url",
        backup_url,
        is_absolute_http_url,
        "Backup URL must be an absolute http(s) URL",
        &mut rejected,
    );

    (
        SanitizedUrls {
            ios_url,
            android_url,
            backup_url,
        },
        rejected,
    )
}

fn keep_if(
    field: &str,
    raw: &str,
    valid: impl Fn(&str) -> bool,
    message: &str,
    rejected: &mut Vec<FieldRejection>,
) -> String {
    let value = raw.trim();
    if value.is_empty() {
        return String::new();
    }
    if valid(value) {
        return value.to_string();
    }
    tracing::debug!("[ADMIN] 字段 {} 不合法，已清空", field);
    rejected.push(FieldRejection {
        field: field.to_string(),
        message: message.to_string(),
    });
    String::new()
}

fn is_store_url(url: &str, prefix: &str) -> bool {
    url.starts_with(prefix) && is_absolute_http_url(url)
}

/// 是否为带主机名的绝对 http(s) URL
pub fn is_absolute_http_url(raw: &str) -> bool {
    match url::Url::parse(raw) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}
