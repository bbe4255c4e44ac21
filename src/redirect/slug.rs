//! Slug 规范化
//!
//! 将用户输入的 slug 转换为可比较的规范形式

/// 规范化 slug
///
/// 规则：
/// - 转为小写
/// - `[a-z0-9-]` 以外的字符替换为 `-`
/// - 连续的 `-` 合并为一个
/// - 去掉首尾的 `-`
///
/// 空输入返回空字符串，由调用方拒绝。
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());

    for c in raw.chars().flat_map(char::to_lowercase) {
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() {
            c
        } else {
            '-'
        };
        if c == '-' && (out.is_empty() || out.ends_with('-')) {
            continue;
        }
        out.push(c);
    }

    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// 检查 slug 是否已是规范形式
pub fn is_canonical(slug: &str) -> bool {
    !slug.is_empty() && normalize(slug) == slug
}
