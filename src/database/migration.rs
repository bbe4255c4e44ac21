use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::database::dao::RedirectDao;
use crate::models::{RedirectRule, RuleType};
use crate::redirect::{conflict, slug};
use crate::services::sanitize::sanitize_urls;

const LEGACY_IMPORT_KEY: &str = "legacy_import_complete";

/// 旧版配置中的单条记录
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LegacyEntry {
    pub ios_url: String,
    pub android_url: String,
    pub backup_url: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// 导入结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    /// 已导入过，本次未执行
    pub already_done: bool,
}

/// 导入旧版配置（`{ "<页面 id 或 slug>": { ios_url, android_url, backup_url, enabled } }`）
///
/// 只执行一次，完成后在 settings 表记录标记。
/// 纯数字键导入为页面规则，其余键规范化后导入为自定义规则。
/// 与已有规则重名或规范化后为空的键跳过。整个导入在一个事务中完成。
pub fn import_legacy_entries(
    conn: &Connection,
    legacy: &BTreeMap<String, LegacyEntry>,
) -> Result<ImportReport, rusqlite::Error> {
    let done: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key = ?1",
            [LEGACY_IMPORT_KEY],
            |row| row.get(0),
        )
        .optional()?;
    if done.as_deref() == Some("true") {
        tracing::debug!("[迁移] 旧版配置已导入过，跳过");
        return Ok(ImportReport {
            already_done: true,
            ..Default::default()
        });
    }

    tracing::info!("[迁移] 开始导入旧版配置: {} 条", legacy.len());
    let tx = conn.unchecked_transaction()?;
    let mut report = ImportReport::default();

    for (key, entry) in legacy {
        let key = key.trim();
        let (rule_type, reference_key) = if !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) {
            (RuleType::Page, key.trim_start_matches('0').to_string())
        } else {
            (RuleType::Custom, slug::normalize(key))
        };

        if reference_key.is_empty() {
            tracing::warn!("[迁移] 跳过无效键: {:?}", key);
            report.skipped += 1;
            continue;
        }
        if rule_type == RuleType::Custom && conflict::is_reserved(&reference_key) {
            tracing::warn!("[迁移] 跳过保留路径: {}", reference_key);
            report.skipped += 1;
            continue;
        }
        if RedirectDao::get_by_key(&tx, rule_type, &reference_key)?.is_some() {
            tracing::warn!("[迁移] 跳过重复键: {}:{}", rule_type, reference_key);
            report.skipped += 1;
            continue;
        }

        let (urls, rejected) =
            sanitize_urls(&entry.ios_url, &entry.android_url, &entry.backup_url);
        for rejection in &rejected {
            tracing::warn!(
                "[迁移] {} 的字段 {} 已清空: {}",
                key,
                rejection.field,
                rejection.message
            );
        }

        let mut rule = RedirectRule::new(rule_type, &reference_key);
        rule.ios_url = urls.ios_url;
        rule.android_url = urls.android_url;
        rule.backup_url = urls.backup_url;
        rule.enabled = entry.enabled;
        rule.order = report.imported as i32;
        RedirectDao::upsert(&tx, &rule)?;
        report.imported += 1;
    }

    tx.execute(
        "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, 'true')",
        params![LEGACY_IMPORT_KEY],
    )?;
    tx.commit()?;

    tracing::info!(
        "[迁移] 旧版配置导入完成: imported={}, skipped={}",
        report.imported,
        report.skipped
    );
    Ok(report)
}
