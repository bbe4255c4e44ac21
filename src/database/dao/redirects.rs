use crate::models::{RedirectRule, RuleFilter, RuleType};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

pub struct RedirectDao;

const COLUMNS: &str = "r.id, r.rule_type, r.reference_key, r.title, r.ios_url, r.android_url,
                       r.backup_url, r.enabled, r.sort_order, r.created_at, r.updated_at";

fn map_row(row: &Row) -> Result<RedirectRule, rusqlite::Error> {
    let rule_type: String = row.get(1)?;
    let rule_type = rule_type.parse::<RuleType>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, Type::Text, e.into())
    })?;

    Ok(RedirectRule {
        id: row.get(0)?,
        rule_type,
        reference_key: row.get(2)?,
        title: row.get(3)?,
        ios_url: row.get(4)?,
        android_url: row.get(5)?,
        backup_url: row.get(6)?,
        enabled: row.get::<_, i32>(7)? == 1,
        order: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// 转义 LIKE 通配符
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

impl RedirectDao {
    pub fn get_by_key(
        conn: &Connection,
        rule_type: RuleType,
        reference_key: &str,
    ) -> Result<Option<RedirectRule>, rusqlite::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM redirects r WHERE r.rule_type = ?1 AND r.reference_key = ?2"
        );
        conn.query_row(&sql, params![rule_type.as_str(), reference_key], map_row)
            .optional()
    }

    pub fn get_by_id(conn: &Connection, id: &str) -> Result<Option<RedirectRule>, rusqlite::Error> {
        let sql = format!("SELECT {COLUMNS} FROM redirects r WHERE r.id = ?1");
        conn.query_row(&sql, [id], map_row).optional()
    }

    /// 分页查询
    ///
    /// 搜索同时匹配规则标题、引用键以及页面规则对应的页面标题。
    pub fn list(
        conn: &Connection,
        filter: &RuleFilter,
        limit: u32,
        offset: u64,
    ) -> Result<(Vec<RedirectRule>, u64), rusqlite::Error> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut args: Vec<Value> = Vec::new();

        if let Some(rule_type) = filter.rule_type {
            clauses.push("r.rule_type = ?");
            args.push(Value::Text(rule_type.as_str().to_string()));
        }
        if let Some(reference) = filter.reference.as_deref().filter(|s| !s.is_empty()) {
            clauses.push("r.reference_key = ?");
            args.push(Value::Text(reference.to_string()));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            clauses.push(
                "(r.title LIKE ? ESCAPE '\\' OR r.reference_key LIKE ? ESCAPE '\\' OR c.title LIKE ? ESCAPE '\\')",
            );
            let pattern = like_pattern(search);
            args.push(Value::Text(pattern.clone()));
            args.push(Value::Text(pattern.clone()));
            args.push(Value::Text(pattern));
        }

        let from = "FROM redirects r
                    LEFT JOIN content c
                      ON r.rule_type = 'page' AND CAST(c.id AS TEXT) = r.reference_key";
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) {from} {where_sql}"),
            params_from_iter(args.iter()),
            |row| row.get(0),
        )?;

        let sql = format!(
            "SELECT {COLUMNS} {from} {where_sql}
             ORDER BY r.sort_order, r.created_at DESC, r.id
             LIMIT ? OFFSET ?"
        );
        let mut page_args = args;
        page_args.push(Value::Integer(i64::from(limit)));
        page_args.push(Value::Integer(offset as i64));

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(page_args.iter()), map_row)?;
        let items = rows.collect::<Result<Vec<_>, _>>()?;

        Ok((items, total.max(0) as u64))
    }

    /// 插入或按 id 更新
    ///
    /// 更新不会修改 rule_type、reference_key 和 created_at。
    pub fn upsert(conn: &Connection, rule: &RedirectRule) -> Result<(), rusqlite::Error> {
        conn.execute(
            "INSERT INTO redirects (id, rule_type, reference_key, title, ios_url, android_url,
                                    backup_url, enabled, sort_order, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                ios_url = excluded.ios_url,
                android_url = excluded.android_url,
                backup_url = excluded.backup_url,
                enabled = excluded.enabled,
                sort_order = excluded.sort_order,
                updated_at = excluded.updated_at",
            params![
                rule.id,
                rule.rule_type.as_str(),
                rule.reference_key,
                rule.title,
                rule.ios_url,
                rule.android_url,
                rule.backup_url,
                if rule.enabled { 1 } else { 0 },
                rule.order,
                rule.created_at,
                rule.updated_at,
            ],
        )?;
        Ok(())
    }

    /// 批量删除（事务内执行）
    pub fn delete_many(conn: &Connection, ids: &[String]) -> Result<usize, rusqlite::Error> {
        let tx = conn.unchecked_transaction()?;
        let mut affected = 0;
        {
            let mut stmt = tx.prepare("DELETE FROM redirects WHERE id = ?1")?;
            for id in ids {
                affected += stmt.execute([id])?;
            }
        }
        tx.commit()?;
        Ok(affected)
    }

    /// 批量启用/禁用（事务内执行）
    pub fn set_enabled_many(
        conn: &Connection,
        ids: &[String],
        enabled: bool,
        updated_at: i64,
    ) -> Result<usize, rusqlite::Error> {
        let tx = conn.unchecked_transaction()?;
        let mut affected = 0;
        {
            let mut stmt =
                tx.prepare("UPDATE redirects SET enabled = ?1, updated_at = ?2 WHERE id = ?3")?;
            for id in ids {
                affected += stmt.execute(params![if enabled { 1 } else { 0 }, updated_at, id])?;
            }
        }
        tx.commit()?;
        Ok(affected)
    }

    /// 是否存在使用该 slug 的 Custom 规则（不区分大小写）
    pub fn custom_slug_exists(conn: &Connection, slug: &str) -> Result<bool, rusqlite::Error> {
        conn.query_row(
            "SELECT COUNT(*) > 0 FROM redirects
             WHERE rule_type = 'custom' AND lower(reference_key) = lower(?1)",
            [slug],
            |row| row.get(0),
        )
    }
}
