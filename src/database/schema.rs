use rusqlite::Connection;

/// 创建表结构
pub fn create_tables(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS redirects (
            id TEXT PRIMARY KEY,
            rule_type TEXT NOT NULL CHECK (rule_type IN ('page', 'custom')),
            reference_key TEXT NOT NULL,
            title TEXT,
            ios_url TEXT NOT NULL DEFAULT '',
            android_url TEXT NOT NULL DEFAULT '',
            backup_url TEXT NOT NULL DEFAULT '',
            enabled INTEGER NOT NULL DEFAULT 1,
            sort_order INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            UNIQUE (rule_type, reference_key)
        );

        CREATE INDEX IF NOT EXISTS idx_redirects_type_order
            ON redirects (rule_type, sort_order, created_at);

        CREATE TABLE IF NOT EXISTS content (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            content_type TEXT NOT NULL DEFAULT 'page',
            slug TEXT NOT NULL,
            title TEXT NOT NULL,
            body TEXT NOT NULL DEFAULT '',
            public INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_content_slug ON content (slug);",
    )
}
