use crate::models::{Content, ContentRef};
use rusqlite::{params, Connection, OptionalExtension, Row};

pub struct ContentDao;

fn map_content(row: &Row) -> Result<Content, rusqlite::Error> {
    Ok(Content {
        id: row.get(0)?,
        content_type: row.get(1)?,
        slug: row.get(2)?,
        title: row.get(3)?,
        body: row.get(4)?,
        public: row.get::<_, i32>(5)? == 1,
        created_at: row.get(6)?,
    })
}

impl ContentDao {
    /// 按 slug 查找公开内容（不区分大小写）
    pub fn find_public_by_slug(
        conn: &Connection,
        slug: &str,
    ) -> Result<Option<ContentRef>, rusqlite::Error> {
        conn.query_row(
            "SELECT id, content_type, slug, title FROM content
             WHERE public = 1 AND lower(slug) = lower(?1)
             ORDER BY id LIMIT 1",
            [slug],
            |row| {
                Ok(ContentRef {
                    id: row.get(0)?,
                    content_type: row.get(1)?,
                    slug: row.get(2)?,
                    title: row.get(3)?,
                })
            },
        )
        .optional()
    }

    /// slug 是否已被其他内容使用（包括非公开内容）
    pub fn slug_exists(
        conn: &Connection,
        slug: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, rusqlite::Error> {
        conn.query_row(
            "SELECT COUNT(*) > 0 FROM content
             WHERE lower(slug) = lower(?1) AND (?2 IS NULL OR id != ?2)",
            params![slug, exclude_id],
            |row| row.get(0),
        )
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Content>, rusqlite::Error> {
        conn.query_row(
            "SELECT id, content_type, slug, title, body, public, created_at
             FROM content WHERE id = ?1",
            [id],
            map_content,
        )
        .optional()
    }

    /// 获取指定类型的公开内容（按标题排序）
    pub fn list_by_type(
        conn: &Connection,
        content_type: &str,
    ) -> Result<Vec<Content>, rusqlite::Error> {
        let mut stmt = conn.prepare(
            "SELECT id, content_type, slug, title, body, public, created_at
             FROM content WHERE content_type = ?1 AND public = 1 ORDER BY title, id",
        )?;
        let rows = stmt.query_map([content_type], map_content)?;
        rows.collect()
    }

    /// 插入内容，返回新 id
    pub fn insert(
        conn: &Connection,
        content_type: &str,
        slug: &str,
        title: &str,
        body: &str,
        created_at: i64,
    ) -> Result<i64, rusqlite::Error> {
        conn.execute(
            "INSERT INTO content (content_type, slug, title, body, public, created_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5)",
            params![content_type, slug, title, body, created_at],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::create_tables;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn
    }

    #[test]
    fn test_insert_and_find() {
        let conn = setup();
        let id = ContentDao::insert(&conn, "page", "about", "About Us", "", 0).unwrap();

        let found = ContentDao::find_public_by_slug(&conn, "About").unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.content_type, "page");

        let content = ContentDao::get_by_id(&conn, id).unwrap().unwrap();
        assert_eq!(content.title, "About Us");
        assert!(content.public);
    }

    #[test]
    fn test_slug_exists_excludes_self() {
        let conn = setup();
        let id = ContentDao::insert(&conn, "post", "offer-1", "Offer", "", 0).unwrap();

        assert!(ContentDao::slug_exists(&conn, "offer-1", None).unwrap());
        assert!(!ContentDao::slug_exists(&conn, "offer-1", Some(id)).unwrap());
        assert!(ContentDao::slug_exists(&conn, "offer-1", Some(id + 1)).unwrap());
        assert!(!ContentDao::slug_exists(&conn, "offer-2", None).unwrap());
    }

    #[test]
    fn test_private_content_not_found_by_slug() {
        let conn = setup();
        conn.execute(
            "INSERT INTO content (content_type, slug, title, public, created_at)
             VALUES ('page', 'draft', 'Draft', 0, 0)",
            [],
        )
        .unwrap();

        assert!(ContentDao::find_public_by_slug(&conn, "draft").unwrap().is_none());
        assert!(ContentDao::slug_exists(&conn, "draft", None).unwrap());
    }

    #[test]
    fn test_list_pages() {
        let conn = setup();
        ContentDao::insert(&conn, "page", "b", "Beta", "", 0).unwrap();
        ContentDao::insert(&conn, "page", "a", "Alpha", "", 0).unwrap();
        ContentDao::insert(&conn, "post", "c", "Post", "", 0).unwrap();

        let pages = ContentDao::list_by_type(&conn, "page").unwrap();
        let titles: Vec<_> = pages.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Beta"]);
    }
}
