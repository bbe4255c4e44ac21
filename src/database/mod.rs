pub mod dao;
pub mod migration;
pub mod schema;

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{RedirectError, Result};

pub type DbConnection = Arc<Mutex<Connection>>;

/// 获取默认数据库文件路径 (~/.device-redirect/redirects.db)
pub fn get_db_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| RedirectError::Config("无法获取主目录".to_string()))?;
    let db_dir = home.join(".device-redirect");
    std::fs::create_dir_all(&db_dir)
        .map_err(|e| RedirectError::Config(format!("无法创建数据库目录 {:?}: {}", db_dir, e)))?;
    Ok(db_dir.join("redirects.db"))
}

/// 初始化数据库连接
///
/// `path` 为空时使用默认路径。
pub fn init_database(path: Option<&Path>) -> Result<DbConnection> {
    let db_path = match path {
        Some(p) => {
            if let Some(parent) = p.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    RedirectError::Config(format!("无法创建数据库目录 {:?}: {}", parent, e))
                })?;
            }
            p.to_path_buf()
        }
        None => get_db_path()?,
    };
    let conn = Connection::open(&db_path)?;
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
    schema::create_tables(&conn)?;

    tracing::info!("[DB] 数据库已打开: {:?}", db_path);
    Ok(Arc::new(Mutex::new(conn)))
}

/// 打开内存数据库（测试和临时运行）
pub fn open_in_memory() -> Result<DbConnection> {
    let conn = Connection::open_in_memory()?;
    schema::create_tables(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// 获取连接锁
pub fn lock(db: &DbConnection) -> Result<MutexGuard<'_, Connection>> {
    db.lock()
        .map_err(|e| RedirectError::Store(format!("数据库锁异常: {}", e)))
}
