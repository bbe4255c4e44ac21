//! 日志管理模块
//!
//! - 控制台输出 + 可选的文件日志
//! - 文件按大小轮转，超过 7 天的轮转文件压缩为 .gz，超过保留期的删除
//! - 写入文件前对敏感信息脱敏
use chrono::{Duration, Local, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// 日志文件名
pub const LOG_FILE_NAME: &str = "device-redirect.log";

/// 轮转文件压缩前保留的天数
const ARCHIVE_AFTER_DAYS: i64 = 7;

/// 默认日志目录: ~/.device-redirect/logs
pub fn default_log_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".device-redirect")
        .join("logs")
}

/// 按大小轮转的日志文件
pub struct RotatingLogFile {
    path: PathBuf,
    file: File,
    max_file_size: u64,
    retention_days: u32,
}

impl RotatingLogFile {
    pub fn open(dir: &Path, max_file_size: u64, retention_days: u32) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(LOG_FILE_NAME);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file,
            max_file_size,
            retention_days,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn rotate_if_needed(&mut self) -> io::Result<()> {
        let size = self.file.metadata()?.len();
        if size <= self.max_file_size {
            return Ok(());
        }

        let suffix = Local::now().format("%Y%m%d-%H%M%S%.3f");
        let rotated = self.path.with_file_name(format!("{}.{}", LOG_FILE_NAME, suffix));
        fs::rename(&self.path, &rotated)?;
        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        self.prune_old_logs();
        Ok(())
    }

    /// 压缩较旧的轮转文件，删除超过保留期的文件
    fn prune_old_logs(&self) {
        let Some(dir) = self.path.parent() else {
            return;
        };
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        let archive_cutoff = Utc::now() - Duration::days(ARCHIVE_AFTER_DAYS);
        let delete_cutoff = Utc::now() - Duration::days(self.retention_days as i64);
        let prefix = format!("{}.", LOG_FILE_NAME);

        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            if !file_name.starts_with(&prefix) {
                continue;
            }
            let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
                continue;
            };
            let modified = chrono::DateTime::<Utc>::from(modified);
            let path = entry.path();

            if modified < delete_cutoff {
                let _ = fs::remove_file(&path);
                continue;
            }
            if file_name.ends_with(".gz") || modified >= archive_cutoff {
                continue;
            }
            let _ = archive_file(&path);
        }
    }
}

fn archive_file(path: &Path) -> io::Result<()> {
    let mut input = Vec::new();
    File::open(path)?.read_to_end(&mut input)?;

    let gz_path = PathBuf::from(format!("{}.gz", path.display()));
    let mut encoder = GzEncoder::new(File::create(&gz_path)?, Compression::default());
    encoder.write_all(&input)?;
    encoder.finish()?;
    fs::remove_file(path)
}

impl Write for RotatingLogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.rotate_if_needed()?;
        let text = String::from_utf8_lossy(buf);
        self.file.write_all(sanitize_log_message(&text).as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// 初始化全局日志
///
/// `RUST_LOG` 优先于配置中的级别；`verbose` 强制 debug。
pub fn init(config: &LoggingConfig, verbose: bool) -> io::Result<Option<PathBuf>> {
    let level = if verbose { "debug" } else { config.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file = if config.file_enabled {
        let dir = config.dir.clone().unwrap_or_else(default_log_dir);
        Some(RotatingLogFile::open(
            &dir,
            config.max_file_size,
            config.retention_days,
        )?)
    } else {
        None
    };
    let file_path = file.as_ref().map(|f| f.path().to_path_buf());

    let file_layer = file.map(|file| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(Mutex::new(file))
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(file_layer)
        .try_init();

    Ok(file_path)
}

static SENSITIVE_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        // Bearer token
        (r"Bearer\s+[A-Za-z0-9._~+/=-]+", "Bearer ***"),
        // 管理密钥请求头
        (r"(?i)x-admin-key[\x22']?\s*[:=]\s*[\x22']?[A-Za-z0-9._-]+", "x-admin-key: ***"),
        // API key 各种格式
        (
            r#"(?i)api[_-]?key["']?\s*[:=]\s*["']?[A-Za-z0-9._-]+"#,
            "api_key: ***",
        ),
        // 通用 token
        (r#"token["']?\s*[:=]\s*["']?[A-Za-z0-9._-]+"#, "token: ***"),
        (r#"password["']?\s*[:=]\s*["']?[^\s"',}]+"#, "password: ***"),
        (
            r#"secret["']?\s*[:=]\s*["']?[A-Za-z0-9._-]+"#,
            "secret: ***",
        ),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| Regex::new(pattern).ok().map(|re| (re, replacement)))
    .collect()
});

/// 日志脱敏
pub fn sanitize_log_message(message: &str) -> String {
    let mut sanitized = message.to_string();
    for (re, replacement) in SENSITIVE_PATTERNS.iter() {
        sanitized = re.replace_all(&sanitized, *replacement).to_string();
    }
    sanitized
}
