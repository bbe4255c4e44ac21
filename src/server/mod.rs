//! HTTP 服务器模块
//!
//! 前台路由执行重定向决策，`/api` 下为管理接口（受管理密钥保护）。

pub mod handlers;
pub mod templates;


use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

use crate::cache::RuleCache;
use crate::config::Config;
use crate::database::DbConnection;
use crate::error::{RedirectError, Result};
use crate::middleware::AdminAuthLayer;
use crate::redirect::{EngineOptions, RedirectEngine, RuleMatcher};
use crate::server_utils;
use crate::services::{ContentService, RedirectService};
use crate::store::{CachedRuleStore, ContentLookup, RuleStore, SqliteContentStore, SqliteRuleStore};

use handlers::{admin_api, frontend};

/// 服务器共享状态
#[derive(Clone)]
pub struct AppState {
    pub engine: RedirectEngine,
    pub redirects: RedirectService,
    pub content: ContentService,
    pub redirect_status: StatusCode,
    pub home_url: String,
}

impl AppState {
    /// 根据配置组装存储、缓存和服务
    pub fn new(config: &Config, db: DbConnection) -> Result<Self> {
        let cache = Arc::new(if config.cache.enabled {
            RuleCache::new(Duration::from_secs(config.cache.ttl_secs))
        } else {
            RuleCache::disabled()
        });

        let rules: Arc<dyn RuleStore> = Arc::new(CachedRuleStore::new(
            SqliteRuleStore::new(db.clone()),
            cache.clone(),
        ));
        let content: Arc<dyn ContentLookup> = Arc::new(SqliteContentStore::new(db.clone()));

        let home_url = config.site.home_url.clone();
        let engine = RedirectEngine::new(
            RuleMatcher::new(rules.clone()),
            content.clone(),
            EngineOptions {
                home_url: home_url.clone(),
                base_path: config.site.base_path.clone(),
                home_fallback: config.redirect.home_fallback,
            },
        );
        let redirects = RedirectService::new(rules, content, cache, home_url.clone());
        let content = ContentService::new(db, redirects.guard().clone());

        let redirect_status = StatusCode::from_u16(config.redirect.status_code)
            .ok()
            .filter(StatusCode::is_redirection)
            .ok_or_else(|| {
                RedirectError::Config(format!(
                    "无效的跳转状态码: {}",
                    config.redirect.status_code
                ))
            })?;

        Ok(Self {
            engine,
            redirects,
            content,
            redirect_status,
            home_url,
        })
    }
}

/// 构建路由
pub fn build_router(state: AppState, config: &Config) -> Router {
    let admin = Router::new()
        .route(
            "/redirects",
            get(admin_api::list_redirects).post(admin_api::create_redirect),
        )
        .route("/redirects/entry", get(admin_api::get_entry))
        .route("/redirects/bulk", post(admin_api::bulk_redirects))
        .route(
            "/redirects/:id",
            put(admin_api::update_redirect).delete(admin_api::delete_redirect),
        )
        .route("/validate-slug", get(admin_api::validate_slug))
        .route("/pages", get(admin_api::list_pages))
        .route("/content", post(admin_api::create_content))
        .route("/cache/stats", get(admin_api::cache_stats))
        .layer(AdminAuthLayer::new(config.admin.api_key.clone()));

    Router::new()
        .route("/health", get(server_utils::health))
        .nest("/api", admin)
        .route("/", get(frontend::handle_request))
        .route("/*path", get(frontend::handle_request))
        .layer(RequestBodyLimitLayer::new(config.server.max_body_bytes))
        .with_state(state)
}

/// 启动 HTTP 服务器，直到收到 Ctrl+C
pub async fn serve(config: &Config, state: AppState) -> std::io::Result<()> {
    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("[SERVER] 服务已启动: http://{}", addr);

    axum::serve(listener, build_router(state, config))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("[SERVER] 收到退出信号，正在停止");
        })
        .await
}
