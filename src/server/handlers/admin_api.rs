//! 管理 API 端点
//!
//! 规则列表、增删改、批量操作、slug 校验，以及页面列表和缓存统计。

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;
use crate::error::RedirectError;
use crate::models::{
    BulkAction, Content, NewContent, PageOption, RedirectRule, RuleInput, RulePage, RuleType,
    SaveOutcome,
};
use crate::server::AppState;
use crate::services::ListQuery;

/// API 错误响应
#[derive(Debug)]
pub struct ApiError(pub RedirectError);

impl From<RedirectError> for ApiError {
    fn from(err: RedirectError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!("[ADMIN] 请求失败: {}", self.0);
        }
        (status, Json(self.0.to_json())).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct EntryQuery {
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    pub reference: String,
}

#[derive(Debug, Serialize)]
pub struct EntryResponse {
    pub exists: bool,
    pub entry: Option<RedirectRule>,
}

#[derive(Debug, Deserialize)]
pub struct BulkRequest {
    pub action: BulkAction,
    #[serde(default)]
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BulkResponse {
    pub affected: usize,
}

#[derive(Debug, Deserialize)]
pub struct SlugQuery {
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Serialize)]
pub struct SlugResponse {
    pub available: bool,
    pub slug: String,
}

/// GET /api/redirects
pub async fn list_redirects(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<RulePage>> {
    Ok(Json(state.redirects.list(&query)?))
}

/// GET /api/redirects/entry
pub async fn get_entry(
    State(state): State<AppState>,
    Query(query): Query<EntryQuery>,
) -> ApiResult<Json<EntryResponse>> {
    let entry = state
        .redirects
        .get_entry(query.rule_type, &query.reference)?;
    Ok(Json(EntryResponse {
        exists: entry.is_some(),
        entry,
    }))
}

/// POST /api/redirects
pub async fn create_redirect(
    State(state): State<AppState>,
    Json(input): Json<RuleInput>,
) -> ApiResult<(StatusCode, Json<SaveOutcome>)> {
    let outcome = state.redirects.create(input)?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// PUT /api/redirects/:id
pub async fn update_redirect(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<RuleInput>,
) -> ApiResult<Json<SaveOutcome>> {
    Ok(Json(state.redirects.update(&id, input)?))
}

/// DELETE /api/redirects/:id
pub async fn delete_redirect(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    state.redirects.delete(&id)?;
    Ok(Json(serde_json::json!({ "deleted": true, "id": id })))
}

/// POST /api/redirects/bulk
pub async fn bulk_redirects(
    State(state): State<AppState>,
    Json(request): Json<BulkRequest>,
) -> ApiResult<Json<BulkResponse>> {
    let affected = state.redirects.bulk(request.action, &request.ids)?;
    Ok(Json(BulkResponse { affected }))
}

/// GET /api/validate-slug
pub async fn validate_slug(
    State(state): State<AppState>,
    Query(query): Query<SlugQuery>,
) -> ApiResult<Json<SlugResponse>> {
    let slug = state.redirects.validate_slug(&query.slug)?;
    Ok(Json(SlugResponse {
        available: true,
        slug,
    }))
}

/// GET /api/pages
pub async fn list_pages(State(state): State<AppState>) -> ApiResult<Json<Vec<PageOption>>> {
    Ok(Json(state.content.list_pages()?))
}

/// POST /api/content
pub async fn create_content(
    State(state): State<AppState>,
    Json(input): Json<NewContent>,
) -> ApiResult<(StatusCode, Json<Content>)> {
    let content = state.content.create(input)?;
    Ok((StatusCode::CREATED, Json(content)))
}

/// GET /api/cache/stats
pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.redirects.cache_stats())
}
