//! 前台请求处理
//!
//! 对每个页面请求执行重定向决策：中间页、服务端跳转、内容页（可能注入脚本）或 404。

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};

use crate::redirect::Decision;
use crate::server::templates;
use crate::server::AppState;

/// GET / 和 GET /*path
pub async fn handle_request(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let target = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

    let decision = match state.engine.evaluate(target, user_agent) {
        Ok(decision) => decision,
        Err(e) => {
            tracing::error!("[REDIRECT] 处理请求失败: path={}, error={}", uri.path(), e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(templates::render_not_found(&state.home_url)),
            )
                .into_response();
        }
    };

    match decision {
        Decision::Home => Html(templates::render_home(&state.home_url)).into_response(),
        Decision::Interstitial(page) => {
            Html(templates::render_interstitial(&page, &state.home_url)).into_response()
        }
        Decision::Redirect { target_url } => {
            tracing::info!("[REDIRECT] {} -> {}", uri.path(), target_url);
            (state.redirect_status, [(header::LOCATION, target_url)]).into_response()
        }
        Decision::RenderContent { content, script } => {
            Html(templates::render_content(&content, script.as_ref())).into_response()
        }
        Decision::NotFound => (
            StatusCode::NOT_FOUND,
            Html(templates::render_not_found(&state.home_url)),
        )
            .into_response(),
    }
}
