//! 管理接口鉴权
//!
//! 配置了管理密钥时，请求需携带 `Authorization: Bearer <key>` 或 `X-Admin-Key: <key>`，
//! 密钥使用常量时间比较。未配置密钥时直接放行。

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use subtle::ConstantTimeEq;
use tower::{Layer, Service};

pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// 从请求头中取出管理密钥
pub fn extract_admin_key(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Some(token.trim());
        }
    }
    headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
}

/// 校验管理密钥
pub fn verify_admin_key(expected: &str, provided: Option<&str>) -> bool {
    match provided {
        Some(key) => key.as_bytes().ct_eq(expected.as_bytes()).into(),
        None => false,
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": {
                "message": "Unauthorized",
                "type": "unauthorized",
                "code": 401
            }
        })),
    )
        .into_response()
}

#[derive(Clone)]
pub struct AdminAuthLayer {
    api_key: Option<Arc<str>>,
}

impl AdminAuthLayer {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.is_empty()).map(Arc::from),
        }
    }
}

impl<S> Layer<S> for AdminAuthLayer {
    type Service = AdminAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AdminAuthService {
            inner,
            api_key: self.api_key.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AdminAuthService<S> {
    inner: S,
    api_key: Option<Arc<str>>,
}

impl<S> Service<Request<Body>> for AdminAuthService<S>
where
    S: Service<Request<Body>, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        if let Some(expected) = &self.api_key {
            if !verify_admin_key(expected, extract_admin_key(req.headers())) {
                tracing::warn!(
                    "[AUTH] 管理接口鉴权失败: {} {}",
                    req.method(),
                    req.uri().path()
                );
                return Box::pin(async { Ok(unauthorized()) });
            }
        }
        Box::pin(self.inner.call(req))
    }
}
