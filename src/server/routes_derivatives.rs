//! Cached derivative routes (`/__thumbs__/...`, `/__preview__/...`).

use axum::{
    extract::State,
    http::{header, HeaderMap, Uri},
    response::Response,
    routing::get,
    Router,
};

use super::error::AppError;
use super::guard::PathGuard;
use super::AppContext;
use crate::error::Error;
use crate::streaming::serve_file;

pub const THUMBS_PREFIX: &str = "/__thumbs__";
pub const PREVIEW_PREFIX: &str = "/__preview__";

pub fn derivative_routes() -> Router<AppContext> {
    Router::new()
        .route("/__thumbs__/*rel", get(serve_thumbnail))
        .route("/__preview__/*rel", get(serve_preview))
}

async fn serve_thumbnail(
    State(ctx): State<AppContext>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    serve_derivative(&ctx.thumb_guard, "thumbnail", THUMBS_PREFIX, &uri, &headers).await
}

async fn serve_preview(
    State(ctx): State<AppContext>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    serve_derivative(&ctx.preview_guard, "preview", PREVIEW_PREFIX, &uri, &headers).await
}

/// Resolve the raw path after `prefix` under `guard`. An escape falls back
/// to the root directory, which is never a servable file.
async fn serve_derivative(
    guard: &PathGuard,
    entity: &str,
    prefix: &str,
    uri: &Uri,
    headers: &HeaderMap,
) -> Result<Response, AppError> {
    let raw = uri.path().strip_prefix(prefix).unwrap_or_default();
    let target = guard.resolve(raw);
    if target.is_root() {
        return Err(Error::not_found(entity, raw).into());
    }

    let range = headers.get(header::RANGE).and_then(|v| v.to_str().ok());
    match serve_file(&target.absolute, range).await {
        Err(e) if e.http_status() == 404 => Err(Error::not_found(entity, &target.relative).into()),
        other => Ok(other?),
    }
}
