//! Server-tree routes: directory listings, player pages, raw file bytes,
//! and the static icon set.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;

use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};

use super::assets::{asset_candidates, serve_asset};
use super::error::AppError;
use super::guard::GuardedPath;
use super::urlpath::{parse_query, query_value};
use super::AppContext;
use crate::browse::{
    parse_page, preview_url, read_entries, render_listing, render_player, DirEntry, LinkState,
    Listing, PlayerPage, ViewMode,
};
use crate::cache::DerivativeKind;
use crate::media::MediaClass;
use crate::streaming::serve_file;

/// Catch-all handler for everything that is not a derivative route.
pub async fn browse(
    State(ctx): State<AppContext>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if method != Method::GET && method != Method::HEAD {
        return Ok((StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "GET, HEAD")]).into_response());
    }

    if let Some(candidates) = asset_candidates(uri.path()) {
        return serve_asset(&ctx.assets_dir, &candidates).await;
    }

    let target = ctx.server_guard.resolve(uri.path());
    let query = parse_query(uri.query().unwrap_or(""));
    let mode = ViewMode::from_query(query_value(&query, "mode"));
    let page = parse_page(query_value(&query, "page"));

    let metadata = match tokio::fs::metadata(&target.absolute).await {
        Ok(metadata) => metadata,
        // Failure cleanup may prune an empty mirror root; list it as empty.
        Err(e) if e.kind() == ErrorKind::NotFound && target.is_root() => {
            return Ok(render_entries(&ctx, &target, &[], mode, page));
        }
        Err(e) => return Err(e.into()),
    };
    if metadata.is_dir() {
        return listing(&ctx, &target, mode, page).await;
    }

    let class = MediaClass::of(&target.absolute);
    if query_value(&query, "view") == Some("1") && class.is_playable() {
        return player(&ctx, &target, class, LinkState::new(mode, page)).await;
    }

    let range = headers.get(header::RANGE).and_then(|v| v.to_str().ok());
    Ok(serve_file(&target.absolute, range).await?)
}

async fn listing(
    ctx: &AppContext,
    target: &GuardedPath,
    mode: ViewMode,
    page: usize,
) -> Result<Response, AppError> {
    let entries = read_entries(&target.absolute, ctx.cache.private_root()).await?;
    Ok(render_entries(ctx, target, &entries, mode, page))
}

fn render_entries(
    ctx: &AppContext,
    target: &GuardedPath,
    entries: &[DirEntry],
    mode: ViewMode,
    page: usize,
) -> Response {
    let listing = Listing::build(&target.relative, entries, mode, page, |file| {
        ctx.cache.has(DerivativeKind::Thumbnail, Path::new(file))
    });
    Html(render_listing(&listing).into_string()).into_response()
}

async fn player(
    ctx: &AppContext,
    target: &GuardedPath,
    class: MediaClass,
    link: LinkState,
) -> Result<Response, AppError> {
    let siblings = match target.absolute.parent() {
        Some(dir) if class == MediaClass::Image => {
            read_entries(dir, ctx.cache.private_root()).await.unwrap_or_default()
        }
        _ => Vec::new(),
    };

    let (cover, tags) = if class == MediaClass::Audio && ctx.run.show_audio_meta {
        let rel = Path::new(&target.relative);
        let cover = ctx
            .cache
            .has(DerivativeKind::CoverPreview, rel)
            .then(|| preview_url(&target.relative));
        (cover, load_tags(ctx, &target.absolute).await)
    } else {
        (None, HashMap::new())
    };

    let page = PlayerPage::build(&target.relative, class, &siblings, link, cover, &tags);
    Ok(Html(render_player(&page).into_string()).into_response())
}

async fn load_tags(ctx: &AppContext, path: &Path) -> HashMap<String, String> {
    let prober = ctx.prober.clone();
    let path = path.to_path_buf();
    match tokio::task::spawn_blocking(move || prober.audio_tags(&path)).await {
        Ok(tags) => tags,
        Err(e) => {
            tracing::warn!("Tag probe task failed: {}", e);
            HashMap::new()
        }
    }
}
