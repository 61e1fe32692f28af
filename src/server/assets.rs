//! Fixed icon assets served from the private asset directory.

use std::path::Path;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use super::error::AppError;
use crate::error::Error;
use crate::media::content_type;

/// File names to try, in order, for a request path; `None` if the path is
/// not a static asset.
pub fn asset_candidates(path: &str) -> Option<Vec<String>> {
    let candidates = match path {
        "/folder.png" | "/icon.ico" | "/favicon.ico" => vec![path[1..].to_string()],
        "/apple-touch-icon.png" | "/favicon.png" => vec![
            "apple-touch-icon.png".to_string(),
            "favicon.png".to_string(),
            "favicon.ico".to_string(),
        ],
        _ => {
            let name = path.strip_prefix('/')?;
            let stem = name.strip_prefix("thumbnail_")?.strip_suffix(".png")?;
            if stem.is_empty() || stem.contains(['/', '\\']) || stem.contains("..") {
                return None;
            }
            vec![name.to_string()]
        }
    };
    Some(candidates)
}

/// Serve the first existing candidate from `assets_dir`.
pub async fn serve_asset(assets_dir: &Path, candidates: &[String]) -> Result<Response, AppError> {
    for name in candidates {
        let path = assets_dir.join(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                return Ok((
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, content_type(&path))],
                    bytes,
                )
                    .into_response());
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(Error::not_found("icon", candidates.join(", ")).into())
}
