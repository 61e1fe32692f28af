//! Raw file streaming with HTTP range requests.

use std::io::SeekFrom;
use std::path::Path;

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::error::{Error, Result};
use crate::media::content_type;

/// Parse a `Range` header into an inclusive byte window.
///
/// Only `bytes=start-end` is understood, and only the first segment of a
/// multi-range header is honored. A missing start means 0 and a missing end
/// means the last byte; an end past the file is clamped. Anything
/// unparseable, inverted, or starting past the end yields `None`, which
/// callers treat as "no range requested".
pub fn parse_range_header(header: &str, file_size: u64) -> Option<(u64, u64)> {
    if file_size == 0 {
        return None;
    }
    let ranges = header.trim().strip_prefix("bytes=")?;
    let first = ranges.split(',').next()?.trim();
    let (start, end) = first.split_once('-')?;
    let (start, end) = (start.trim(), end.trim());

    let last = file_size - 1;
    let start: u64 = if start.is_empty() { 0 } else { start.parse().ok()? };
    let end: u64 = if end.is_empty() { last } else { end.parse().ok()? };
    let end = end.min(last);

    if start > end {
        return None;
    }
    Some((start, end))
}

/// Stream `path`, honoring an optional `Range` header value.
///
/// Returns 206 with `Content-Range` for a valid range, otherwise 200 with
/// the whole file. Both advertise `Accept-Ranges: bytes`.
pub async fn serve_file(path: &Path, range: Option<&str>) -> Result<Response> {
    let metadata = tokio::fs::metadata(path).await?;
    if !metadata.is_file() {
        return Err(Error::not_found("file", path.display()));
    }
    let file_size = metadata.len();
    let mime = content_type(path);

    let range = range.and_then(|r| parse_range_header(r, file_size));

    let response = match range {
        Some((start, end)) => {
            let length = end - start + 1;

            let mut file = File::open(path).await?;
            file.seek(SeekFrom::Start(start)).await?;

            let stream = ReaderStream::new(file.take(length));

            Response::builder()
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_TYPE, mime)
                .header(header::CONTENT_LENGTH, length.to_string())
                .header(
                    header::CONTENT_RANGE,
                    format!("bytes {}-{}/{}", start, end, file_size),
                )
                .header(header::ACCEPT_RANGES, "bytes")
                .body(Body::from_stream(stream))
        }
        None => {
            let file = File::open(path).await?;
            let stream = ReaderStream::new(file);

            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, mime)
                .header(header::CONTENT_LENGTH, file_size.to_string())
                .header(header::ACCEPT_RANGES, "bytes")
                .body(Body::from_stream(stream))
        }
    };

    response.map_err(|e| Error::from(std::io::Error::other(e)))
}
