//! Media classification by file extension.

use std::path::Path;

const IMAGE_EXT: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "tif", "tiff"];
const VIDEO_EXT: &[&str] = &["mp4", "mov", "m4v", "avi", "mkv", "wmv", "flv"];
const AUDIO_EXT: &[&str] = &["mp3", "wav", "flac", "ogg", "aac", "m4a", "wma"];

/// Broad media class, derived purely from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaClass {
    Image,
    Video,
    Audio,
    Other,
}

impl MediaClass {
    /// Classify a path by its (case-insensitive) extension.
    pub fn of(path: impl AsRef<Path>) -> Self {
        let ext = match extension(path.as_ref()) {
            Some(ext) => ext,
            None => return MediaClass::Other,
        };
        if IMAGE_EXT.contains(&ext.as_str()) {
            MediaClass::Image
        } else if VIDEO_EXT.contains(&ext.as_str()) {
            MediaClass::Video
        } else if AUDIO_EXT.contains(&ext.as_str()) {
            MediaClass::Audio
        } else {
            MediaClass::Other
        }
    }

    /// Whether the class gets an in-browser player page.
    pub fn is_playable(&self) -> bool {
        !matches!(self, MediaClass::Other)
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Determine the HTTP content type from a file extension.
pub fn content_type(path: impl AsRef<Path>) -> &'static str {
    match extension(path.as_ref()).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("tif") | Some("tiff") => "image/tiff",
        Some("ico") => "image/x-icon",
        Some("mp4") => "video/mp4",
        Some("mov") | Some("m4v") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        Some("wmv") => "video/x-ms-wmv",
        Some("flv") => "video/x-flv",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("flac") => "audio/flac",
        Some("ogg") => "audio/ogg",
        Some("aac") | Some("m4a") => "audio/mp4",
        Some("wma") => "audio/x-ms-wma",
        _ => "application/octet-stream",
    }
}
