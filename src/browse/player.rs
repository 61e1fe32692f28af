//! Single-file player model.

use std::collections::HashMap;
use std::path::Path;

use super::listing::{DirEntry, LinkState};
use crate::cache::DerivativeKind;
use crate::media::MediaClass;
use crate::server::urlpath::encode_path;

/// Longest display path before leading segments are elided.
pub const MAX_DISPLAY_PATH: usize = 70;

/// Previous and next image among `siblings` (already sorted), by name.
///
/// Returns `(None, None)` if `name` is not an image in the list.
pub fn image_neighbors<'a>(siblings: &'a [DirEntry], name: &str) -> (Option<&'a str>, Option<&'a str>) {
    let images: Vec<&str> = siblings
        .iter()
        .filter(|e| !e.is_dir && MediaClass::of(&e.name) == MediaClass::Image)
        .map(|e| e.name.as_str())
        .collect();

    match images.iter().position(|n| *n == name) {
        Some(idx) => {
            let prev = idx.checked_sub(1).map(|i| images[i]);
            let next = images.get(idx + 1).copied();
            (prev, next)
        }
        None => (None, None),
    }
}

/// Tag lines in display order; empty fields are left out.
///
/// Artist (or album artist) and title combine into `artist - title`;
/// then album, year (date or year), track (track or tracknumber), genre.
pub fn audio_meta_lines(tags: &HashMap<String, String>) -> Vec<String> {
    let get = |keys: &[&str]| {
        keys.iter()
            .filter_map(|k| tags.get(*k))
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
    };

    let mut lines = Vec::new();
    match (get(&["artist", "album_artist"]), get(&["title"])) {
        (Some(artist), Some(title)) => lines.push(format!("{artist} - {title}")),
        (None, Some(title)) => lines.push(title.to_string()),
        (Some(artist), None) => lines.push(artist.to_string()),
        (None, None) => {}
    }
    if let Some(album) = get(&["album"]) {
        lines.push(format!("Album: {album}"));
    }
    if let Some(year) = get(&["date", "year"]) {
        lines.push(format!("Year: {year}"));
    }
    if let Some(track) = get(&["track", "tracknumber"]) {
        lines.push(format!("Track: {track}"));
    }
    if let Some(genre) = get(&["genre"]) {
        lines.push(format!("Genre: {genre}"));
    }
    lines
}

/// Shorten a `/`-separated path by dropping leading segments behind `...`.
pub fn shorten_path_display(path: &str, max_len: usize) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    let normalized = path.replace('\\', "/");
    if normalized.chars().count() <= max_len {
        return normalized;
    }

    let mut parts: Vec<&str> = normalized.split('/').collect();
    let joined = |parts: &[&str]| format!(".../{}", parts.join("/"));
    while parts.len() > 1 && joined(&parts).chars().count() > max_len {
        parts.remove(0);
    }
    joined(&parts)
}

/// URL of the cover preview for a `/`-separated audio file path.
pub fn preview_url(rel: &str) -> String {
    let name = DerivativeKind::CoverPreview.relative_name(Path::new(rel));
    format!("/__preview__{}", encode_path(&name.to_string_lossy()))
}

/// Class-specific player content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerKind {
    Image {
        prev: Option<String>,
        next: Option<String>,
    },
    Video,
    Audio {
        cover: Option<String>,
        meta: Vec<String>,
    },
}

/// Everything a player page displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerPage {
    /// File stem, shown as the heading.
    pub title: String,
    pub file_name: String,
    pub display_path: String,
    /// Raw streaming URL for the media element.
    pub media_url: String,
    pub back_href: String,
    pub kind: PlayerKind,
}

impl PlayerPage {
    /// Build the player for `rel` (`/`-separated file path).
    ///
    /// `siblings` are the sorted entries of the containing directory.
    /// `cover` is the preview URL when one exists; `tags` are only shown
    /// for audio.
    pub fn build(
        rel: &str,
        class: MediaClass,
        siblings: &[DirEntry],
        link: LinkState,
        cover: Option<String>,
        tags: &HashMap<String, String>,
    ) -> Self {
        let (dir, name) = match rel.rsplit_once('/') {
            Some((d, n)) => (d, n),
            None => ("", rel),
        };
        let title = Path::new(name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());

        let view_link = |file: &str| {
            let target = if dir.is_empty() {
                file.to_string()
            } else {
                format!("{dir}/{file}")
            };
            format!("{}?view=1&{}", encode_path(&target), link.query())
        };

        let kind = match class {
            MediaClass::Audio => PlayerKind::Audio {
                cover,
                meta: audio_meta_lines(tags),
            },
            MediaClass::Video => PlayerKind::Video,
            _ => {
                let (prev, next) = image_neighbors(siblings, name);
                PlayerKind::Image {
                    prev: prev.map(&view_link),
                    next: next.map(&view_link),
                }
            }
        };

        Self {
            title,
            file_name: name.to_string(),
            display_path: shorten_path_display(rel, MAX_DISPLAY_PATH),
            media_url: encode_path(rel),
            back_href: format!("{}?{}", encode_path(dir), link.query()),
            kind,
        }
    }
}
