//! Directory listing model.
//!
//! Builds everything a listing page shows (rows, links, placeholders, pager)
//! from a plain list of entries, so the navigation rules can be tested
//! without touching the filesystem or rendering markup.

use std::path::Path;

use crate::cache::DerivativeKind;
use crate::conversion::STAGING_PREFIX;
use crate::error::Result;
use crate::media::MediaClass;
use crate::server::urlpath::encode_path;

/// Fixed number of rows on a page in paged mode.
pub const PAGE_SIZE: usize = 10;

/// Listing display mode, carried in the `mode` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Ten rows per page, image thumbnails, placeholder padding.
    #[default]
    Paged,
    /// Every entry at once, icons only.
    List,
}

impl ViewMode {
    /// `listmode` selects the flat list; anything else is paged.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("listmode") => ViewMode::List,
            _ => ViewMode::Paged,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Paged => "paged",
            ViewMode::List => "listmode",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            ViewMode::Paged => ViewMode::List,
            ViewMode::List => ViewMode::Paged,
        }
    }

    fn toggle_label(&self) -> &'static str {
        match self {
            ViewMode::Paged => "List",
            ViewMode::List => "Paged",
        }
    }
}

/// Parse a `page` query value: non-numeric or below 1 means page 1.
pub fn parse_page(value: Option<&str>) -> usize {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .map(|p| p.max(1) as usize)
        .unwrap_or(1)
}

/// Navigation state that every generated link carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkState {
    pub mode: ViewMode,
    /// Present in paged mode only.
    pub page: Option<usize>,
}

impl LinkState {
    pub fn new(mode: ViewMode, page: usize) -> Self {
        Self {
            mode,
            page: (mode == ViewMode::Paged).then_some(page),
        }
    }

    /// `mode=...` plus `&page=N` when paged.
    pub fn query(&self) -> String {
        match self.page {
            Some(page) => format!("mode={}&page={}", self.mode.as_str(), page),
            None => format!("mode={}", self.mode.as_str()),
        }
    }
}

/// One immediate child of a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Read a directory's immediate entries, sorted by name.
///
/// Staging files of in-progress writes are hidden, and so is `private_root`
/// when the data dir lives inside the browsed tree.
pub async fn read_entries(dir: &Path, private_root: &Path) -> Result<Vec<DirEntry>> {
    let mut reader = tokio::fs::read_dir(dir).await?;
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(STAGING_PREFIX) || entry.path() == private_root {
            continue;
        }
        let is_dir = tokio::fs::metadata(entry.path())
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        entries.push(DirEntry { name, is_dir });
    }
    sort_entries(&mut entries);
    Ok(entries)
}

/// Lexicographic (byte-wise) name order shared by listing and player.
pub fn sort_entries(entries: &mut [DirEntry]) {
    entries.sort_by(|a, b| a.name.cmp(&b.name));
}

/// Icon shown in front of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Folder,
    Image,
    Video,
    Audio,
    File,
}

impl Icon {
    pub fn css_class(&self) -> &'static str {
        match self {
            Icon::Folder => "icon-folder",
            Icon::Image => "icon-image",
            Icon::Video => "icon-video",
            Icon::Audio => "icon-audio",
            Icon::File => "icon-file",
        }
    }

    fn for_class(class: MediaClass) -> Self {
        match class {
            MediaClass::Image => Icon::Image,
            MediaClass::Video => Icon::Video,
            MediaClass::Audio => Icon::Audio,
            MediaClass::Other => Icon::File,
        }
    }
}

/// A rendered row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub name: String,
    pub href: String,
    pub icon: Icon,
    /// Thumbnail URL, set only in paged mode when the thumbnail exists.
    pub thumbnail: Option<String>,
}

/// Page navigation shown below a paged listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    pub page: usize,
    pub total_pages: usize,
    pub prev: Option<String>,
    pub next: Option<String>,
    /// Real rows on this page.
    pub shown: usize,
}

/// Everything a directory listing page displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub title: String,
    pub mode: ViewMode,
    pub page: usize,
    pub toggle_href: String,
    pub toggle_label: &'static str,
    pub parent_href: Option<String>,
    pub rows: Vec<Row>,
    /// Empty rows appended so a short page keeps its height.
    pub placeholders: usize,
    pub pager: Option<Pager>,
}

impl Listing {
    /// Build the listing for directory `rel` (`/`-separated, empty for root).
    ///
    /// `entries` must already be sorted. `has_thumbnail` reports whether the
    /// thumbnail for a `/`-separated file path exists.
    pub fn build<F>(
        rel: &str,
        entries: &[DirEntry],
        mode: ViewMode,
        requested_page: usize,
        has_thumbnail: F,
    ) -> Self
    where
        F: Fn(&str) -> bool,
    {
        let dir_url = encode_path(rel);
        let total_pages = entries.len().div_ceil(PAGE_SIZE).max(1);

        let (page, visible) = match mode {
            ViewMode::Paged => {
                let page = requested_page.clamp(1, total_pages);
                let start = (page - 1) * PAGE_SIZE;
                let end = (start + PAGE_SIZE).min(entries.len());
                (page, &entries[start.min(end)..end])
            }
            ViewMode::List => (1, entries),
        };
        let link = LinkState::new(mode, page);

        let rows: Vec<Row> = visible
            .iter()
            .map(|entry| build_row(rel, entry, link, &has_thumbnail))
            .collect();

        let (placeholders, pager) = match mode {
            ViewMode::Paged => {
                let pager = (total_pages > 1).then(|| Pager {
                    page,
                    total_pages,
                    prev: (page > 1).then(|| format!("{dir_url}?mode=paged&page={}", page - 1)),
                    next: (page < total_pages)
                        .then(|| format!("{dir_url}?mode=paged&page={}", page + 1)),
                    shown: rows.len(),
                });
                (PAGE_SIZE - rows.len(), pager)
            }
            ViewMode::List => (0, None),
        };

        let parent_href = (!rel.is_empty()).then(|| {
            let parent = rel.rsplit_once('/').map(|(p, _)| p).unwrap_or("");
            format!("{}?mode={}", encode_path(parent), mode.as_str())
        });

        Self {
            title: if rel.is_empty() { "/".to_string() } else { rel.to_string() },
            mode,
            page,
            toggle_href: format!("{dir_url}?mode={}", mode.toggled().as_str()),
            toggle_label: mode.toggle_label(),
            parent_href,
            rows,
            placeholders,
            pager,
        }
    }
}

fn build_row<F>(dir: &str, entry: &DirEntry, link: LinkState, has_thumbnail: &F) -> Row
where
    F: Fn(&str) -> bool,
{
    let rel = if dir.is_empty() {
        entry.name.clone()
    } else {
        format!("{dir}/{}", entry.name)
    };
    let url = encode_path(&rel);

    if entry.is_dir {
        return Row {
            name: entry.name.clone(),
            href: format!("{url}?mode={}", link.mode.as_str()),
            icon: Icon::Folder,
            thumbnail: None,
        };
    }

    let class = MediaClass::of(&entry.name);
    let href = if class.is_playable() {
        format!("{url}?view=1&{}", link.query())
    } else {
        format!("{url}?{}", link.query())
    };

    let thumbnail = (class == MediaClass::Image && link.mode == ViewMode::Paged && has_thumbnail(&rel))
        .then(|| thumbnail_url(&rel));

    Row {
        name: entry.name.clone(),
        href,
        icon: Icon::for_class(class),
        thumbnail,
    }
}

/// URL of the thumbnail for a `/`-separated file path.
pub fn thumbnail_url(rel: &str) -> String {
    let name = DerivativeKind::Thumbnail.relative_name(Path::new(rel));
    format!("/__thumbs__{}", encode_path(&name.to_string_lossy()))
}
