//! Derivative naming and placement.
//!
//! Layout under the private working directory:
//!
//! ```text
//! <data_dir>/
//!   _server/                 mirror tree (mirror mode)
//!   _images/_thumbnails/     <dir>/<stem>_thumb.jpg
//!   _images/_preview/        <dir>/<stem>_preview.jpg
//! ```
//!
//! A derivative is valid once it exists and is non-empty. Source mtimes are
//! not tracked.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::conversion::prune_empty_dirs;
use crate::error::Result;
use crate::media::MediaClass;

const MIRROR_DIR: &str = "_server";
const IMAGES_DIR: &str = "_images";
const THUMBS_DIR: &str = "_thumbnails";
const PREVIEW_DIR: &str = "_preview";

/// The kinds of artifacts derived from a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DerivativeKind {
    Thumbnail,
    CoverPreview,
    ConvertedMedia,
}

impl DerivativeKind {
    /// Mangle a source-relative path into this kind's relative name.
    ///
    /// Thumbnails and previews always end in `.jpg` whatever the source
    /// extension. Converted media becomes `.mp4` (video) or `.jpg` (image);
    /// everything else keeps its name.
    pub fn relative_name(&self, rel: &Path) -> PathBuf {
        match self {
            DerivativeKind::Thumbnail => with_suffix(rel, "_thumb.jpg"),
            DerivativeKind::CoverPreview => with_suffix(rel, "_preview.jpg"),
            DerivativeKind::ConvertedMedia => match MediaClass::of(rel) {
                MediaClass::Video => rel.with_extension("mp4"),
                MediaClass::Image => rel.with_extension("jpg"),
                MediaClass::Audio | MediaClass::Other => rel.to_path_buf(),
            },
        }
    }
}

fn with_suffix(rel: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = rel.file_stem().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    rel.with_file_name(name)
}

/// Resolved roots of the private working directory.
#[derive(Debug, Clone)]
pub struct DerivativeCache {
    private_root: PathBuf,
    mirror_root: PathBuf,
    thumb_root: PathBuf,
    preview_root: PathBuf,
}

impl DerivativeCache {
    pub fn new(private_root: impl Into<PathBuf>) -> Self {
        let private_root = private_root.into();
        let images = private_root.join(IMAGES_DIR);
        Self {
            mirror_root: private_root.join(MIRROR_DIR),
            thumb_root: images.join(THUMBS_DIR),
            preview_root: images.join(PREVIEW_DIR),
            private_root,
        }
    }

    pub fn private_root(&self) -> &Path {
        &self.private_root
    }

    pub fn mirror_root(&self) -> &Path {
        &self.mirror_root
    }

    pub fn thumb_root(&self) -> &Path {
        &self.thumb_root
    }

    pub fn preview_root(&self) -> &Path {
        &self.preview_root
    }

    /// Root directory holding derivatives of `kind`.
    pub fn root(&self, kind: DerivativeKind) -> &Path {
        match kind {
            DerivativeKind::Thumbnail => &self.thumb_root,
            DerivativeKind::CoverPreview => &self.preview_root,
            DerivativeKind::ConvertedMedia => &self.mirror_root,
        }
    }

    /// Absolute path of the derivative of `kind` for source path `rel`.
    pub fn path_for(&self, kind: DerivativeKind, rel: &Path) -> PathBuf {
        self.root(kind).join(kind.relative_name(rel))
    }

    /// Whether the derivative of `kind` for `rel` exists and is non-empty.
    pub fn has(&self, kind: DerivativeKind, rel: &Path) -> bool {
        is_present(&self.path_for(kind, rel))
    }

    /// Create the derivative roots up front so every tree can be listed
    /// before the first artifact lands in it.
    pub fn ensure_roots(&self, with_mirror: bool) -> Result<()> {
        std::fs::create_dir_all(&self.thumb_root)?;
        std::fs::create_dir_all(&self.preview_root)?;
        if with_mirror {
            std::fs::create_dir_all(&self.mirror_root)?;
        }
        Ok(())
    }

    /// Remove now-empty directories from `dir` up to the private root.
    pub fn remove_empty_dirs(&self, dir: &Path) {
        prune_empty_dirs(dir, &self.private_root);
    }
}

/// "Exists and non-empty", the sole freshness check for derivatives.
pub fn is_present(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}
