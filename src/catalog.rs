//! Source tree snapshot.
//!
//! The catalog is rebuilt on every run and never persisted. Entries are
//! sorted ascending by size so the cheapest media is processed (and becomes
//! browsable) first.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::media::MediaClass;

/// One file discovered under the source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Path relative to the source root; unique within a run.
    pub relative_path: PathBuf,
    pub size_bytes: u64,
}

impl CatalogEntry {
    pub fn class(&self) -> MediaClass {
        MediaClass::of(&self.relative_path)
    }
}

/// Builds the ordered catalog for a source root.
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    root: PathBuf,
    excluded: Vec<PathBuf>,
}

impl CatalogBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            excluded: Vec::new(),
        }
    }

    /// Skip everything under `dir` (used for a data dir nested in the source).
    pub fn exclude(mut self, dir: impl Into<PathBuf>) -> Self {
        self.excluded.push(dir.into());
        self
    }

    /// Walk the tree and return entries sorted ascending by size.
    ///
    /// Directory entries are visited in file-name order, and the sort is
    /// stable, so equal sizes keep that discovery order. Files whose size
    /// cannot be read are recorded with size 0.
    pub fn build(&self) -> Vec<CatalogEntry> {
        let root = canonical(&self.root);
        let excluded: Vec<PathBuf> = self.excluded.iter().map(|p| canonical(p)).collect();

        let mut entries = Vec::new();
        let walker = WalkDir::new(&root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !excluded.iter().any(|x| e.path().starts_with(x)));

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&root) else {
                continue;
            };
            let size_bytes = entry.metadata().map(|m| m.len()).unwrap_or(0);

            entries.push(CatalogEntry {
                relative_path: relative.to_path_buf(),
                size_bytes,
            });
        }

        entries.sort_by_key(|e| e.size_bytes);
        debug!("Catalog of {} built with {} entries", root.display(), entries.len());
        entries
    }
}

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
