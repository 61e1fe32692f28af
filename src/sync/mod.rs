//! Background ingestion.
//!
//! [`SyncOrchestrator`] runs four phases, in order, exactly once per process:
//!
//! 1. catalog the source tree (ascending by size)
//! 2. thumbnails for every image
//! 3. cover previews for every audio file (audio metadata enabled only)
//! 4. mirror every entry into the private tree (mirror mode only)
//!
//! Per-file failures are logged and counted; they never abort a phase.
//! The worker is the only writer to the derivative and mirror trees and
//! never blocks request handlers.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use sha2::{Digest, Sha256};
use tracing::{error, info, warn};

use crate::cache::{is_present, DerivativeCache, DerivativeKind};
use crate::catalog::{CatalogBuilder, CatalogEntry};
use crate::config::{LaunchMode, RunConfig};
use crate::conversion::{MediaConverter, StagedOutput};
use crate::error::{Error, Result};
use crate::media::MediaClass;

/// Ingestion phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Catalog,
    Thumbnails,
    AudioPreviews,
    Mirror,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncPhase::Catalog => write!(f, "Building catalog"),
            SyncPhase::Thumbnails => write!(f, "Generating thumbnails (smallest files first)"),
            SyncPhase::AudioPreviews => write!(f, "Extracting audio previews (smallest files first)"),
            SyncPhase::Mirror => write!(f, "Syncing into mirror tree (smallest files first)"),
        }
    }
}

/// Counts gathered over one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub catalogued: usize,
    pub thumbnails: usize,
    pub previews: usize,
    pub converted: usize,
    pub copied: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// What happened to one mirror entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MirrorOutcome {
    Converted,
    Copied,
    Skipped,
}

pub struct SyncOrchestrator {
    source_root: PathBuf,
    mode: LaunchMode,
    show_audio_meta: bool,
    cache: DerivativeCache,
    converter: Arc<dyn MediaConverter>,
    started: AtomicBool,
}

impl SyncOrchestrator {
    pub fn new(run: &RunConfig, cache: DerivativeCache, converter: Arc<dyn MediaConverter>) -> Self {
        Self {
            source_root: run.source_root.clone(),
            mode: run.mode,
            show_audio_meta: run.show_audio_meta,
            cache,
            converter,
            started: AtomicBool::new(false),
        }
    }

    /// Start the run on a dedicated, named OS thread.
    pub fn spawn(self: Arc<Self>) -> Result<JoinHandle<Result<SyncReport>>> {
        let handle = std::thread::Builder::new()
            .name("sync-worker".to_string())
            .spawn(move || self.run())?;
        Ok(handle)
    }

    /// Run all phases. A second call returns [`Error::AlreadyStarted`].
    pub fn run(&self) -> Result<SyncReport> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(Error::AlreadyStarted);
        }

        let mut report = SyncReport::default();

        info!("=== {} ===", SyncPhase::Catalog);
        let catalog = self.catalog();
        report.catalogued = catalog.len();
        info!("Found {} files", catalog.len());

        info!("=== {} ===", SyncPhase::Thumbnails);
        self.thumbnails(&catalog, &mut report);

        if self.show_audio_meta {
            info!("=== {} ===", SyncPhase::AudioPreviews);
            self.audio_previews(&catalog, &mut report);
        }

        if self.mode == LaunchMode::Mirror {
            info!("=== {} ===", SyncPhase::Mirror);
            self.mirror(&catalog, &mut report);
        }

        info!(
            "=== Sync finished: {} files, {} thumbnails, {} previews, {} converted, {} copied, {} skipped, {} failed ===",
            report.catalogued,
            report.thumbnails,
            report.previews,
            report.converted,
            report.copied,
            report.skipped,
            report.failed
        );
        Ok(report)
    }

    fn catalog(&self) -> Vec<CatalogEntry> {
        CatalogBuilder::new(&self.source_root)
            .exclude(self.cache.private_root())
            .build()
    }

    fn thumbnails(&self, catalog: &[CatalogEntry], report: &mut SyncReport) {
        let images: Vec<&CatalogEntry> = catalog
            .iter()
            .filter(|e| e.class() == MediaClass::Image)
            .collect();
        let total = images.len();

        for (i, entry) in images.into_iter().enumerate() {
            let rel = &entry.relative_path;
            let dst = self.cache.path_for(DerivativeKind::Thumbnail, rel);
            if is_present(&dst) {
                progress(i, total, "SKIP", rel);
                report.skipped += 1;
                continue;
            }

            progress(i, total, "THUMB", rel);
            match self.converter.make_thumbnail(&self.source_root.join(rel), &dst) {
                Ok(()) => report.thumbnails += 1,
                Err(e) => {
                    error!("[ERROR THUMB] {}: {}", rel.display(), e);
                    report.failed += 1;
                }
            }
        }
    }

    fn audio_previews(&self, catalog: &[CatalogEntry], report: &mut SyncReport) {
        let tracks: Vec<&CatalogEntry> = catalog
            .iter()
            .filter(|e| e.class() == MediaClass::Audio)
            .collect();
        let total = tracks.len();

        for (i, entry) in tracks.into_iter().enumerate() {
            let rel = &entry.relative_path;
            let dst = self.cache.path_for(DerivativeKind::CoverPreview, rel);
            if is_present(&dst) {
                progress(i, total, "SKIP", rel);
                report.skipped += 1;
                continue;
            }

            match self.converter.extract_audio_cover(&self.source_root.join(rel), &dst) {
                Ok(()) => {
                    progress(i, total, "PREVIEW", rel);
                    report.previews += 1;
                }
                Err(e) => {
                    progress(i, total, "NO PREVIEW", rel);
                    tracing::debug!("{}: {}", rel.display(), e);
                    report.failed += 1;
                }
            }
        }
    }

    fn mirror(&self, catalog: &[CatalogEntry], report: &mut SyncReport) {
        let total = catalog.len();
        for (i, entry) in catalog.iter().enumerate() {
            match self.mirror_entry(i, total, entry) {
                Ok(MirrorOutcome::Converted) => report.converted += 1,
                Ok(MirrorOutcome::Copied) => report.copied += 1,
                Ok(MirrorOutcome::Skipped) => report.skipped += 1,
                Err(e) => {
                    error!("[ERROR] {}: {}", entry.relative_path.display(), e);
                    report.failed += 1;
                }
            }
        }
    }

    fn mirror_entry(&self, i: usize, total: usize, entry: &CatalogEntry) -> Result<MirrorOutcome> {
        let rel = &entry.relative_path;
        let src = self.source_root.join(rel);
        let dst = self.cache.path_for(DerivativeKind::ConvertedMedia, rel);

        match entry.class() {
            class @ (MediaClass::Video | MediaClass::Image) => {
                // Existence alone counts as done; conversions are never re-checked.
                if dst.exists() {
                    progress(i, total, "SKIP", rel);
                    return Ok(MirrorOutcome::Skipped);
                }
                if class == MediaClass::Video {
                    progress(i, total, "VIDEO", rel);
                    self.converter.make_video(&src, &dst)?;
                } else {
                    progress(i, total, "IMAGE", rel);
                    self.converter.make_full_image(&src, &dst)?;
                }
                Ok(MirrorOutcome::Converted)
            }
            MediaClass::Audio | MediaClass::Other => {
                if dst.exists() && same_content(&src, &dst) {
                    progress(i, total, "SKIP", rel);
                    return Ok(MirrorOutcome::Skipped);
                }
                progress(i, total, "COPY", rel);
                if let Err(e) = copy_preserving_mtime(&src, &dst) {
                    if let Some(parent) = dst.parent() {
                        self.cache.remove_empty_dirs(parent);
                    }
                    return Err(e);
                }
                Ok(MirrorOutcome::Copied)
            }
        }
    }
}

fn progress(i: usize, total: usize, action: &str, rel: &Path) {
    info!("[{}/{}] {} {}", i + 1, total, action, rel.display());
}

/// SHA-256 of a whole file, hex encoded.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

fn same_content(a: &Path, b: &Path) -> bool {
    match (sha256_file(a), sha256_file(b)) {
        (Ok(x), Ok(y)) => x == y,
        _ => false,
    }
}

/// Staged byte copy that carries the source modification time over.
fn copy_preserving_mtime(src: &Path, dst: &Path) -> Result<()> {
    let stage = StagedOutput::new(dst)?;
    std::fs::copy(src, stage.path())?;

    if let Ok(mtime) = std::fs::metadata(src).and_then(|m| m.modified()) {
        let applied = File::options()
            .write(true)
            .open(stage.path())
            .and_then(|f| f.set_modified(mtime));
        if let Err(e) = applied {
            warn!("Could not preserve mtime for {}: {}", dst.display(), e);
        }
    }

    stage.persist()?;
    Ok(())
}
