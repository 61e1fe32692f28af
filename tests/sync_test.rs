//! Integration tests for the background sync worker against real temp trees.

mod common;

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use axum::http::StatusCode;
use common::{write_under, RecordingConverter, TestHarness};
use mediashelf::cache::{DerivativeCache, DerivativeKind};
use mediashelf::config::{LaunchMode, RunConfig};
use mediashelf::sync::{SyncOrchestrator, SyncReport};

fn mirror_run(source: &Path) -> RunConfig {
    RunConfig {
        mode: LaunchMode::Mirror,
        verbose_transcoder_log: false,
        show_audio_meta: false,
        port: 8000,
        source_root: source.to_path_buf(),
    }
}

fn run_once(run: &RunConfig, data: &Path, conv: Arc<RecordingConverter>) -> SyncReport {
    SyncOrchestrator::new(run, DerivativeCache::new(data), conv)
        .run()
        .unwrap()
}

fn set_mtime(path: &Path, time: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

#[test]
fn unchanged_copy_is_not_rewritten() {
    let source = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_under(source.path(), "docs/notes.txt", b"same bytes");
    let run = mirror_run(source.path());

    let report = run_once(&run, data.path(), Arc::new(RecordingConverter::default()));
    assert_eq!(report.copied, 1);

    let dst = data.path().join("_server/docs/notes.txt");
    let marker = SystemTime::UNIX_EPOCH + Duration::from_secs(42);
    set_mtime(&dst, marker);

    let report = run_once(&run, data.path(), Arc::new(RecordingConverter::default()));
    assert_eq!(report.copied, 0);
    assert_eq!(report.skipped, 1);
    assert_eq!(std::fs::metadata(&dst).unwrap().modified().unwrap(), marker);
}

#[test]
fn changed_source_is_recopied() {
    let source = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    let src = write_under(source.path(), "song.mp3", b"version one");
    let run = mirror_run(source.path());

    run_once(&run, data.path(), Arc::new(RecordingConverter::default()));
    std::fs::write(&src, b"version two!").unwrap();

    let report = run_once(&run, data.path(), Arc::new(RecordingConverter::default()));
    assert_eq!(report.copied, 1);
    assert_eq!(
        std::fs::read(data.path().join("_server/song.mp3")).unwrap(),
        b"version two!"
    );
}

#[test]
fn copy_carries_source_mtime() {
    let source = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    let src = write_under(source.path(), "a.txt", b"x");
    let when = SystemTime::UNIX_EPOCH + Duration::from_secs(1_500_000_000);
    set_mtime(&src, when);

    run_once(&mirror_run(source.path()), data.path(), Arc::new(RecordingConverter::default()));
    let copied = std::fs::metadata(data.path().join("_server/a.txt")).unwrap();
    assert_eq!(copied.modified().unwrap(), when);
}

#[test]
fn existing_conversion_is_never_retried() {
    let source = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_under(source.path(), "clip.mkv", b"video");
    let run = mirror_run(source.path());

    let dst = write_under(data.path(), "_server/clip.mp4", b"corrupt");

    let conv = Arc::new(RecordingConverter::default());
    let report = run_once(&run, data.path(), conv.clone());
    assert_eq!(conv.count("video"), 0);
    assert_eq!(report.skipped, 1);
    assert_eq!(std::fs::read(dst).unwrap(), b"corrupt");
}

#[test]
fn present_thumbnails_are_skipped() {
    let source = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_under(source.path(), "a.jpg", b"a");
    write_under(source.path(), "b.jpg", b"bb");
    write_under(data.path(), "_images/_thumbnails/a_thumb.jpg", b"thumb");
    // Empty derivatives count as absent.
    write_under(data.path(), "_images/_thumbnails/b_thumb.jpg", b"");

    let mut run = mirror_run(source.path());
    run.mode = LaunchMode::Direct;

    let conv = Arc::new(RecordingConverter::default());
    run_once(&run, data.path(), conv.clone());
    let calls = conv.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "thumb");
    assert!(calls[0].1.ends_with("b.jpg"));
}

#[test]
fn private_dir_inside_source_is_not_catalogued() {
    let source = tempfile::tempdir().unwrap();
    write_under(source.path(), "real.txt", b"r");
    let data = source.path().join("_temp");
    write_under(&data, "_server/real.txt", b"r");
    write_under(&data, "_images/_thumbnails/x_thumb.jpg", b"t");

    let report = run_once(&mirror_run(source.path()), &data, Arc::new(RecordingConverter::default()));
    assert_eq!(report.catalogued, 1);
}

#[tokio::test]
async fn mirror_tree_is_served_after_sync() {
    let h = TestHarness::build(LaunchMode::Mirror, false, HashMap::new());
    write_under(h.source.path(), "Videos/clip.mkv", b"source video");
    write_under(h.source.path(), "Pics/photo.png", b"source png");
    write_under(h.source.path(), "readme.txt", b"plain");

    let sync = Arc::new(SyncOrchestrator::new(
        &h.ctx.run,
        (*h.ctx.cache).clone(),
        Arc::new(RecordingConverter::default()),
    ));
    let report = tokio::task::spawn_blocking(move || sync.run()).await.unwrap().unwrap();
    assert_eq!(report.converted, 2);
    assert_eq!(report.copied, 1);
    assert_eq!(report.thumbnails, 1);

    let (status, _, body) = h.get("/Videos/clip.mp4").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"video");

    let (_, html) = h.get_html("/Pics").await;
    assert!(html.contains(">photo.jpg<"));
    assert!(html.contains("src=\"/__thumbs__/Pics/photo_thumb.jpg\""));

    let (status, _, body) = h.get("/readme.txt").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"plain");

    assert!(h.ctx.cache.has(DerivativeKind::ConvertedMedia, Path::new("Pics/photo.png")));
}

#[test]
fn worker_thread_runs_once() {
    let source = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_under(source.path(), "a.txt", b"a");

    let sync = Arc::new(SyncOrchestrator::new(
        &mirror_run(source.path()),
        DerivativeCache::new(data.path()),
        Arc::new(RecordingConverter::default()),
    ));
    let handle = sync.clone().spawn().unwrap();
    let report = handle.join().unwrap().unwrap();
    assert_eq!(report.copied, 1);
    assert!(sync.run().is_err());
}
