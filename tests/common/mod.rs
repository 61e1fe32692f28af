//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which lays out a source folder, a private data
//! directory and an asset directory in temp space, and builds the full
//! [`AppContext`] with a fake prober. The [`TestHarness::with_server`]
//! constructor starts Axum on a random port for HTTP-level testing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use mediashelf::cache::{DerivativeCache, DerivativeKind};
use mediashelf::config::{LaunchMode, RunConfig};
use mediashelf::conversion::{MediaConverter, MediaProber};
use mediashelf::server::{create_router, AppContext};

/// Prober returning canned answers.
#[derive(Default)]
pub struct FakeProber {
    pub tags: HashMap<String, String>,
}

impl MediaProber for FakeProber {
    fn resolution(&self, _path: &Path) -> Option<(u32, u32)> {
        None
    }

    fn frame_rate(&self, _path: &Path) -> Option<f64> {
        None
    }

    fn audio_tags(&self, _path: &Path) -> HashMap<String, String> {
        self.tags.clone()
    }
}

/// Converter that writes the operation name as the output and records calls.
#[derive(Default)]
pub struct RecordingConverter {
    pub calls: Mutex<Vec<(&'static str, PathBuf)>>,
}

impl RecordingConverter {
    fn record(&self, op: &'static str, src: &Path, dst: &Path) -> mediashelf::Result<()> {
        self.calls.lock().unwrap().push((op, src.to_path_buf()));
        std::fs::create_dir_all(dst.parent().unwrap())?;
        std::fs::write(dst, op.as_bytes())?;
        Ok(())
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|(o, _)| *o == op).count()
    }
}

impl MediaConverter for RecordingConverter {
    fn make_full_image(&self, src: &Path, dst: &Path) -> mediashelf::Result<()> {
        self.record("image", src, dst)
    }
    fn make_thumbnail(&self, src: &Path, dst: &Path) -> mediashelf::Result<()> {
        self.record("thumb", src, dst)
    }
    fn make_video(&self, src: &Path, dst: &Path) -> mediashelf::Result<()> {
        self.record("video", src, dst)
    }
    fn extract_audio_cover(&self, src: &Path, dst: &Path) -> mediashelf::Result<()> {
        self.record("cover", src, dst)
    }
}

/// Temp-backed source, data and asset directories plus the context built
/// over them.
pub struct TestHarness {
    pub ctx: AppContext,
    pub source: TempDir,
    pub data: TempDir,
    pub assets: TempDir,
}

impl TestHarness {
    /// Direct mode, audio metadata on, no tags.
    pub fn new() -> Self {
        Self::build(LaunchMode::Direct, true, HashMap::new())
    }

    pub fn with_tags(tags: &[(&str, &str)]) -> Self {
        let tags = tags
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self::build(LaunchMode::Direct, true, tags)
    }

    pub fn build(mode: LaunchMode, show_audio_meta: bool, tags: HashMap<String, String>) -> Self {
        Self::build_at(mode, show_audio_meta, tags, None)
    }

    /// Mirror mode with nothing synced yet.
    pub fn mirror() -> Self {
        Self::build(LaunchMode::Mirror, false, HashMap::new())
    }

    /// Direct mode with the served root at `<tmp>/library`, so files can be
    /// planted just outside it.
    pub fn nested() -> Self {
        Self::build_at(LaunchMode::Direct, true, HashMap::new(), Some("library"))
    }

    fn build_at(
        mode: LaunchMode,
        show_audio_meta: bool,
        tags: HashMap<String, String>,
        subdir: Option<&str>,
    ) -> Self {
        let source = tempfile::tempdir().expect("failed to create source dir");
        let data = tempfile::tempdir().expect("failed to create data dir");
        let assets = tempfile::tempdir().expect("failed to create assets dir");

        let source_root = match subdir {
            Some(sub) => source.path().join(sub),
            None => source.path().to_path_buf(),
        };
        std::fs::create_dir_all(&source_root).expect("failed to create source root");

        let run = RunConfig {
            mode,
            verbose_transcoder_log: false,
            show_audio_meta,
            port: 8000,
            source_root,
        };
        let ctx = AppContext::new(
            run,
            DerivativeCache::new(data.path()),
            assets.path().to_path_buf(),
            Arc::new(FakeProber { tags }),
        )
        .expect("failed to build context");

        Self {
            ctx,
            source,
            data,
            assets,
        }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::serve(Self::new()).await
    }

    /// Start an Axum server for an existing harness.
    pub async fn serve(harness: Self) -> (Self, SocketAddr) {
        let app = create_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    /// Write a file under the served tree, creating parents.
    pub fn write(&self, rel: &str, bytes: &[u8]) -> PathBuf {
        write_under(self.ctx.server_root(), rel, bytes)
    }

    /// Write a derivative of `kind` for source path `rel`.
    pub fn write_derivative(&self, kind: DerivativeKind, rel: &str, bytes: &[u8]) -> PathBuf {
        let path = self.ctx.cache.path_for(kind, Path::new(rel));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, bytes).unwrap();
        path
    }

    pub fn write_asset(&self, name: &str, bytes: &[u8]) {
        std::fs::write(self.assets.path().join(name), bytes).unwrap();
    }

    /// Issue a request through the router without a socket.
    pub async fn request(&self, method: Method, uri: &str) -> (StatusCode, HeaderMap, Vec<u8>) {
        let app = create_router(self.ctx.clone());
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, headers, bytes.to_vec())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, HeaderMap, Vec<u8>) {
        self.request(Method::GET, uri).await
    }

    /// GET and return the body as text.
    pub async fn get_html(&self, uri: &str) -> (StatusCode, String) {
        let (status, _, body) = self.get(uri).await;
        (status, String::from_utf8(body).unwrap())
    }
}

pub fn write_under(root: &Path, rel: &str, bytes: &[u8]) -> PathBuf {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Number of non-overlapping occurrences of `needle`.
pub fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}
