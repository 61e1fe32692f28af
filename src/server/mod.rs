//! HTTP surface.
//!
//! Read-only: derivative routes are registered explicitly and everything
//! else (listings, players, raw bytes, icons) goes through the fallback
//! browse handler. Handlers never wait on the sync worker; a derivative
//! that does not exist yet is simply a 404.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::signal;
use tower_http::trace::TraceLayer;

use crate::cache::DerivativeCache;
use crate::config::{LaunchMode, RunConfig};
use crate::conversion::MediaProber;

pub mod assets;
pub mod error;
pub mod guard;
pub mod routes_browse;
pub mod routes_derivatives;
pub mod urlpath;

pub use error::AppError;
pub use guard::{GuardedPath, PathGuard};

/// Shared, immutable request context.
#[derive(Clone)]
pub struct AppContext {
    pub run: Arc<RunConfig>,
    pub cache: Arc<DerivativeCache>,
    /// Tree exposed to browsing (source root or mirror root).
    pub server_guard: PathGuard,
    pub thumb_guard: PathGuard,
    pub preview_guard: PathGuard,
    pub assets_dir: PathBuf,
    pub prober: Arc<dyn MediaProber>,
}

impl AppContext {
    /// Resolve every root once from the run configuration and create the
    /// private ones, so `/` lists before the sync worker has written anything.
    pub fn new(
        run: RunConfig,
        cache: DerivativeCache,
        assets_dir: PathBuf,
        prober: Arc<dyn MediaProber>,
    ) -> crate::Result<Self> {
        let server_root = match run.mode {
            LaunchMode::Mirror => cache.mirror_root().to_path_buf(),
            LaunchMode::Direct => run.source_root.clone(),
        };
        cache.ensure_roots(run.mode == LaunchMode::Mirror)?;
        Ok(Self {
            server_guard: PathGuard::new(server_root),
            thumb_guard: PathGuard::new(cache.thumb_root()),
            preview_guard: PathGuard::new(cache.preview_root()),
            run: Arc::new(run),
            cache: Arc::new(cache),
            assets_dir,
            prober,
        })
    }

    pub fn server_root(&self) -> &std::path::Path {
        self.server_guard.root()
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    routes_derivatives::derivative_routes()
        .fallback(routes_browse::browse)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Start the HTTP server and run until Ctrl+C or SIGTERM.
///
/// The listener is dropped on shutdown; in-flight requests are not drained.
pub async fn start_server(ctx: AppContext, host: &str, port: u16) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .context("Invalid server address")?;

    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tokio::select! {
        result = axum::serve(listener, app).into_future() => result?,
        _ = shutdown_signal() => {}
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
