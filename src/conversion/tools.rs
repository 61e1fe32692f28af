//! External tool discovery.
//!
//! Resolves ffmpeg and ffprobe from configured overrides or `PATH`.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;

use crate::config::ToolsConfig;

/// Resolved executable locations for the transcoder pair.
#[derive(Debug, Clone)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl ToolPaths {
    /// Use the configured path when it exists, otherwise search `PATH`.
    ///
    /// A tool that cannot be found resolves to its bare name so invocations
    /// fail per file (and are logged) rather than at startup.
    pub fn discover(config: &ToolsConfig) -> Self {
        Self {
            ffmpeg: resolve("ffmpeg", config.ffmpeg_path.as_deref()),
            ffprobe: resolve("ffprobe", config.ffprobe_path.as_deref()),
        }
    }
}

fn resolve(name: &str, custom: Option<&Path>) -> PathBuf {
    if let Some(p) = custom {
        if p.exists() {
            return p.to_path_buf();
        }
        tracing::warn!("Configured {} path {:?} does not exist, searching PATH", name, p);
    }
    which::which(name).unwrap_or_else(|_| PathBuf::from(name))
}

/// Availability information for a tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub available: bool,
    /// First line of `-version` output.
    pub version: Option<String>,
    pub path: Option<PathBuf>,
}

/// Check each resolved tool by running it with `-version`.
pub fn check_tools(paths: &ToolPaths) -> Vec<ToolInfo> {
    [("ffmpeg", &paths.ffmpeg), ("ffprobe", &paths.ffprobe)]
        .into_iter()
        .map(|(name, path)| check_tool(name, path))
        .collect()
}

fn check_tool(name: &str, path: &Path) -> ToolInfo {
    match Command::new(path).arg("-version").output() {
        Ok(output) if output.status.success() => ToolInfo {
            name: name.to_string(),
            available: true,
            version: String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|l| l.trim().to_string()),
            path: Some(path.to_path_buf()),
        },
        _ => ToolInfo {
            name: name.to_string(),
            available: false,
            version: None,
            path: None,
        },
    }
}
