//! Media metadata probing.
//!
//! The [`MediaProber`] trait is the seam between the pipeline and the
//! external probe tool. Every query degrades to `None` / an empty map on
//! failure; callers substitute fixed defaults.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// Read-only metadata queries against a media file.
pub trait MediaProber: Send + Sync {
    /// Width and height of the first video (or picture) stream.
    fn resolution(&self, path: &Path) -> Option<(u32, u32)>;

    /// Frame rate of the first video stream.
    fn frame_rate(&self, path: &Path) -> Option<f64>;

    /// Container tags with lowercased keys; empty values are dropped.
    fn audio_tags(&self, path: &Path) -> HashMap<String, String>;
}

/// [`MediaProber`] backed by the `ffprobe` CLI.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    ffprobe: PathBuf,
}

impl FfprobeProber {
    pub fn new(ffprobe: PathBuf) -> Self {
        Self { ffprobe }
    }

    fn run(&self, args: &[&str], path: &Path) -> Result<String> {
        let output = Command::new(&self.ffprobe)
            .args(args)
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::tool("ffprobe", format!("failed to spawn: {e}")))?;

        if !output.status.success() {
            return Err(Error::Probe(format!(
                "ffprobe exited with {} for {}",
                output.status,
                path.display()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl MediaProber for FfprobeProber {
    fn resolution(&self, path: &Path) -> Option<(u32, u32)> {
        let args = [
            "-v", "error",
            "-select_streams", "v:0",
            "-show_entries", "stream=width,height",
            "-of", "csv=p=0:s=x",
        ];
        match self.run(&args, path) {
            Ok(out) => parse_resolution(&out),
            Err(e) => {
                tracing::debug!("Resolution probe failed: {}", e);
                None
            }
        }
    }

    fn frame_rate(&self, path: &Path) -> Option<f64> {
        let args = [
            "-v", "error",
            "-select_streams", "v:0",
            "-show_entries", "stream=r_frame_rate",
            "-of", "csv=p=0",
        ];
        match self.run(&args, path) {
            Ok(out) => parse_frame_rate(&out),
            Err(e) => {
                tracing::debug!("Frame rate probe failed: {}", e);
                None
            }
        }
    }

    fn audio_tags(&self, path: &Path) -> HashMap<String, String> {
        let args = [
            "-v", "error",
            "-show_entries", "format_tags",
            "-print_format", "json",
        ];
        match self.run(&args, path) {
            Ok(out) => parse_format_tags(&out),
            Err(e) => {
                tracing::debug!("Tag probe failed: {}", e);
                HashMap::new()
            }
        }
    }
}

/// Parse `WIDTHxHEIGHT` (first line only). Zero dimensions count as unknown.
pub fn parse_resolution(raw: &str) -> Option<(u32, u32)> {
    let line = raw.lines().next()?.trim();
    let (w, h) = line.split_once('x')?;
    let w: u32 = w.trim().parse().ok()?;
    let h: u32 = h.trim().trim_end_matches(',').parse().ok()?;
    if w == 0 || h == 0 {
        return None;
    }
    Some((w, h))
}

/// Parse a rational (`30000/1001`) or decimal frame rate.
pub fn parse_frame_rate(raw: &str) -> Option<f64> {
    let line = raw.lines().next()?.trim().trim_end_matches(',');
    if line.is_empty() {
        return None;
    }
    let fps = match line.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => line.parse().ok()?,
    };
    (fps.is_finite() && fps > 0.0).then_some(fps)
}

/// Extract `format.tags` from ffprobe JSON output.
pub fn parse_format_tags(raw: &str) -> HashMap<String, String> {
    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(_) => return HashMap::new(),
    };

    let Some(tags) = value
        .get("format")
        .and_then(|f| f.get("tags"))
        .and_then(|t| t.as_object())
    else {
        return HashMap::new();
    };

    tags.iter()
        .filter_map(|(k, v)| {
            let v = match v {
                serde_json::Value::String(s) => s.trim().to_string(),
                serde_json::Value::Null => return None,
                other => other.to_string(),
            };
            (!v.is_empty()).then(|| (k.to_lowercase(), v))
        })
        .collect()
}
