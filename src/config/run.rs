//! Immutable startup configuration.
//!
//! A [`RunConfig`] is resolved exactly once before the core starts and is
//! read-only afterwards. The launcher expresses a mode as a key such as
//! `copytotemp_ffmpeglog_meta`; [`ModePreset`] decodes those keys.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Where the HTTP server reads its tree from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Convert/copy the source into a private mirror tree and serve that.
    Mirror,
    /// Serve the source folder as-is.
    Direct,
}

impl LaunchMode {
    /// One-line description printed at startup.
    pub fn description(&self) -> &'static str {
        match self {
            LaunchMode::Mirror => {
                "files are served from the private mirror tree, copied or converted as needed"
            }
            LaunchMode::Direct => "files are served directly from the source folder without modification",
        }
    }
}

impl fmt::Display for LaunchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchMode::Mirror => write!(f, "mirror"),
            LaunchMode::Direct => write!(f, "direct"),
        }
    }
}

/// A decoded launcher mode key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModePreset {
    pub mode: LaunchMode,
    pub verbose_transcoder_log: bool,
    pub show_audio_meta: bool,
}

impl FromStr for ModePreset {
    type Err = String;

    /// Accepts `mirror`, `direct`, and the legacy keys `copytotemp` /
    /// `nocopytotemp` with optional `_ffmpeglog` (or `_ffmpeg`) and `_meta`
    /// suffixes, in that order. `ffmpeglog` alone means
    /// `nocopytotemp_ffmpeglog`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        let key = if key == "ffmpeglog" {
            "nocopytotemp_ffmpeglog".to_string()
        } else {
            key
        };

        let (mode, mut rest) = if let Some(r) = key.strip_prefix("nocopytotemp") {
            (LaunchMode::Direct, r)
        } else if let Some(r) = key.strip_prefix("copytotemp") {
            (LaunchMode::Mirror, r)
        } else if let Some(r) = key.strip_prefix("mirror") {
            (LaunchMode::Mirror, r)
        } else if let Some(r) = key.strip_prefix("direct") {
            (LaunchMode::Direct, r)
        } else {
            return Err(format!("unknown mode: {s}"));
        };

        let mut verbose_transcoder_log = false;
        if let Some(r) = rest.strip_prefix("_ffmpeglog") {
            verbose_transcoder_log = true;
            rest = r;
        } else if let Some(r) = rest.strip_prefix("_ffmpeg") {
            verbose_transcoder_log = true;
            rest = r;
        }

        let mut show_audio_meta = false;
        if let Some(r) = rest.strip_prefix("_meta") {
            show_audio_meta = true;
            rest = r;
        }

        if !rest.is_empty() {
            return Err(format!("unknown mode: {s}"));
        }

        Ok(Self {
            mode,
            verbose_transcoder_log,
            show_audio_meta,
        })
    }
}

/// Resolved, immutable run configuration.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mode: LaunchMode,
    pub verbose_transcoder_log: bool,
    pub show_audio_meta: bool,
    pub port: u16,
    pub source_root: PathBuf,
}

impl RunConfig {
    /// Build from a decoded preset plus explicit flags (flags are OR-ed in).
    pub fn from_preset(
        preset: ModePreset,
        transcoder_log: bool,
        audio_meta: bool,
        port: u16,
        source_root: PathBuf,
    ) -> Self {
        Self {
            mode: preset.mode,
            verbose_transcoder_log: preset.verbose_transcoder_log || transcoder_log,
            show_audio_meta: preset.show_audio_meta || audio_meta,
            port,
            source_root,
        }
    }
}
