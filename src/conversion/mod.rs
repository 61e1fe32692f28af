//! Media conversion.
//!
//! Turns source media into web-friendly derivatives with fixed ffmpeg
//! recipes:
//!
//! - full-size JPEG (longer side capped at 2048px, never upscaled)
//! - 320px box thumbnails
//! - H.264 baseline / AAC MP4 with faststart, frame rate capped at 30
//! - embedded cover art from audio files
//!
//! Outputs are staged beside their destination and renamed into place, so a
//! derivative that exists is always complete.

pub mod adapter;
pub mod probe;
pub mod recipes;
pub mod staging;
pub mod tools;

pub use adapter::{FfmpegConverter, MediaConverter};
pub use probe::{FfprobeProber, MediaProber};
pub use staging::{prune_empty_dirs, StagedOutput, STAGING_PREFIX};
pub use tools::{check_tools, ToolInfo, ToolPaths};
