//! Fixed transcoder recipes.
//!
//! Every function here is pure: it turns probe results into the exact
//! ffmpeg argument list. Argument order is significant to ffmpeg and is
//! preserved exactly, including where the frame-rate cap is injected.

use std::ffi::OsString;
use std::path::Path;

/// Longer-side cap for full-size images.
pub const MAX_IMAGE_DIM: u32 = 2048;
/// Bounding box edge for thumbnails.
pub const MAX_THUMB_DIM: u32 = 320;
/// Output width for landscape video.
pub const VIDEO_LANDSCAPE_WIDTH: u32 = 1024;
/// Output height for portrait video.
pub const VIDEO_PORTRAIT_HEIGHT: u32 = 768;
/// Frame rates above this are capped to it.
pub const VIDEO_FPS_CAP: f64 = 30.0;
/// Assumed frame rate when probing fails.
pub const DEFAULT_FPS: f64 = 30.0;

/// Orientation used to pick a width- or height-based scale expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl Orientation {
    /// Unknown dimensions are treated as landscape.
    pub fn of(dims: Option<(u32, u32)>) -> Self {
        match dims {
            Some((w, h)) if w < h => Orientation::Portrait,
            _ => Orientation::Landscape,
        }
    }
}

fn os(s: impl Into<OsString>) -> OsString {
    s.into()
}

fn args(list: &[&str]) -> Vec<OsString> {
    list.iter().map(OsString::from).collect()
}

/// `a * num / den` rounded to the nearest multiple of two (ffmpeg's `-2`).
fn rescale_even(a: u32, num: u32, den: u32) -> u32 {
    let (a, num, den) = (a as u64, num as u64, den as u64);
    let half_units = (a * num + den) / (2 * den);
    (half_units * 2).max(2) as u32
}

/// `a * num / den` rounded to nearest.
fn rescale(a: u32, num: u32, den: u32) -> u32 {
    let (a, num, den) = (a as u64, num as u64, den as u64);
    ((a * num + den / 2) / den).max(1) as u32
}

/// Scale filter for the full-size image recipe. Downscale only.
pub fn full_image_scale(dims: Option<(u32, u32)>) -> String {
    match Orientation::of(dims) {
        Orientation::Landscape => format!("scale='min({MAX_IMAGE_DIM},iw)':-2"),
        Orientation::Portrait => format!("scale=-2:'min({MAX_IMAGE_DIM},ih)'"),
    }
}

/// Output dimensions the full-size recipe yields for a `w`x`h` source.
pub fn full_image_target(w: u32, h: u32) -> (u32, u32) {
    match Orientation::of(Some((w, h))) {
        Orientation::Landscape => {
            let tw = w.min(MAX_IMAGE_DIM);
            (tw, rescale_even(tw, h, w))
        }
        Orientation::Portrait => {
            let th = h.min(MAX_IMAGE_DIM);
            (rescale_even(th, w, h), th)
        }
    }
}

/// Output dimensions the thumbnail recipe yields for a `w`x`h` source.
pub fn thumbnail_target(w: u32, h: u32) -> (u32, u32) {
    let box_w = w.min(MAX_THUMB_DIM);
    let box_h = h.min(MAX_THUMB_DIM);
    let fit_w = rescale(box_h, w, h);
    let fit_h = rescale(box_w, h, w);
    (box_w.min(fit_w), box_h.min(fit_h))
}

/// Full-size single-frame baseline JPEG, quality 2, 4:2:0.
pub fn full_image_args(src: &Path, dst: &Path, dims: Option<(u32, u32)>) -> Vec<OsString> {
    let mut a = args(&["-y", "-i"]);
    a.push(os(src));
    a.extend(args(&["-vf"]));
    a.push(os(full_image_scale(dims)));
    a.extend(args(&["-frames:v", "1", "-q:v", "2", "-pix_fmt", "yuvj420p"]));
    a.push(os(dst));
    a
}

/// Thumbnail fitting a square box, never upscaled, quality 5.
pub fn thumbnail_args(src: &Path, dst: &Path) -> Vec<OsString> {
    let mut a = args(&["-y", "-i"]);
    a.push(os(src));
    a.extend(args(&["-vf"]));
    a.push(os(format!(
        "scale='min({MAX_THUMB_DIM},iw)':'min({MAX_THUMB_DIM},ih)':force_original_aspect_ratio=decrease"
    )));
    a.extend(args(&["-frames:v", "1", "-q:v", "5", "-pix_fmt", "yuvj420p"]));
    a.push(os(dst));
    a
}

/// Scale filter for the video recipe.
pub fn video_scale(dims: Option<(u32, u32)>) -> String {
    match Orientation::of(dims) {
        Orientation::Landscape => format!("scale={VIDEO_LANDSCAPE_WIDTH}:-2"),
        Orientation::Portrait => format!("scale=-2:{VIDEO_PORTRAIT_HEIGHT}"),
    }
}

/// H.264 constrained-baseline L3.0 / AAC MP4 with faststart.
///
/// Autorotation is disabled so rotation only ever comes from the scale
/// filter. When `fps` exceeds the cap, `-r 30` goes immediately before
/// `-c:v`.
pub fn video_args(src: &Path, dst: &Path, dims: Option<(u32, u32)>, fps: f64) -> Vec<OsString> {
    let mut a = args(&["-noautorotate", "-i"]);
    a.push(os(src));
    a.extend(args(&["-vf"]));
    a.push(os(video_scale(dims)));
    if fps > VIDEO_FPS_CAP {
        a.extend(args(&["-r", "30"]));
    }
    a.extend(args(&[
        "-c:v", "libx264",
        "-profile:v", "baseline",
        "-level", "3.0",
        "-pix_fmt", "yuv420p",
        "-b:v", "4000k",
        "-maxrate", "4500k",
        "-bufsize", "9000k",
        "-c:a", "aac",
        "-b:a", "320k",
        "-ar", "48000",
        "-movflags", "+faststart",
        "-y",
    ]));
    a.push(os(dst));
    a
}

/// Lossless copy of the embedded picture stream.
pub fn cover_copy_args(src: &Path, dst: &Path) -> Vec<OsString> {
    let mut a = args(&["-y", "-i"]);
    a.push(os(src));
    a.extend(args(&["-map", "0:v:0", "-c:v", "copy"]));
    a.push(os(dst));
    a
}

/// First video-tagged frame decoded and exported as JPEG.
pub fn cover_frame_args(src: &Path, dst: &Path) -> Vec<OsString> {
    let mut a = args(&["-y", "-i"]);
    a.push(os(src));
    a.extend(args(&["-map", "0:v:0", "-frames:v", "1", "-q:v", "2"]));
    a.push(os(dst));
    a
}
