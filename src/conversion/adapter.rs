//! Recipe execution against the external transcoder.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use tracing::{debug, warn};

use super::probe::MediaProber;
use super::recipes;
use super::staging::{prune_empty_dirs, StagedOutput};
use crate::error::{Error, Result};

/// The four derivative operations.
///
/// Each call either leaves a complete, non-empty file at `dst` or leaves
/// nothing there.
pub trait MediaConverter: Send + Sync {
    fn make_full_image(&self, src: &Path, dst: &Path) -> Result<()>;
    fn make_thumbnail(&self, src: &Path, dst: &Path) -> Result<()>;
    fn make_video(&self, src: &Path, dst: &Path) -> Result<()>;
    fn extract_audio_cover(&self, src: &Path, dst: &Path) -> Result<()>;
}

/// [`MediaConverter`] that shells out to ffmpeg.
pub struct FfmpegConverter {
    ffmpeg: PathBuf,
    prober: Arc<dyn MediaProber>,
    verbose: bool,
    private_root: PathBuf,
}

impl FfmpegConverter {
    /// `private_root` bounds the empty-directory cleanup after a failure.
    pub fn new(
        ffmpeg: PathBuf,
        prober: Arc<dyn MediaProber>,
        verbose: bool,
        private_root: PathBuf,
    ) -> Self {
        Self {
            ffmpeg,
            prober,
            verbose,
            private_root,
        }
    }

    fn stdio(&self) -> Stdio {
        if self.verbose {
            Stdio::inherit()
        } else {
            Stdio::null()
        }
    }

    fn execute(&self, recipe: &'static str, src: &Path, args: &[OsString]) -> Result<()> {
        debug!(recipe, "ffmpeg {:?}", args);

        let status = Command::new(&self.ffmpeg)
            .args(args)
            .stdin(Stdio::null())
            .stdout(self.stdio())
            .stderr(self.stdio())
            .status()
            .map_err(|e| Error::tool("ffmpeg", format!("failed to spawn: {e}")))?;

        if !status.success() {
            return Err(Error::conversion(recipe, src, format!("ffmpeg exited with {status}")));
        }
        Ok(())
    }

    /// Run one recipe into a staging file and commit it to `dst`.
    fn produce<F>(&self, recipe: &'static str, src: &Path, dst: &Path, build: F) -> Result<()>
    where
        F: FnOnce(&Path) -> Vec<OsString>,
    {
        let stage = StagedOutput::new(dst)?;
        let args = build(stage.path());
        self.execute(recipe, src, &args)?;
        stage
            .commit()
            .map_err(|e| Error::conversion(recipe, src, e.to_string()))?;
        Ok(())
    }

    fn cleanup_after_failure(&self, dst: &Path) {
        if let Ok(meta) = std::fs::metadata(dst) {
            if meta.is_file() && meta.len() == 0 {
                let _ = std::fs::remove_file(dst);
            }
        }
        if let Some(parent) = dst.parent() {
            prune_empty_dirs(parent, &self.private_root);
        }
    }

    fn finish(&self, dst: &Path, result: Result<()>) -> Result<()> {
        if result.is_err() {
            self.cleanup_after_failure(dst);
        }
        result
    }
}

impl MediaConverter for FfmpegConverter {
    fn make_full_image(&self, src: &Path, dst: &Path) -> Result<()> {
        let dims = self.prober.resolution(src);
        match dims {
            Some((w, h)) => {
                let (tw, th) = recipes::full_image_target(w, h);
                debug!("Full image {}x{} -> {}x{}", w, h, tw, th);
            }
            None => debug!("Resolution unknown for {}, assuming landscape", src.display()),
        }

        let result = self.produce("full_image", src, dst, |out| {
            recipes::full_image_args(src, out, dims)
        });
        self.finish(dst, result)
    }

    fn make_thumbnail(&self, src: &Path, dst: &Path) -> Result<()> {
        let result = self.produce("thumbnail", src, dst, |out| recipes::thumbnail_args(src, out));
        self.finish(dst, result)
    }

    fn make_video(&self, src: &Path, dst: &Path) -> Result<()> {
        let dims = self.prober.resolution(src);
        let fps = self.prober.frame_rate(src).unwrap_or(recipes::DEFAULT_FPS);
        debug!("Video {:?} at {:.3} fps", dims, fps);

        let result = self.produce("video", src, dst, |out| {
            recipes::video_args(src, out, dims, fps)
        });
        self.finish(dst, result)
    }

    fn extract_audio_cover(&self, src: &Path, dst: &Path) -> Result<()> {
        let copied = self.produce("cover_copy", src, dst, |out| {
            recipes::cover_copy_args(src, out)
        });
        let result = match copied {
            Ok(()) => Ok(()),
            Err(e) => {
                debug!("Cover stream copy failed ({}), decoding first frame", e);
                self.produce("cover_frame", src, dst, |out| {
                    recipes::cover_frame_args(src, out)
                })
            }
        };
        if let Err(ref e) = result {
            warn!("No cover extracted: {}", e);
        }
        self.finish(dst, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct NoProbe;

    impl MediaProber for NoProbe {
        fn resolution(&self, _: &Path) -> Option<(u32, u32)> {
            None
        }
        fn frame_rate(&self, _: &Path) -> Option<f64> {
            None
        }
        fn audio_tags(&self, _: &Path) -> HashMap<String, String> {
            HashMap::new()
        }
    }

    fn converter(root: &Path) -> FfmpegConverter {
        FfmpegConverter::new(
            PathBuf::from("nonexistent_tool_xyz_12345"),
            Arc::new(NoProbe),
            false,
            root.to_path_buf(),
        )
    }

    #[test]
    fn missing_tool_leaves_nothing_behind() {
        let root = tempfile::tempdir().unwrap();
        let src = root.path().join("song.mp3");
        std::fs::write(&src, b"ID3").unwrap();
        let dst = root.path().join("_images/_preview/album/song_preview.jpg");

        let conv = converter(root.path());
        assert!(conv.extract_audio_cover(&src, &dst).is_err());
        assert!(!dst.exists());
        assert!(!root.path().join("_images/_preview/album").exists());
        assert!(!root.path().join("_images").exists());
        assert!(root.path().exists());
    }

    #[test]
    fn failed_thumbnail_keeps_populated_siblings() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("_images/_thumbnails/trip");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("a_thumb.jpg"), b"jpeg").unwrap();

        let conv = converter(root.path());
        let dst = dir.join("b_thumb.jpg");
        assert!(conv.make_thumbnail(Path::new("b.png"), &dst).is_err());
        assert!(!dst.exists());
        assert!(dir.join("a_thumb.jpg").exists());
    }

    #[test]
    fn zero_byte_leftover_is_removed() {
        let root = tempfile::tempdir().unwrap();
        let dst = root.path().join("cover/x_preview.jpg");
        std::fs::create_dir_all(dst.parent().unwrap()).unwrap();
        std::fs::write(&dst, b"").unwrap();

        let conv = converter(root.path());
        assert!(conv.extract_audio_cover(Path::new("x.mp3"), &dst).is_err());
        assert!(!dst.exists());
    }
}
