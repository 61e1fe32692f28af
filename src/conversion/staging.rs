//! Output staging for derivative writes.
//!
//! A [`StagedOutput`] reserves a hidden temporary file next to the final
//! destination. The producer writes into [`StagedOutput::path`]; only
//! [`StagedOutput::commit`] moves the result into place, with a rename on the
//! same filesystem. Concurrent readers therefore see either nothing or a
//! complete file. Dropping an uncommitted stage deletes the temporary file.

use std::path::{Path, PathBuf};

use tempfile::TempPath;

use crate::error::{Error, Result};

/// File-name prefix of in-progress staging files. Listings hide these.
pub const STAGING_PREFIX: &str = ".staging-";

/// A temporary file that becomes `dest` on commit.
#[derive(Debug)]
pub struct StagedOutput {
    temp: TempPath,
    dest: PathBuf,
}

impl StagedOutput {
    /// Reserve a staging file beside `dest`, creating parent directories.
    ///
    /// The staging name keeps the destination extension so tools that pick
    /// an output format from the file name still do the right thing.
    pub fn new(dest: &Path) -> Result<Self> {
        let dir = dest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;

        let suffix = dest
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let temp = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(&suffix)
            .tempfile_in(dir)?
            .into_temp_path();

        Ok(Self {
            temp,
            dest: dest.to_path_buf(),
        })
    }

    /// Where the producer should write.
    pub fn path(&self) -> &Path {
        &self.temp
    }

    /// Final destination.
    pub fn dest(&self) -> &Path {
        &self.dest
    }

    /// Whether the staging file currently holds any bytes.
    pub fn is_populated(&self) -> bool {
        std::fs::metadata(&self.temp)
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false)
    }

    /// Move the staged file into place.
    ///
    /// Fails (and removes the staging file) if nothing was written.
    pub fn commit(self) -> Result<PathBuf> {
        if !self.is_populated() {
            return Err(Error::tool(
                "staging",
                format!("no output produced for {}", self.dest.display()),
            ));
        }

        self.persist()
    }

    /// Move the staged file into place even if it is empty.
    ///
    /// Used for byte-for-byte copies, where a zero-length source is valid.
    pub fn persist(self) -> Result<PathBuf> {
        self.temp.persist(&self.dest).map_err(|e| Error::Io { source: e.error })?;
        Ok(self.dest)
    }
}

/// Remove `start` and its ancestors while they are empty, stopping before
/// `root`. Directories outside `root` are never touched.
pub fn prune_empty_dirs(start: &Path, root: &Path) {
    let mut current = start;
    while current != root && current.starts_with(root) {
        if std::fs::remove_dir(current).is_err() {
            break;
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
}
