//! Path containment.
//!
//! [`PathGuard`] resolves a request path against one root. Normalization is
//! purely lexical: decode once, treat `\` as `/`, drop `.` and empty
//! segments, and let `..` pop a segment. A `..` that would climb above the
//! root, or a segment that is not a plain file name, counts as an escape and
//! the request falls back to the root itself.

use std::path::{Component, Path, PathBuf};

use super::urlpath::percent_decode;

/// Result of resolving a request path under a root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardedPath {
    /// Normalized path relative to the root, `/`-separated; empty for the root.
    pub relative: String,
    /// Absolute filesystem path, always inside the root.
    pub absolute: PathBuf,
    /// Whether the request tried to leave the root and was redirected.
    pub escaped: bool,
}

impl GuardedPath {
    pub fn is_root(&self) -> bool {
        self.relative.is_empty()
    }
}

/// Resolves and contains request paths under a single root.
#[derive(Debug, Clone)]
pub struct PathGuard {
    root: PathBuf,
}

impl PathGuard {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a raw (still percent-encoded) request path.
    pub fn resolve(&self, raw: &str) -> GuardedPath {
        self.resolve_decoded(&percent_decode(raw))
    }

    /// Resolve an already-decoded request path.
    pub fn resolve_decoded(&self, decoded: &str) -> GuardedPath {
        match normalize(decoded) {
            Some(relative) => {
                let absolute = self.root.join(&relative);
                if absolute.starts_with(&self.root) {
                    return GuardedPath {
                        relative,
                        absolute,
                        escaped: false,
                    };
                }
                tracing::warn!("Path {:?} resolved outside {}", decoded, self.root.display());
                self.fallback()
            }
            None => {
                tracing::warn!("Path traversal attempt: {:?}", decoded);
                self.fallback()
            }
        }
    }

    fn fallback(&self) -> GuardedPath {
        GuardedPath {
            relative: String::new(),
            absolute: self.root.clone(),
            escaped: true,
        }
    }
}

/// Lexically normalize a decoded path. `None` means it escapes the root.
pub fn normalize(decoded: &str) -> Option<String> {
    let mut stack: Vec<&str> = Vec::new();
    for segment in decoded.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop()?;
            }
            name => {
                if name.contains('\0') || !is_plain_name(name) {
                    return None;
                }
                stack.push(name);
            }
        }
    }
    Some(stack.join("/"))
}

fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
