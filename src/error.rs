//! Unified error type for mediashelf.
//!
//! Library code funnels its failures into [`Error`]; HTTP handlers derive a
//! status code from it via [`Error::http_status`].

use std::fmt;
use std::path::Path;

/// Every failure mode the core can report.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A file, derivative, or asset does not exist.
    #[error("{entity} not found: {path}")]
    NotFound {
        /// What was looked up (e.g. "file", "thumbnail").
        entity: String,
        /// The path that was requested.
        path: String,
    },

    /// The transcoder failed or produced no usable output.
    #[error("Conversion failed [{recipe}] for {path}: {message}")]
    Conversion {
        /// Recipe that was attempted (e.g. "thumbnail").
        recipe: &'static str,
        /// Source path of the failed conversion.
        path: String,
        /// Human-readable reason.
        message: String,
    },

    /// A metadata probe returned nothing usable.
    #[error("Probe error: {0}")]
    Probe(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// An external tool could not be spawned or located.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The sync worker was asked to run a second time.
    #[error("Sync has already been started")]
    AlreadyStarted,
}

impl Error {
    /// Map this error to an HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::Conversion { .. } => 500,
            Error::Probe(_) => 422,
            Error::Io { source } if source.kind() == std::io::ErrorKind::NotFound => 404,
            Error::Io { .. } => 500,
            Error::Tool { .. } => 502,
            Error::Config(_) => 500,
            Error::AlreadyStarted => 409,
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, path: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            path: path.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Conversion`].
    pub fn conversion(recipe: &'static str, path: &Path, message: impl Into<String>) -> Self {
        Error::Conversion {
            recipe,
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
