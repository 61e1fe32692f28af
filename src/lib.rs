//! mediashelf - local media library server
//!
//! This library crate exposes the core functionality for integration testing.

pub mod browse;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod conversion;
pub mod error;
pub mod media;
pub mod server;
pub mod streaming;
pub mod sync;

pub use error::{Error, Result};
