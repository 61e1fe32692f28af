//! Byte streaming.
//!
//! Every file response goes through [`serve_file`], which understands a
//! single `Range: bytes=start-end` window and otherwise sends the whole
//! file. Multi-range requests are answered with the first window only.

mod direct;

pub use direct::{parse_range_header, serve_file};
