//! Directory browsing and the in-page player.
//!
//! [`listing`] and [`player`] build plain data models; [`templates`] turns
//! them into HTML.

pub mod listing;
pub mod player;
pub mod templates;

pub use listing::{parse_page, read_entries, DirEntry, LinkState, Listing, ViewMode, PAGE_SIZE};
pub use player::{preview_url, PlayerKind, PlayerPage};
pub use templates::{render_listing, render_player};
