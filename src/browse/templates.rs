//! HTML rendering.
//!
//! Structure lives here as maud templates; styling and behavior are fixed
//! assets embedded from `assets/`.

use maud::{html, Markup, PreEscaped, DOCTYPE};

use super::listing::{Listing, PAGE_SIZE};
use super::player::{PlayerKind, PlayerPage};

const CSS: &str = include_str!("../../assets/style.css");
const LISTING_JS: &str = include_str!("../../assets/listing.js");
const PLAYER_JS: &str = include_str!("../../assets/player.js");

fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0, user-scalable=yes";
                title { (title) }
                link rel="icon" type="image/x-icon" href="/favicon.ico";
                link rel="icon" type="image/png" href="/favicon.png";
                link rel="apple-touch-icon" href="/apple-touch-icon.png";
                style { (PreEscaped(CSS)) }
            }
            body {
                (content)
            }
        }
    }
}

pub fn render_listing(listing: &Listing) -> Markup {
    let content = html! {
        div.header-row {
            h2 { (listing.title) }
            div.controls.header-controls {
                a.control-btn.control-mode href=(listing.toggle_href) { (listing.toggle_label) }
            }
        }
        @if let Some(parent) = &listing.parent_href {
            div.controls.nav-links {
                a.control-btn.control-back href=(parent) { "Back to parent folder" }
            }
        }
        ul.entries {
            @for row in &listing.rows {
                li.item-row.clickable-row data-href=(row.href) {
                    @if let Some(thumb) = &row.thumbnail {
                        a.thumb-link href=(row.href) {
                            img.thumb src=(thumb) alt="thumb" loading="lazy";
                        }
                    } @else {
                        span.file-icon.(row.icon.css_class()) {}
                    }
                    a.file-label href=(row.href) { (row.name) }
                }
            }
            @for _ in 0..listing.placeholders {
                li.placeholder-row { (PreEscaped("&nbsp;")) }
            }
        }
        @if let Some(pager) = &listing.pager {
            div.controls.pager {
                @if let Some(prev) = &pager.prev {
                    a.control-btn.control-prev href=(prev) { "Prev" }
                } @else {
                    span.control-btn.control-prev.disabled { "Prev" }
                }
                @if let Some(next) = &pager.next {
                    a.control-btn.control-next href=(next) { "Next" }
                } @else {
                    span.control-btn.control-next.disabled { "Next" }
                }
                span.page-status {
                    "Page " (pager.page) "/" (pager.total_pages)
                    " | Files " (pager.shown) "/" (PAGE_SIZE)
                }
            }
        }
        script { (PreEscaped(LISTING_JS)) }
    };
    base_document(&format!("/{}", listing.title.trim_start_matches('/')), content)
}

pub fn render_player(page: &PlayerPage) -> Markup {
    let nav = match &page.kind {
        PlayerKind::Image { prev, next } => Some((prev, next)),
        _ => None,
    };
    let content = html! {
        h2 { (page.title) }
        div.path-display { (page.display_path) }
        div.controls #image-controls {
            a.control-btn.control-back href=(page.back_href) { "Back to file list" }
            @if let Some((prev, next)) = nav {
                @if let Some(prev) = prev {
                    a.control-btn.control-prev href=(prev) { "Previous image" }
                } @else {
                    span.control-btn.control-prev.disabled { "Previous image" }
                }
                @if let Some(next) = next {
                    a.control-btn.control-next href=(next) { "Next image" }
                } @else {
                    span.control-btn.control-next.disabled { "Next image" }
                }
                button #rotate-btn.control-btn.control-rotate type="button" { "Rotate image" }
            }
        }
        @match &page.kind {
            PlayerKind::Image { .. } => {
                div.image-viewer {
                    img #viewer-image src=(page.media_url) alt=(page.file_name);
                }
                script { (PreEscaped(PLAYER_JS)) }
            }
            PlayerKind::Video => {
                div.media-player {
                    video controls autoplay {
                        source src=(page.media_url);
                        "Your browser does not support the video tag."
                    }
                }
            }
            PlayerKind::Audio { cover, meta } => {
                div.media-player {
                    audio controls autoplay {
                        source src=(page.media_url);
                        "Your browser does not support the audio element."
                    }
                }
                @if let Some(cover) = cover {
                    div.cover-art {
                        img src=(cover) alt="Cover art";
                    }
                }
                @for line in meta {
                    div.cover-meta { (line) }
                }
            }
        }
    };
    base_document(&page.file_name, content)
}
