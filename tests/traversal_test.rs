//! Path containment: every escape attempt lands on the root listing of the
//! tree it targeted and never returns bytes from outside it.

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

const SECRET: &str = "TOP-SECRET-CONTENTS";

/// Served tree at `<tmp>/library` with `<tmp>/secret` planted beside it.
fn harness_with_secret() -> TestHarness {
    let h = TestHarness::nested();
    h.write("inside.txt", b"public");
    std::fs::write(h.source.path().join("secret"), SECRET).unwrap();
    std::fs::write(h.data.path().join("secret"), SECRET).unwrap();
    h
}

#[tokio::test]
async fn dot_dot_falls_back_to_root_listing() {
    let h = harness_with_secret();

    for uri in [
        "/../secret",
        "/../../secret",
        "/%2e%2e/secret",
        "/%2E%2E/%2e%2e/secret",
        "/..%2fsecret",
        "/..%5csecret",
        "/a/../../secret",
    ] {
        let (status, html) = h.get_html(uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert!(!html.contains(SECRET), "{uri} leaked");
        assert!(html.contains(">inside.txt<"), "{uri} did not fall back to the root listing");
    }
}

#[tokio::test]
async fn mirror_escape_falls_back_before_any_sync() {
    let h = TestHarness::mirror();
    std::fs::write(h.data.path().join("secret"), SECRET).unwrap();
    std::fs::write(h.source.path().join("secret"), SECRET).unwrap();

    for uri in ["/", "/../secret", "/../../secret", "/%2e%2e/secret", "/..%2fsecret"] {
        let (status, html) = h.get_html(uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert!(!html.contains(SECRET), "{uri} leaked");
        assert!(html.contains("<title>/</title>"), "{uri} did not fall back to the root listing");
    }

    h.write("inside.txt", b"public");
    let (status, html) = h.get_html("/../secret").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(">inside.txt<"));
}

#[tokio::test]
async fn double_encoding_is_decoded_once() {
    let h = harness_with_secret();

    // `%252e%252e` decodes to the literal segment `%2e%2e`, which does not exist.
    let (status, _, body) = h.get("/%252e%252e/secret").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!String::from_utf8_lossy(&body).contains(SECRET));
}

#[tokio::test]
async fn inner_dot_dot_stays_inside() {
    let h = harness_with_secret();
    h.write("Sub/keep.txt", b"k");

    let (status, _, body) = h.get("/Sub/../inside.txt").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"public");
}

#[tokio::test]
async fn derivative_escape_is_not_found() {
    let h = harness_with_secret();

    for uri in [
        "/__thumbs__/../../secret",
        "/__thumbs__/%2e%2e/%2e%2e/secret",
        "/__preview__/..%2f..%2fsecret",
    ] {
        let (status, _, body) = h.get(uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert!(!String::from_utf8_lossy(&body).contains(SECRET));
    }
}

#[tokio::test]
async fn raw_socket_traversal() {
    let (h, addr) = TestHarness::serve(harness_with_secret()).await;
    assert!(h.source.path().join("secret").exists());

    // Bypass client-side dot-segment normalization.
    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /../../secret HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    let response = String::from_utf8_lossy(&response);

    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(!response.contains(SECRET));
    assert!(response.contains(">inside.txt<"));
}
