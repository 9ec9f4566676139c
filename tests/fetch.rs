mod common;

use std::fs;

use assert_matches::assert_matches;

use bsr_player::error::PlayerError;
use bsr_player::fetch::{AssetFetcher, HttpFetcher};

use common::serve_once;

#[test]
fn fetch_writes_body_verbatim() {
    let (url, server) = serve_once("200 OK", b"PK\x03\x04\x00\xff");
    let temp = tempfile::tempdir().unwrap();
    let destination = temp.path().join("1234.zip");

    let written = HttpFetcher::new()
        .unwrap()
        .fetch(&format!("{url}/1234.zip"), &destination);

    assert_matches!(written, Ok(6));
    assert_eq!(fs::read(&destination).unwrap(), b"PK\x03\x04\x00\xff");
    let request = server.join().unwrap();
    assert!(request.starts_with("GET /1234.zip HTTP/1.1\r\n"));
}

#[test]
fn fetch_rejects_server_error_without_writing() {
    let (url, server) = serve_once("500 Internal Server Error", b"boom");
    let temp = tempfile::tempdir().unwrap();
    let destination = temp.path().join("1234.zip");

    let err = HttpFetcher::new()
        .unwrap()
        .fetch(&format!("{url}/1234.zip"), &destination)
        .unwrap_err();

    assert_matches!(err, PlayerError::DownloadStatus { status: 500, .. });
    assert!(!destination.exists());
    server.join().unwrap();
}
