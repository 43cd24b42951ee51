//! Integration tests for downloads, record fetching and archive expansion (src/fetch/).

mod common;

use pretty_assertions::assert_eq;
use serde_json::json;

use common::{png_bytes, temp_data_dir, zip_bytes, TruncatingServer, UNREACHABLE_URL};
use slidekit::fetch::archive::extract_archive;
use slidekit::fetch::{partial_path, Fetcher};

// ---------------------------------------------------------------------------
// download
// ---------------------------------------------------------------------------

#[test]
fn test_download_writes_body() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/slide.svs")
        .with_status(200)
        .with_body("slide-bytes")
        .create();
    let (_tmp, data) = temp_data_dir();
    let dest = data.join("nested").join("slide.svs");

    let fetcher = Fetcher::new(server.url());
    assert!(fetcher.download(&format!("{}/slide.svs", server.url()), &dest));
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "slide-bytes");
    mock.assert();
}

#[test]
fn test_download_overwrites_partial_file() {
    let mut server = mockito::Server::new();
    let _m = server
        .mock("GET", "/f.bin")
        .with_status(200)
        .with_body("complete")
        .create();
    let (_tmp, data) = temp_data_dir();
    let dest = data.join("f.bin");
    std::fs::write(&dest, "partial-leftover-from-earlier-attempt").unwrap();

    let fetcher = Fetcher::new(server.url());
    assert!(fetcher.download(&format!("{}/f.bin", server.url()), &dest));
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "complete");
}

#[test]
fn test_download_http_error_returns_false() {
    let mut server = mockito::Server::new();
    let _m = server.mock("GET", "/missing").with_status(404).create();
    let (_tmp, data) = temp_data_dir();
    let dest = data.join("missing.bin");

    let fetcher = Fetcher::new(server.url());
    assert!(!fetcher.download(&format!("{}/missing", server.url()), &dest));
    assert!(!dest.exists());
}

#[test]
fn test_download_unreachable_returns_false() {
    let (_tmp, data) = temp_data_dir();
    let dest = data.join("unreachable.bin");

    let fetcher = Fetcher::default();
    assert!(!fetcher.download(UNREACHABLE_URL, &dest));
    assert!(!dest.exists());
}

#[test]
fn test_download_truncated_body_leaves_nothing() {
    let server = TruncatingServer::start(1000, b"123456789");
    let (_tmp, data) = temp_data_dir();
    let dest = data.join("direct.svs");

    let fetcher = Fetcher::default();
    assert!(!fetcher.download(&server.url, &dest));
    assert!(!dest.exists());
    assert!(!partial_path(&dest).exists());
}

#[test]
fn test_download_truncated_body_keeps_previous_file() {
    let server = TruncatingServer::start(1000, b"123456789");
    let (_tmp, data) = temp_data_dir();
    let dest = data.join("slide.svs");
    std::fs::write(&dest, "previous").unwrap();

    assert!(!Fetcher::default().download(&server.url, &dest));
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "previous");
}

#[test]
fn test_partial_path_is_sibling() {
    let dest = std::path::Path::new("/data/CMU-1-Small-Region.svs");
    assert_eq!(
        partial_path(dest),
        std::path::PathBuf::from("/data/CMU-1-Small-Region.svs.part")
    );
}

// ---------------------------------------------------------------------------
// fetch_record
// ---------------------------------------------------------------------------

fn file_entry(server: &mockito::ServerGuard, name: &str) -> serde_json::Value {
    json!({"key": name, "links": {"self": format!("{}/files/{}", server.url(), name)}})
}

#[test]
fn test_fetch_record_applies_filter() {
    let mut server = mockito::Server::new();
    let body = json!({"files": [file_entry(&server, "notes.txt"), file_entry(&server, "slides.svs")]});
    let _m = server
        .mock("GET", "/records/77")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create();
    let txt = server.mock("GET", "/files/notes.txt").with_body("hello").create();
    let svs = server.mock("GET", "/files/slides.svs").expect(0).create();

    let (_tmp, data) = temp_data_dir();
    let fetcher = Fetcher::new(server.url());
    let got = fetcher.fetch_record("77", &data, Some("*.txt"));

    assert_eq!(got, vec![data.join("notes.txt")]);
    assert_eq!(std::fs::read_to_string(data.join("notes.txt")).unwrap(), "hello");
    txt.assert();
    svs.assert();
}

#[test]
fn test_fetch_record_substring_filter() {
    let mut server = mockito::Server::new();
    let body = json!({"files": [file_entry(&server, "camelyon_tiles_v2.bin")]});
    let _m = server
        .mock("GET", "/records/5")
        .with_status(200)
        .with_body(body.to_string())
        .create();
    let _m = server
        .mock("GET", "/files/camelyon_tiles_v2.bin")
        .with_body("x")
        .create();

    let (_tmp, data) = temp_data_dir();
    let got = Fetcher::new(server.url()).fetch_record("5", &data, Some("tiles"));
    assert_eq!(got, vec![data.join("camelyon_tiles_v2.bin")]);
}

#[test]
fn test_fetch_record_zero_matches_downloads_nothing() {
    let mut server = mockito::Server::new();
    let body = json!({"files": [file_entry(&server, "a.txt"), file_entry(&server, "b.txt")]});
    let _m = server
        .mock("GET", "/records/1")
        .with_status(200)
        .with_body(body.to_string())
        .create();
    let files = server
        .mock("GET", mockito::Matcher::Regex("^/files/".to_string()))
        .expect(0)
        .create();

    let (_tmp, data) = temp_data_dir();
    let got = Fetcher::new(server.url()).fetch_record("1", &data, Some("*.zip"));
    assert!(got.is_empty());
    files.assert();
    assert_eq!(std::fs::read_dir(&data).unwrap().count(), 0);
}

#[test]
fn test_fetch_record_search_shape() {
    let mut server = mockito::Server::new();
    let body = json!({"hits": {"hits": [
        {"files": [file_entry(&server, "one.txt")]},
        {"files": [file_entry(&server, "two.txt")]}
    ]}});
    let _m = server
        .mock("GET", "/records/9")
        .with_status(200)
        .with_body(body.to_string())
        .create();
    let _m = server.mock("GET", "/files/one.txt").with_body("1").create();
    let _m = server.mock("GET", "/files/two.txt").with_body("2").create();

    let (_tmp, data) = temp_data_dir();
    let got = Fetcher::new(server.url()).fetch_record("9", &data, None);
    assert_eq!(got, vec![data.join("one.txt"), data.join("two.txt")]);
}

#[test]
fn test_fetch_record_keeps_existing_files() {
    let mut server = mockito::Server::new();
    let body = json!({"files": [file_entry(&server, "have.txt")]});
    let _m = server
        .mock("GET", "/records/3")
        .with_status(200)
        .with_body(body.to_string())
        .create();
    let download = server.mock("GET", "/files/have.txt").expect(0).create();

    let (_tmp, data) = temp_data_dir();
    std::fs::write(data.join("have.txt"), "local copy").unwrap();
    let got = Fetcher::new(server.url()).fetch_record("3", &data, None);

    assert_eq!(got, vec![data.join("have.txt")]);
    assert_eq!(std::fs::read_to_string(data.join("have.txt")).unwrap(), "local copy");
    download.assert();
}

#[test]
fn test_fetch_record_skips_failed_downloads() {
    let mut server = mockito::Server::new();
    let body = json!({"files": [file_entry(&server, "ok.txt"), file_entry(&server, "gone.txt")]});
    let _m = server
        .mock("GET", "/records/4")
        .with_status(200)
        .with_body(body.to_string())
        .create();
    let _m = server.mock("GET", "/files/ok.txt").with_body("ok").create();
    let _m = server.mock("GET", "/files/gone.txt").with_status(500).create();

    let (_tmp, data) = temp_data_dir();
    let got = Fetcher::new(server.url()).fetch_record("4", &data, None);
    assert_eq!(got, vec![data.join("ok.txt")]);
}

#[test]
fn test_fetch_record_extracts_archives() {
    let png = png_bytes();
    let archive = zip_bytes(&[
        ("batch/", Vec::new()),
        ("batch/tile_0.png", png),
        ("batch/README.txt", b"hi".to_vec()),
    ]);

    let mut server = mockito::Server::new();
    let body = json!({"files": [file_entry(&server, "tiles.zip")]});
    let _m = server
        .mock("GET", "/records/8")
        .with_status(200)
        .with_body(body.to_string())
        .create();
    let _m = server.mock("GET", "/files/tiles.zip").with_body(archive).create();

    let (_tmp, data) = temp_data_dir();
    let got = Fetcher::new(server.url()).fetch_record("8", &data, Some("*.zip"));

    assert_eq!(got, vec![data.join("tiles.zip")]);
    assert!(data.join("tiles").join("batch").join("tile_0.png").is_file());
    assert!(data.join("tiles").join("batch").join("README.txt").is_file());
}

#[test]
fn test_fetch_record_bad_archive_still_reported() {
    let mut server = mockito::Server::new();
    let body = json!({"files": [file_entry(&server, "broken.zip")]});
    let _m = server
        .mock("GET", "/records/6")
        .with_status(200)
        .with_body(body.to_string())
        .create();
    let _m = server.mock("GET", "/files/broken.zip").with_body("not a zip").create();

    let (_tmp, data) = temp_data_dir();
    let got = Fetcher::new(server.url()).fetch_record("6", &data, None);
    assert_eq!(got, vec![data.join("broken.zip")]);
}

#[test]
fn test_fetch_record_uses_download_link() {
    let mut server = mockito::Server::new();
    let body = json!({"files": [{
        "filename": "a.txt",
        "links": {
            "self": format!("{}/meta/a", server.url()),
            "download": format!("{}/content/a", server.url())
        }
    }]});
    let _m = server
        .mock("GET", "/records/11")
        .with_status(200)
        .with_body(body.to_string())
        .create();
    let meta = server
        .mock("GET", "/meta/a")
        .with_body("{\"checksum\": \"md5:0\"}")
        .expect(0)
        .create();
    let _m = server.mock("GET", "/content/a").with_body("REAL CONTENT").create();

    let (_tmp, data) = temp_data_dir();
    let got = Fetcher::new(server.url()).fetch_record("11", &data, None);
    assert_eq!(got, vec![data.join("a.txt")]);
    assert_eq!(std::fs::read_to_string(data.join("a.txt")).unwrap(), "REAL CONTENT");
    meta.assert();
}

#[test]
fn test_fetch_record_entry_with_key_and_filename() {
    let mut server = mockito::Server::new();
    let body = json!({"files": [{
        "key": "a.txt",
        "filename": "a.txt",
        "links": {"self": format!("{}/files/a.txt", server.url())}
    }]});
    let _m = server
        .mock("GET", "/records/12")
        .with_status(200)
        .with_body(body.to_string())
        .create();
    let _m = server.mock("GET", "/files/a.txt").with_body("a").create();

    let (_tmp, data) = temp_data_dir();
    let got = Fetcher::new(server.url()).fetch_record("12", &data, None);
    assert_eq!(got, vec![data.join("a.txt")]);
}

#[test]
fn test_fetch_record_truncated_download_not_reported() {
    let trunc = TruncatingServer::start(1000, b"short");
    let mut server = mockito::Server::new();
    let body = json!({"files": [{"key": "slide.svs", "links": {"self": trunc.url.clone()}}]});
    let _m = server
        .mock("GET", "/records/13")
        .with_status(200)
        .with_body(body.to_string())
        .create();

    let (_tmp, data) = temp_data_dir();
    let fetcher = Fetcher::new(server.url());
    assert!(fetcher.fetch_record("13", &data, None).is_empty());
    assert!(fetcher.fetch_record("13", &data, None).is_empty());
    assert!(!data.join("slide.svs").exists());
    assert_eq!(trunc.hits(), 2);
}

#[test]
fn test_fetch_record_malformed_metadata_is_empty() {
    let mut server = mockito::Server::new();
    let _m = server
        .mock("GET", "/records/2")
        .with_status(200)
        .with_body("{\"unexpected\": true}")
        .create();
    let (_tmp, data) = temp_data_dir();
    assert!(Fetcher::new(server.url()).fetch_record("2", &data, None).is_empty());
}

#[test]
fn test_fetch_record_non_json_metadata_is_empty() {
    let mut server = mockito::Server::new();
    let _m = server
        .mock("GET", "/records/2")
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create();
    let (_tmp, data) = temp_data_dir();
    assert!(Fetcher::new(server.url()).fetch_record("2", &data, None).is_empty());
}

#[test]
fn test_fetch_record_unreachable_api_is_empty() {
    let (_tmp, data) = temp_data_dir();
    let fetcher = Fetcher::new("http://127.0.0.1:1/api");
    assert!(fetcher.fetch_record("123", &data, None).is_empty());
}

// ---------------------------------------------------------------------------
// extract_archive
// ---------------------------------------------------------------------------

#[test]
fn test_extract_archive_applies_predicate() {
    let (_tmp, data) = temp_data_dir();
    let archive = data.join("a.zip");
    std::fs::write(
        &archive,
        zip_bytes(&[
            ("keep.png", png_bytes()),
            ("drop.txt", b"x".to_vec()),
            ("nested/", Vec::new()),
        ]),
    )
    .unwrap();

    let target = data.join("out");
    let n = extract_archive(&archive, &target, slidekit::fetch::archive::is_image).unwrap();
    assert_eq!(n, 1);
    assert!(target.join("keep.png").is_file());
    assert!(!target.join("drop.txt").exists());
    assert!(!target.join("nested").exists());
}
