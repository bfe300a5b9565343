//! Integration tests for the image downloader.
//!
//! These tests verify naming, idempotence and failure cleanup with mock HTTP servers.

mod support;

use catalog_scraper_core::download::{DownloadError, DownloadOutcome, ImageDownloader};
use catalog_scraper_core::{HttpFetcher, ScraperConfig};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn downloader() -> ImageDownloader {
    ImageDownloader::new(HttpFetcher::new(&ScraperConfig::default().with_timeouts(5, 10)).unwrap())
}

fn image_url(server: &MockServer, image_path: &str) -> Url {
    Url::parse(&format!("{}{image_path}", server.uri())).unwrap()
}

#[tokio::test]
async fn test_download_saves_under_reference_and_name() {
    let server = MockServer::start().await;
    support::mount_image(&server, "/img/p/1.jpg", 1).await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let outcome = downloader()
        .download(
            &image_url(&server, "/img/p/1.jpg"),
            temp_dir.path(),
            "Widget Pro",
            Some("W-1"),
        )
        .await;

    let saved = match outcome {
        DownloadOutcome::Saved(path) => path,
        other => panic!("expected Saved, got {other:?}"),
    };
    assert_eq!(saved, temp_dir.path().join("W-1_Widget_Pro.jpg"));
    assert_eq!(std::fs::read(&saved).unwrap(), support::IMAGE_BYTES);
    assert_eq!(support::file_names(temp_dir.path()), vec!["W-1_Widget_Pro.jpg"]);
}

#[tokio::test]
async fn test_download_is_idempotent_and_skips_request() {
    let server = MockServer::start().await;
    // A second request would fail the expectation when the server drops.
    support::mount_image(&server, "/img/p/2.jpg", 1).await;
    let temp_dir = TempDir::new().unwrap();
    let downloader = downloader();
    let url = image_url(&server, "/img/p/2.jpg");

    let first = downloader
        .download(&url, temp_dir.path(), "Clamp", Some("CL-7"))
        .await;
    let second = downloader
        .download(&url, temp_dir.path(), "Clamp", Some("CL-7"))
        .await;

    assert!(matches!(first, DownloadOutcome::Saved(_)));
    assert!(matches!(second, DownloadOutcome::AlreadyExists(_)));
    assert_eq!(first.path(), second.path());
}

#[tokio::test]
async fn test_download_existing_file_is_left_untouched() {
    let server = MockServer::start().await;
    support::mount_image(&server, "/img/p/3.png", 0).await;
    let temp_dir = TempDir::new().unwrap();
    let existing = temp_dir.path().join("noref_Old_Item.png");
    std::fs::write(&existing, b"original").unwrap();

    let outcome = downloader()
        .download(
            &image_url(&server, "/img/p/3.png"),
            temp_dir.path(),
            "Old Item",
            None,
        )
        .await;

    assert_eq!(outcome.into_path(), Some(existing.clone()));
    assert_eq!(std::fs::read(&existing).unwrap(), b"original");
}

#[tokio::test]
async fn test_download_http_error_leaves_no_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/img/missing.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    let temp_dir = TempDir::new().unwrap();

    let outcome = downloader()
        .download(
            &image_url(&server, "/img/missing.jpg"),
            temp_dir.path(),
            "Ghost",
            Some("G-0"),
        )
        .await;

    match outcome {
        DownloadOutcome::Failed(DownloadError::Fetch(error)) => {
            assert_eq!(error.status(), Some(404));
        }
        other => panic!("expected fetch failure, got {other:?}"),
    }
    assert!(support::file_names(temp_dir.path()).is_empty());
}

#[tokio::test]
async fn test_download_into_missing_directory_fails_with_io_error() {
    let server = MockServer::start().await;
    support::mount_image(&server, "/img/p/4.jpg", 1).await;
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("not-created");

    let outcome = downloader()
        .download(&image_url(&server, "/img/p/4.jpg"), &missing, "Item", Some("I-4"))
        .await;

    assert!(matches!(
        outcome,
        DownloadOutcome::Failed(DownloadError::Io { .. })
    ));
    assert!(!missing.exists());
}

#[tokio::test]
async fn test_concurrent_downloads_of_same_name_fetch_once() {
    let server = MockServer::start().await;
    support::mount_image(&server, "/img/p/5.jpg", 1).await;
    let temp_dir = TempDir::new().unwrap();
    let downloader = downloader();
    let url = image_url(&server, "/img/p/5.jpg");

    let (a, b) = tokio::join!(
        downloader.download(&url, temp_dir.path(), "Twin", Some("T-5")),
        downloader.download(&url, temp_dir.path(), "Twin", Some("T-5")),
    );

    let saved = [&a, &b]
        .iter()
        .filter(|o| matches!(o, DownloadOutcome::Saved(_)))
        .count();
    let skipped = [&a, &b]
        .iter()
        .filter(|o| matches!(o, DownloadOutcome::AlreadyExists(_)))
        .count();
    assert_eq!((saved, skipped), (1, 1));
    assert_eq!(support::file_names(temp_dir.path()), vec!["T-5_Twin.jpg"]);
}
