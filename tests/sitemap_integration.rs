//! Integration tests for sitemap resolution against a mock site.

mod support;

use catalog_scraper_core::sitemap::SITEMAP_ERROR_MESSAGE;
use catalog_scraper_core::{HttpFetcher, ScraperConfig, SitemapError, SitemapResolver};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn resolver() -> SitemapResolver {
    let fetcher = HttpFetcher::new(&ScraperConfig::default().with_timeouts(5, 10)).unwrap();
    SitemapResolver::new(fetcher, "/produit-")
}

#[tokio::test]
async fn test_resolve_keeps_product_entries_in_document_order() {
    let server = MockServer::start().await;
    let locs = vec![
        format!("{}/produit-2.html", server.uri()),
        format!("{}/categorie-outils.html", server.uri()),
        format!("{}/produit-1.html", server.uri()),
        format!("{}/contact", server.uri()),
    ];
    support::mount_sitemap(&server, &locs).await;

    let resolution = resolver().resolve(&server.uri()).await;

    assert_eq!(resolution.links, vec![locs[0].clone(), locs[2].clone()]);
    assert_eq!(resolution.message, "Found 2 product links.");
}

#[tokio::test]
async fn test_resolve_sends_browser_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .and(support::browser_user_agent)
        .respond_with(ResponseTemplate::new(200).set_body_string(support::sitemap_xml(&[])))
        .expect(1)
        .mount(&server)
        .await;

    let resolution = resolver().resolve(&server.uri()).await;
    assert!(resolution.links.is_empty());
    assert_eq!(resolution.message, "Found 0 product links.");
}

#[tokio::test]
async fn test_resolve_with_trailing_slash_hits_same_sitemap() {
    let server = MockServer::start().await;
    let locs = vec![support::product_url(&server, 1)];
    support::mount_sitemap(&server, &locs).await;

    let resolution = resolver().resolve(&format!("{}/", server.uri())).await;
    assert_eq!(resolution.links, locs);
}

#[tokio::test]
async fn test_resolve_http_error_yields_no_links_and_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(503))
        // One request from `resolve`, one from `try_resolve`.
        .expect(2)
        .mount(&server)
        .await;

    let resolution = resolver().resolve(&server.uri()).await;
    assert!(resolution.links.is_empty());
    assert_eq!(resolution.message, SITEMAP_ERROR_MESSAGE);

    let err = resolver().try_resolve(&server.uri()).await.unwrap_err();
    assert!(matches!(err, SitemapError::Fetch(ref e) if e.status() == Some(503)));
}

#[tokio::test]
async fn test_resolve_malformed_xml_yields_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<urlset><url><loc>https://x/produit-1</url></urlset>"),
        )
        .mount(&server)
        .await;

    let resolution = resolver().resolve(&server.uri()).await;
    assert!(resolution.links.is_empty());
    assert_eq!(resolution.message, SITEMAP_ERROR_MESSAGE);

    let err = resolver().try_resolve(&server.uri()).await.unwrap_err();
    assert!(matches!(err, SitemapError::Xml { .. }));
}

#[tokio::test]
async fn test_resolve_unreachable_host_yields_error_message() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let resolution = resolver().resolve(&uri).await;
    assert!(resolution.links.is_empty());
    assert_eq!(resolution.message, SITEMAP_ERROR_MESSAGE);
}
