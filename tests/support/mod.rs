//! Shared fixtures for integration tests: a mock catalog site.
//!
//! Product pages follow the live site's markup: an `h1` heading, a
//! `div.reference` label, a zoomable `img.img_slide_produit`, and an
//! Open-Graph image.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Mutex;

use catalog_scraper_core::{BROWSER_USER_AGENT, ProgressEvent, ScraperConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Fake JPEG payload.
pub const IMAGE_BYTES: &[u8] = b"\xFF\xD8\xFF\xE0fake-jpeg-body";

/// Request matcher comparing the raw `User-Agent` header with the browser
/// identity. The stock `header` matcher splits values on commas, which the
/// identity contains.
pub fn browser_user_agent(request: &Request) -> bool {
    request
        .headers
        .get("user-agent")
        .and_then(|value| value.to_str().ok())
        == Some(BROWSER_USER_AGENT)
}

/// Builds a sitemap document listing `locs`.
pub fn sitemap_xml(locs: &[String]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
"#,
    );
    for loc in locs {
        xml.push_str(&format!("  <url><loc>{loc}</loc></url>\n"));
    }
    xml.push_str("</urlset>\n");
    xml
}

/// Builds a product page with any combination of reference and image sources.
pub fn product_page(
    name: &str,
    reference: Option<&str>,
    zoom: Option<&str>,
    og_image: Option<&str>,
) -> String {
    let og = og_image
        .map(|url| format!(r#"<meta property="og:image" content="{url}">"#))
        .unwrap_or_default();
    let reference = reference
        .map(|code| format!(r#"<div class="reference">Ref: {code}</div>"#))
        .unwrap_or_default();
    let zoom = zoom
        .map(|url| {
            format!(r#"<img class="img_slide_produit" src="/thumb.jpg" data-zoom="{url}">"#)
        })
        .unwrap_or_default();
    format!(
        "<html><head><title>{name}</title>{og}</head>\
         <body><h1>{name}</h1>{reference}{zoom}</body></html>"
    )
}

/// Serves `body` as the site's sitemap.
pub async fn mount_sitemap(server: &MockServer, locs: &[String]) {
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap_xml(locs)))
        .mount(server)
        .await;
}

/// Serves an HTML page at `page_path`, expecting exactly `hits` requests.
pub async fn mount_page(server: &MockServer, page_path: &str, html: String, hits: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(html),
        )
        .expect(hits)
        .mount(server)
        .await;
}

/// Serves [`IMAGE_BYTES`] at `image_path`, expecting exactly `hits` requests.
pub async fn mount_image(server: &MockServer, image_path: &str, hits: u64) {
    Mock::given(method("GET"))
        .and(path(image_path))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(IMAGE_BYTES.to_vec()),
        )
        .expect(hits)
        .mount(server)
        .await;
}

/// Product page URL on the mock server.
pub fn product_url(server: &MockServer, n: usize) -> String {
    format!("{}/produit-{n}.html", server.uri())
}

/// Config pointed at the mock server, writing into `image_dir`.
pub fn config_for(server: &MockServer, image_dir: &Path, concurrency: usize) -> ScraperConfig {
    ScraperConfig::default()
        .with_base_url(server.uri())
        .with_image_dir(image_dir)
        .with_concurrency(concurrency)
        .with_timeouts(5, 10)
}

/// Progress sink that records every event.
#[derive(Default)]
pub struct EventLog(Mutex<Vec<ProgressEvent>>);

impl EventLog {
    pub fn push(&self, event: ProgressEvent) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.0.lock().unwrap().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.events().iter().map(ToString::to_string).collect()
    }
}

/// Sorted file names in `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
