//! Sitemap discovery of product links.
//!
//! The resolver fetches `{base}/sitemap.xml` once per run and keeps the
//! entries whose location contains the product-path marker. Failures never
//! propagate: the caller receives an empty link list plus a message, and
//! treats that as the end of the run.

mod parser;

pub use parser::parse_sitemap_locs;

use thiserror::Error;
use tracing::{error, info, instrument};

use crate::fetch::{FetchError, HttpFetcher};

/// Progress message emitted when the sitemap cannot be fetched or parsed.
pub const SITEMAP_ERROR_MESSAGE: &str = "Error fetching product links.";

/// Errors raised while resolving product links.
#[derive(Debug, Error)]
pub enum SitemapError {
    /// The sitemap request failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The sitemap body is not well-formed XML.
    #[error("malformed sitemap XML: {source}")]
    Xml {
        /// The underlying XML error.
        #[source]
        source: quick_xml::Error,
    },
}

/// Product links found in a sitemap, with a human-readable summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapResolution {
    /// Product link locations in document order.
    pub links: Vec<String>,
    /// Summary suitable for a progress line.
    pub message: String,
}

impl SitemapResolution {
    fn found(links: Vec<String>) -> Self {
        let message = format!("Found {} product links.", links.len());
        Self { links, message }
    }

    fn failed() -> Self {
        Self {
            links: Vec::new(),
            message: SITEMAP_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Fetches and filters a site's sitemap.
#[derive(Debug, Clone)]
pub struct SitemapResolver {
    fetcher: HttpFetcher,
    marker: String,
}

impl SitemapResolver {
    /// Creates a resolver keeping entries that contain `marker`.
    #[must_use]
    pub fn new(fetcher: HttpFetcher, marker: impl Into<String>) -> Self {
        Self {
            fetcher,
            marker: marker.into(),
        }
    }

    /// Returns the sitemap location for a site root.
    #[must_use]
    pub fn sitemap_url(base_url: &str) -> String {
        format!("{}/sitemap.xml", base_url.trim_end_matches('/'))
    }

    /// Resolves product links, logging and absorbing any failure.
    #[instrument(skip(self), fields(marker = %self.marker))]
    pub async fn resolve(&self, base_url: &str) -> SitemapResolution {
        match self.try_resolve(base_url).await {
            Ok(links) => {
                info!(count = links.len(), "resolved product links");
                SitemapResolution::found(links)
            }
            Err(error) => {
                error!(%error, base_url, "error fetching product links");
                SitemapResolution::failed()
            }
        }
    }

    /// Resolves product links, returning the failure to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`SitemapError`] when the sitemap cannot be fetched or parsed.
    pub async fn try_resolve(&self, base_url: &str) -> Result<Vec<String>, SitemapError> {
        let url = Self::sitemap_url(base_url);
        let body = self.fetcher.get_bytes(&url).await?;
        parse_sitemap_locs(&body, &self.marker)
    }
}
