//! HTTP client wrapper shared by the sitemap, page, and image stages.

use std::time::Duration;

use reqwest::{Client, Response};
use tracing::{debug, instrument};
use url::Url;

use super::error::FetchError;
use crate::config::ScraperConfig;

/// HTTP client issuing GET requests with a fixed identity header.
///
/// Created once per run and cloned into each stage; clones share the
/// underlying connection pool.
///
/// # Example
///
/// ```no_run
/// use catalog_scraper_core::{HttpFetcher, ScraperConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = HttpFetcher::new(&ScraperConfig::default())?;
/// let body = fetcher.get_text("https://www.agidra.com/sitemap.xml").await?;
/// println!("{} bytes", body.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher from run configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the client cannot be constructed.
    pub fn new(config: &ScraperConfig) -> Result<Self, FetchError> {
        Self::with_settings(
            &config.user_agent,
            config.connect_timeout_secs,
            config.read_timeout_secs,
        )
    }

    /// Builds a fetcher with explicit identity and timeout values.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the client cannot be constructed.
    pub fn with_settings(
        user_agent: &str,
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .user_agent(user_agent.to_string())
            .gzip(true)
            .build()
            .map_err(|source| FetchError::ClientBuild { source })?;
        Ok(Self { client })
    }

    /// Sends a GET request and fails on any non-2xx status.
    ///
    /// The body is left unread so callers can stream it.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] for invalid URLs, transport failures, timeouts,
    /// and non-success statuses.
    #[instrument(level = "debug", skip(self), fields(url = %url))]
    pub async fn get(&self, url: &str) -> Result<Response, FetchError> {
        Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_request(url, e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "non-success status");
            return Err(FetchError::http_status(url, status.as_u16()));
        }

        Ok(response)
    }

    /// Fetches a URL and returns the body decoded as text.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`get`](Self::get), plus body read failures.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.get(url)
            .await?
            .text()
            .await
            .map_err(|e| FetchError::from_request(url, e))
    }

    /// Fetches a URL and returns the raw body bytes.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`get`](Self::get), plus body read failures.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let bytes = self
            .get(url)
            .await?
            .bytes()
            .await
            .map_err(|e| FetchError::from_request(url, e))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_builds_from_default_config() {
        assert!(HttpFetcher::new(&ScraperConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_get_rejects_invalid_url_without_request() {
        let fetcher = HttpFetcher::new(&ScraperConfig::default()).unwrap();
        let err = fetcher.get("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }

    #[test]
    fn test_get_bytes_rejects_relative_url() {
        let fetcher = HttpFetcher::new(&ScraperConfig::default()).unwrap();
        let result = tokio_test::block_on(fetcher.get_bytes("/sitemap.xml"));
        assert!(matches!(result, Err(FetchError::InvalidUrl { url }) if url == "/sitemap.xml"));
    }
}
