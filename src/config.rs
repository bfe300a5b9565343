//! Run configuration for the scraper.
//!
//! [`ScraperConfig`] carries everything a run needs: which site to crawl, how
//! product pages are recognized in its sitemap, where images land, and the
//! HTTP client settings. Defaults describe the catalog the tool was built for;
//! the CLI layers file config and flags on top.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use crate::user_agent;

/// Catalog crawled when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://www.agidra.com/";

/// Substring identifying product pages among sitemap entries.
pub const DEFAULT_PRODUCT_MARKER: &str = "/produit-";

/// Directory images are written to when none is configured.
pub const DEFAULT_IMAGE_DIR: &str = "product_images";

/// Default HTTP connect timeout (30 seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes, covers large images).
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 300;

/// Minimum allowed worker count.
pub const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed worker count.
pub const MAX_CONCURRENCY: usize = 64;

const MAX_TIMEOUT_SECS: u64 = 3600;

/// Errors raised while validating a [`ScraperConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The base URL could not be parsed.
    #[error("invalid base URL '{value}': {source}")]
    InvalidBaseUrl {
        /// The rejected value.
        value: String,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },

    /// The base URL is not http or https.
    #[error("base URL '{value}' must use http or https")]
    UnsupportedScheme {
        /// The rejected value.
        value: String,
    },

    /// The product marker is empty, which would match every sitemap entry.
    #[error("product marker must not be empty")]
    EmptyMarker,

    /// Worker count outside the supported range.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The rejected value.
        value: usize,
    },

    /// Timeout outside the supported range.
    #[error("invalid {field} value {value}: must be between 1 and {MAX_TIMEOUT_SECS} seconds")]
    InvalidTimeout {
        /// Name of the timeout setting.
        field: &'static str,
        /// The rejected value.
        value: u64,
    },
}

/// Settings for one scrape run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScraperConfig {
    /// Site root; the sitemap is fetched from `{base_url}/sitemap.xml`.
    pub base_url: String,
    /// Substring a sitemap entry must contain to count as a product page.
    pub product_marker: String,
    /// Directory downloaded images are written to.
    pub image_dir: PathBuf,
    /// Maximum number of product links processed at once.
    pub concurrency: usize,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// HTTP read timeout in seconds.
    pub read_timeout_secs: u64,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            product_marker: DEFAULT_PRODUCT_MARKER.to_string(),
            image_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
            concurrency: default_concurrency(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
            user_agent: user_agent::default_user_agent(),
        }
    }
}

impl ScraperConfig {
    /// Sets the site root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the product-path marker.
    #[must_use]
    pub fn with_product_marker(mut self, marker: impl Into<String>) -> Self {
        self.product_marker = marker.into();
        self
    }

    /// Sets the image output directory.
    #[must_use]
    pub fn with_image_dir(mut self, image_dir: impl Into<PathBuf>) -> Self {
        self.image_dir = image_dir.into();
        self
    }

    /// Sets the worker count.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets connect and read timeouts in seconds.
    #[must_use]
    pub fn with_timeouts(mut self, connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        self.connect_timeout_secs = connect_timeout_secs;
        self.read_timeout_secs = read_timeout_secs;
        self
    }

    /// Sets the User-Agent header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Checks every field against its supported range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.parsed_base_url()?;
        if self.product_marker.is_empty() {
            return Err(ConfigError::EmptyMarker);
        }
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&self.concurrency) {
            return Err(ConfigError::InvalidConcurrency {
                value: self.concurrency,
            });
        }
        validate_timeout("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout("read_timeout_secs", self.read_timeout_secs)?;
        Ok(())
    }

    /// Parses the base URL, normalized to end with `/` so relative joins
    /// land under the site root rather than replacing its last segment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] or [`ConfigError::UnsupportedScheme`].
    pub fn parsed_base_url(&self) -> Result<Url, ConfigError> {
        let trimmed = self.base_url.trim();
        let mut url = Url::parse(trimmed).map_err(|source| ConfigError::InvalidBaseUrl {
            value: self.base_url.clone(),
            source,
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme {
                value: self.base_url.clone(),
            });
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }
}

fn validate_timeout(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if (1..=MAX_TIMEOUT_SECS).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidTimeout { field, value })
    }
}

/// Worker count matching the machine's available parallelism, clamped to range.
#[must_use]
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(MIN_CONCURRENCY)
        .clamp(MIN_CONCURRENCY, MAX_CONCURRENCY)
}
