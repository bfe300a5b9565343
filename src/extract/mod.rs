//! Product detail extraction from catalog pages.
//!
//! [`ProductExtractor`] fetches a product page and applies the
//! [`ExtractionRules`] to pull out the name, the reference code, and the best
//! available image URL.
//!
//! Two failure shapes are kept apart on purpose:
//! - a transport failure (network error, non-2xx) yields
//!   [`ProductDetails::transport_failure`]: every field absent, error set;
//! - a page without a usable image still carries its name and reference,
//!   with `error` set to [`IMAGE_NOT_FOUND`].

mod page;
mod rules;

pub use page::parse_reference;
pub use rules::ExtractionRules;

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::fetch::{FetchError, HttpFetcher};
use rules::CompiledRules;

/// Name used when a page has no product heading.
pub const UNKNOWN_PRODUCT: &str = "unknown_product";

/// Error text recorded when neither image source is present.
pub const IMAGE_NOT_FOUND: &str = "Image URL not found.";

/// Errors raised while setting up extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A rule selector is not valid CSS.
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector {
        /// The selector text.
        selector: String,
        /// Parser explanation.
        reason: String,
    },
}

/// Identifying data and image location for one product page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductDetails {
    /// Human-readable product name.
    pub name: Option<String>,
    /// Short reference code.
    pub reference: Option<String>,
    /// Absolute image URL.
    pub image_url: Option<Url>,
    /// Diagnostic text when extraction fell short.
    pub error: Option<String>,
}

impl ProductDetails {
    /// Details for a page that could not be fetched at all.
    #[must_use]
    pub fn transport_failure(error: &FetchError) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

/// Fetches product pages and extracts their details.
#[derive(Debug, Clone)]
pub struct ProductExtractor {
    fetcher: HttpFetcher,
    base_url: Url,
    rules: Arc<CompiledRules>,
}

impl ProductExtractor {
    /// Creates an extractor resolving image locations against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidSelector`] if a rule does not parse.
    pub fn new(
        fetcher: HttpFetcher,
        base_url: Url,
        rules: &ExtractionRules,
    ) -> Result<Self, ExtractError> {
        Ok(Self {
            fetcher,
            base_url,
            rules: Arc::new(CompiledRules::compile(rules)?),
        })
    }

    /// Fetches `product_url` and extracts its details.
    ///
    /// Never fails; problems are reported through [`ProductDetails::error`].
    #[instrument(skip(self), fields(url = %product_url))]
    pub async fn extract(&self, product_url: &Url) -> ProductDetails {
        let html = match self.fetcher.get_text(product_url.as_str()).await {
            Ok(html) => html,
            Err(error) => {
                warn!(%error, "error fetching product details");
                return ProductDetails::transport_failure(&error);
            }
        };

        let details = self.parse_page(&html, product_url);
        debug!(
            name = details.name.as_deref().unwrap_or_default(),
            reference = details.reference.as_deref().unwrap_or_default(),
            image = details.image_url.as_ref().map(Url::as_str).unwrap_or_default(),
            "extracted product details"
        );
        details
    }

    /// Extracts details from an already-fetched page.
    #[must_use]
    pub fn parse_page(&self, html: &str, page_url: &Url) -> ProductDetails {
        page::parse_product_page(html, &self.base_url, page_url, &self.rules)
    }
}
