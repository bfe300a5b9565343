//! HTTP fetching for catalog pages, sitemaps, and images.
//!
//! [`HttpFetcher`] issues GET requests with the configured browser identity
//! and converts every non-2xx status into a [`FetchError`], so callers only
//! ever see successful responses.

mod client;
mod error;

pub use client::HttpFetcher;
pub use error::FetchError;
