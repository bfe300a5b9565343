//! Catalog Scraper Core Library
//!
//! This library crawls a single e-commerce catalog: it reads the site's
//! sitemap, visits every product page, extracts the product name, reference
//! code and image location, and saves each image under a deterministic name.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - Run settings and their validation
//! - [`fetch`] - HTTP client with a fixed browser identity
//! - [`sitemap`] - Product link discovery from `sitemap.xml`
//! - [`extract`] - Product detail extraction from page markup
//! - [`download`] - Streaming image downloads with name-based deduplication
//! - [`pipeline`] - Run orchestration, progress events, and the session guard
//!
//! # Example
//!
//! ```no_run
//! use catalog_scraper_core::{PipelineContext, ScrapeSession, ScraperConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = PipelineContext::from_config(&ScraperConfig::default())?;
//! let mut handle = ScrapeSession::new().start(ctx)?;
//! while let Some(event) = handle.progress_mut().next_event().await {
//!     println!("{event}");
//! }
//! let outcome = handle.join().await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod download;
pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod sitemap;
mod user_agent;

// Re-export commonly used types
pub use config::{ConfigError, ScraperConfig};
pub use download::{DownloadError, DownloadOutcome, ImageDownloader};
pub use extract::{ExtractError, ExtractionRules, ProductDetails, ProductExtractor};
pub use fetch::{FetchError, HttpFetcher};
pub use pipeline::{
    LinkPosition, PipelineContext, PipelineError, ProgressEvent, ProgressSink, ProgressStream,
    RunHandle, RunOutcome, RunStats, ScrapeSession, SessionError, SessionState, run_pipeline,
};
pub use sitemap::{SitemapError, SitemapResolution, SitemapResolver};
pub use user_agent::BROWSER_USER_AGENT;
