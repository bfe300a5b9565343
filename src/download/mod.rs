//! Product image downloads.
//!
//! [`ImageDownloader`] streams an image to `{reference}_{name}{ext}` inside
//! the run's image directory and skips the request entirely when that file
//! already exists.
//!
//! # Example
//!
//! ```no_run
//! use catalog_scraper_core::download::{DownloadOutcome, ImageDownloader};
//! use catalog_scraper_core::{HttpFetcher, ScraperConfig};
//! use std::path::Path;
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = ImageDownloader::new(HttpFetcher::new(&ScraperConfig::default())?);
//! let url = Url::parse("https://www.agidra.com/img/p/1234.jpg")?;
//! match downloader.download(&url, Path::new("product_images"), "Widget", Some("W-1")).await {
//!     DownloadOutcome::Saved(path) => println!("saved {}", path.display()),
//!     DownloadOutcome::AlreadyExists(path) => println!("kept {}", path.display()),
//!     DownloadOutcome::Failed(error) => eprintln!("{error}"),
//! }
//! # Ok(())
//! # }
//! ```

mod downloader;
mod error;
mod filename;

pub use downloader::{CHUNK_SIZE, DownloadOutcome, ImageDownloader};
pub use error::DownloadError;
pub use filename::{
    MISSING_REFERENCE, build_image_filename, extension_from_image_url, sanitize_product_name,
};
