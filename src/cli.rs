//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Download every product image listed in a catalog's sitemap.
///
/// Reads `{base-url}/sitemap.xml`, visits each product page, and saves its
/// image as `{reference}_{name}{ext}` in the output directory. Images already
/// on disk are skipped. Press Ctrl-C to stop after the links in flight.
#[derive(Parser, Debug)]
#[command(name = "catalog-scraper")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error log output
    #[arg(short, long)]
    pub quiet: bool,

    /// Site root whose sitemap is crawled
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Directory product images are written to
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Number of product links processed at once (1-64)
    #[arg(short = 'p', long, value_parser = clap::value_parser!(u8).range(1..=64))]
    pub processes: Option<u8>,

    /// Substring identifying product pages in the sitemap
    #[arg(long, value_name = "STR")]
    pub marker: Option<String>,

    /// Print progress as JSON lines instead of text
    #[arg(long)]
    pub json: bool,

    /// Ignore the config file
    #[arg(long)]
    pub no_config: bool,
}
