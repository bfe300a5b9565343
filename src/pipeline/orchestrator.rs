//! The scrape run: sitemap once, then extract + download per product link.

use std::path::{Path, PathBuf};

use futures_util::{StreamExt, stream};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use url::Url;

use super::PipelineError;
use super::progress::{LinkPosition, ProgressEvent, ProgressSink};
use crate::config::ScraperConfig;
use crate::download::{DownloadOutcome, ImageDownloader};
use crate::extract::{ExtractionRules, ProductExtractor};
use crate::fetch::HttpFetcher;
use crate::sitemap::SitemapResolver;

/// Everything a run needs, built once from a [`ScraperConfig`].
#[derive(Debug, Clone)]
pub struct PipelineContext {
    resolver: SitemapResolver,
    extractor: ProductExtractor,
    downloader: ImageDownloader,
    base_url: Url,
    image_dir: PathBuf,
    concurrency: usize,
}

impl PipelineContext {
    /// Validates `config` and wires the pipeline stages around one HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] for invalid config, an HTTP client that
    /// cannot be built, or extraction rules that do not compile.
    pub fn from_config(config: &ScraperConfig) -> Result<Self, PipelineError> {
        Self::with_rules(config, &ExtractionRules::default())
    }

    /// Like [`from_config`](Self::from_config) with custom extraction rules.
    ///
    /// # Errors
    ///
    /// Same as [`from_config`](Self::from_config).
    pub fn with_rules(
        config: &ScraperConfig,
        rules: &ExtractionRules,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        let base_url = config.parsed_base_url()?;
        let fetcher = HttpFetcher::new(config)?;

        Ok(Self {
            resolver: SitemapResolver::new(fetcher.clone(), config.product_marker.clone()),
            extractor: ProductExtractor::new(fetcher.clone(), base_url.clone(), rules)?,
            downloader: ImageDownloader::new(fetcher),
            base_url,
            image_dir: config.image_dir.clone(),
            concurrency: config.concurrency,
        })
    }

    /// Directory images are written to.
    #[must_use]
    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    /// Maximum number of links processed at once.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }
}

/// Per-run counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunStats {
    processed: usize,
    saved: usize,
    skipped: usize,
    download_failed: usize,
    details_failed: usize,
}

impl RunStats {
    /// Links whose work ran to completion.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Images written to disk.
    #[must_use]
    pub fn saved(&self) -> usize {
        self.saved
    }

    /// Images already present and left untouched.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Image downloads that failed.
    #[must_use]
    pub fn download_failed(&self) -> usize {
        self.download_failed
    }

    /// Links whose details could not be obtained.
    #[must_use]
    pub fn details_failed(&self) -> usize {
        self.details_failed
    }

    fn record(&mut self, outcome: LinkOutcome) {
        let counter = match outcome {
            LinkOutcome::Saved => &mut self.saved,
            LinkOutcome::Skipped => &mut self.skipped,
            LinkOutcome::DownloadFailed => &mut self.download_failed,
            LinkOutcome::DetailsFailed => &mut self.details_failed,
            LinkOutcome::Cancelled => return,
        };
        *counter += 1;
        self.processed += 1;
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every link was processed.
    Completed(RunStats),
    /// Cancellation stopped the run before all links were processed.
    Cancelled(RunStats),
    /// The sitemap yielded no product links; nothing was done.
    NoLinks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkOutcome {
    Saved,
    Skipped,
    DownloadFailed,
    DetailsFailed,
    Cancelled,
}

/// Runs the pipeline to completion, cancellation, or an empty sitemap.
///
/// Links are processed through an ordered window of
/// [`PipelineContext::concurrency`] in-flight items; results are consumed in
/// discovery order. `cancel` is checked before each link starts, and work
/// already in flight is allowed to finish. Per-link failures are reported
/// through `sink` and never end the run.
///
/// # Errors
///
/// Returns [`PipelineError::CreateOutputDir`] if the image directory cannot
/// be created.
#[instrument(skip_all, fields(base_url = %ctx.base_url, concurrency = ctx.concurrency))]
pub async fn run_pipeline(
    ctx: &PipelineContext,
    sink: &dyn ProgressSink,
    cancel: &CancellationToken,
) -> Result<RunOutcome, PipelineError> {
    info!("scraper started");
    sink.emit(ProgressEvent::FetchingLinks);

    let resolution = ctx.resolver.resolve(ctx.base_url.as_str()).await;
    sink.emit(ProgressEvent::Summary {
        message: resolution.message.clone(),
    });

    if resolution.links.is_empty() {
        warn!("no product links found");
        sink.emit(ProgressEvent::NoLinks);
        return Ok(RunOutcome::NoLinks);
    }

    ensure_output_dir(&ctx.image_dir).await?;

    let total = resolution.links.len();
    let mut stats = RunStats::default();
    let mut outcomes = stream::iter(resolution.links.into_iter().enumerate())
        .map(move |(i, link)| {
            let position = LinkPosition {
                index: i + 1,
                total,
            };
            async move { process_link(ctx, sink, cancel, position, &link).await }
        })
        .buffered(ctx.concurrency.max(1));

    while let Some(outcome) = outcomes.next().await {
        // Links start in order, so once one sees the token every later one does too.
        if outcome == LinkOutcome::Cancelled {
            info!(processed = stats.processed(), "scraper stopped by user");
            sink.emit(ProgressEvent::Terminated);
            return Ok(RunOutcome::Cancelled(stats));
        }
        stats.record(outcome);
    }

    info!(
        processed = stats.processed(),
        saved = stats.saved(),
        skipped = stats.skipped(),
        "scraping finished"
    );
    Ok(RunOutcome::Completed(stats))
}

async fn ensure_output_dir(dir: &Path) -> Result<(), PipelineError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| PipelineError::CreateOutputDir {
            path: dir.to_path_buf(),
            source,
        })
}

async fn process_link(
    ctx: &PipelineContext,
    sink: &dyn ProgressSink,
    cancel: &CancellationToken,
    link: LinkPosition,
    raw_url: &str,
) -> LinkOutcome {
    if cancel.is_cancelled() {
        return LinkOutcome::Cancelled;
    }

    let url = match ctx.base_url.join(raw_url) {
        Ok(url) => url,
        Err(error) => {
            warn!(url = raw_url, %error, "invalid product URL");
            sink.emit(ProgressEvent::DetailsFailed {
                link,
                url: raw_url.to_string(),
                error: format!("invalid product URL: {error}"),
            });
            return LinkOutcome::DetailsFailed;
        }
    };

    info!(url = %url, "processing product page");
    sink.emit(ProgressEvent::Scraping {
        link,
        url: url.to_string(),
    });

    let details = ctx.extractor.extract(&url).await;

    if let Some(error) = details.error {
        warn!(url = %url, %error, "could not get details");
        sink.emit(ProgressEvent::DetailsFailed {
            link,
            url: url.to_string(),
            error,
        });
        return LinkOutcome::DetailsFailed;
    }

    let (Some(name), Some(image_url)) = (details.name, details.image_url) else {
        warn!(url = %url, "could not get details");
        sink.emit(ProgressEvent::DetailsMissing {
            link,
            url: url.to_string(),
        });
        return LinkOutcome::DetailsFailed;
    };

    info!(name = %name, "downloading image");
    sink.emit(ProgressEvent::Downloading {
        link,
        name: name.clone(),
    });

    match ctx
        .downloader
        .download(
            &image_url,
            &ctx.image_dir,
            &name,
            details.reference.as_deref(),
        )
        .await
    {
        DownloadOutcome::Saved(path) => {
            sink.emit(ProgressEvent::ImageSaved { link, path });
            LinkOutcome::Saved
        }
        DownloadOutcome::AlreadyExists(path) => {
            sink.emit(ProgressEvent::ImageExists { link, path });
            LinkOutcome::Skipped
        }
        DownloadOutcome::Failed(error) => {
            warn!(name = %name, %error, "failed to download image");
            sink.emit(ProgressEvent::DownloadFailed { link, name });
            LinkOutcome::DownloadFailed
        }
    }
}
