//! Progress events and the channel that carries them to the caller.
//!
//! The pipeline reports through a [`ProgressSink`], invoked synchronously at
//! each step. [`progress_channel`] pairs a channel-backed sink with a
//! [`ProgressStream`] the caller drains at its own pace. The stream is
//! finite (it ends once the run drops its sender) and cannot be restarted.

use std::fmt;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::trace;

/// Position of a product link within the resolved link list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkPosition {
    /// 1-based position in discovery order.
    pub index: usize,
    /// Number of links in the run.
    pub total: usize,
}

impl fmt::Display for LinkPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.index, self.total)
    }
}

/// One step of a scrape run.
///
/// `Display` renders the user-facing progress line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Sitemap lookup is starting.
    FetchingLinks,
    /// Sitemap lookup finished; carries the resolver's summary.
    Summary {
        /// Resolver summary line.
        message: String,
    },
    /// The sitemap held no product links; the run stops.
    NoLinks,
    /// Cancellation was observed; remaining links are skipped.
    Terminated,
    /// A product page is about to be fetched.
    Scraping {
        /// Link position.
        link: LinkPosition,
        /// Absolute product page URL.
        url: String,
    },
    /// The product page failed or held no usable image.
    DetailsFailed {
        /// Link position.
        link: LinkPosition,
        /// Absolute product page URL.
        url: String,
        /// Diagnostic text.
        error: String,
    },
    /// The page lacked the data needed to download.
    DetailsMissing {
        /// Link position.
        link: LinkPosition,
        /// Absolute product page URL.
        url: String,
    },
    /// An image download is starting.
    Downloading {
        /// Link position.
        link: LinkPosition,
        /// Product name.
        name: String,
    },
    /// The image was written to disk.
    ImageSaved {
        /// Link position.
        link: LinkPosition,
        /// Image path.
        path: PathBuf,
    },
    /// The image was already on disk; nothing was fetched.
    ImageExists {
        /// Link position.
        link: LinkPosition,
        /// Image path.
        path: PathBuf,
    },
    /// The image could not be saved.
    DownloadFailed {
        /// Link position.
        link: LinkPosition,
        /// Product name.
        name: String,
    },
}

impl ProgressEvent {
    /// Returns the link this event belongs to, if any.
    #[must_use]
    pub fn link(&self) -> Option<LinkPosition> {
        match self {
            Self::Scraping { link, .. }
            | Self::DetailsFailed { link, .. }
            | Self::DetailsMissing { link, .. }
            | Self::Downloading { link, .. }
            | Self::ImageSaved { link, .. }
            | Self::ImageExists { link, .. }
            | Self::DownloadFailed { link, .. } => Some(*link),
            Self::FetchingLinks | Self::Summary { .. } | Self::NoLinks | Self::Terminated => None,
        }
    }

    /// Whether this is the last event emitted for its link.
    #[must_use]
    pub fn finishes_link(&self) -> bool {
        matches!(
            self,
            Self::DetailsFailed { .. }
                | Self::DetailsMissing { .. }
                | Self::ImageSaved { .. }
                | Self::ImageExists { .. }
                | Self::DownloadFailed { .. }
        )
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchingLinks => f.write_str("Fetching product links..."),
            Self::Summary { message } => f.write_str(message),
            Self::NoLinks => f.write_str("No product links found. Exiting."),
            Self::Terminated => f.write_str("Scraper process terminated."),
            Self::Scraping { url, .. } => write!(f, "Scrapping {url}"),
            Self::DetailsFailed { url, error, .. } => {
                write!(f, "Could not get details for {url}: {error}")
            }
            Self::DetailsMissing { url, .. } => write!(f, "Could not get details for {url}"),
            Self::Downloading { name, .. } => write!(f, "Downloading image for {name}..."),
            Self::ImageSaved { path, .. } => write!(f, "Image saved to {}", path.display()),
            Self::ImageExists { path, .. } => {
                write!(f, "Image already exists: {}", path.display())
            }
            Self::DownloadFailed { name, .. } => write!(f, "Failed to download image for {name}"),
        }
    }
}

/// Receiver of progress events, called synchronously by the pipeline.
pub trait ProgressSink: Send + Sync {
    /// Records one event.
    fn emit(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn emit(&self, event: ProgressEvent) {
        self(event);
    }
}

/// Channel-backed sink paired with a [`ProgressStream`].
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ProgressSink for ProgressSender {
    fn emit(&self, event: ProgressEvent) {
        if self.tx.send(event).is_err() {
            trace!("progress receiver dropped; event discarded");
        }
    }
}

/// Finite stream of progress events for one run.
#[derive(Debug)]
pub struct ProgressStream {
    rx: mpsc::UnboundedReceiver<ProgressEvent>,
}

impl ProgressStream {
    /// Waits for the next event; `None` once the run has finished.
    pub async fn next_event(&mut self) -> Option<ProgressEvent> {
        self.rx.recv().await
    }
}

impl Stream for ProgressStream {
    type Item = ProgressEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// Creates a connected sink/stream pair.
#[must_use]
pub fn progress_channel() -> (ProgressSender, ProgressStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ProgressSender { tx }, ProgressStream { rx })
}
