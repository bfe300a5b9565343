//! Image downloader with name-based deduplication.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::error::DownloadError;
use super::filename::build_image_filename;
use crate::fetch::{FetchError, HttpFetcher};

/// Write buffer size; the body reaches disk in chunks of this size.
pub const CHUNK_SIZE: usize = 8 * 1024;

const PART_SUFFIX: &str = ".part";

/// Result of one image download.
#[derive(Debug)]
pub enum DownloadOutcome {
    /// The image was fetched and written to this path.
    Saved(PathBuf),
    /// A file with the computed name already existed; nothing was fetched.
    AlreadyExists(PathBuf),
    /// The image could not be saved.
    Failed(DownloadError),
}

impl DownloadOutcome {
    /// Returns the image path for saved or already-present images.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Saved(path) | Self::AlreadyExists(path) => Some(path),
            Self::Failed(_) => None,
        }
    }

    /// Consumes the outcome, returning the image path when one exists.
    #[must_use]
    pub fn into_path(self) -> Option<PathBuf> {
        match self {
            Self::Saved(path) | Self::AlreadyExists(path) => Some(path),
            Self::Failed(_) => None,
        }
    }
}

/// Streams product images to disk under deterministic names.
///
/// Clones share one lock table, so workers that compute the same target
/// path take turns: the second one finds the finished file and skips.
#[derive(Debug, Clone)]
pub struct ImageDownloader {
    fetcher: HttpFetcher,
    path_locks: Arc<DashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl ImageDownloader {
    /// Creates a downloader using `fetcher` for image requests.
    #[must_use]
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self {
            fetcher,
            path_locks: Arc::new(DashMap::new()),
        }
    }

    /// Downloads `image_url` into `target_dir`, named from the product.
    ///
    /// Returns [`DownloadOutcome::AlreadyExists`] without any request when a
    /// file with the computed name is already present.
    #[instrument(skip(self, target_dir), fields(url = %image_url))]
    pub async fn download(
        &self,
        image_url: &Url,
        target_dir: &Path,
        product_name: &str,
        product_ref: Option<&str>,
    ) -> DownloadOutcome {
        let file_name = build_image_filename(image_url, product_name, product_ref);
        let path = target_dir.join(&file_name);

        let lock = self.lock_for(&path);
        let outcome = {
            let _guard = lock.lock().await;
            self.download_locked(image_url, target_dir, &file_name, path.clone())
                .await
        };
        drop(lock);
        self.path_locks
            .remove_if(&path, |_, lock| Arc::strong_count(lock) == 1);

        outcome
    }

    async fn download_locked(
        &self,
        image_url: &Url,
        target_dir: &Path,
        file_name: &str,
        path: PathBuf,
    ) -> DownloadOutcome {
        match tokio::fs::try_exists(&path).await {
            Ok(true) => {
                debug!(path = %path.display(), "image already exists");
                return DownloadOutcome::AlreadyExists(path);
            }
            Ok(false) => {}
            Err(error) => {
                warn!(path = %path.display(), %error, "could not check for existing image");
            }
        }

        let part_path = target_dir.join(format!("{file_name}{PART_SUFFIX}"));
        match self.fetch_to_path(image_url, &part_path, &path).await {
            Ok(bytes) => {
                info!(path = %path.display(), bytes, "image saved");
                DownloadOutcome::Saved(path)
            }
            Err(error) => {
                warn!(%error, "error downloading image");
                DownloadOutcome::Failed(error)
            }
        }
    }

    /// Streams the body into `part_path`, then renames it to `path`.
    ///
    /// The part file is removed on any failure, so `path` only ever holds a
    /// complete image.
    async fn fetch_to_path(
        &self,
        image_url: &Url,
        part_path: &Path,
        path: &Path,
    ) -> Result<u64, DownloadError> {
        let response = self.fetcher.get(image_url.as_str()).await?;

        let file = File::create(part_path)
            .await
            .map_err(|e| DownloadError::io(part_path, e))?;

        let written = match stream_to_file(file, response, image_url, part_path).await {
            Ok(written) => written,
            Err(error) => {
                debug!(path = %part_path.display(), "cleaning up partial file after error");
                let _ = tokio::fs::remove_file(part_path).await;
                return Err(error);
            }
        };

        if let Err(e) = tokio::fs::rename(part_path, path).await {
            let _ = tokio::fs::remove_file(part_path).await;
            return Err(DownloadError::io(path, e));
        }

        Ok(written)
    }

    fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        Arc::clone(self.path_locks.entry(path.to_path_buf()).or_default().value())
    }
}

async fn stream_to_file(
    file: File,
    response: reqwest::Response,
    url: &Url,
    path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| FetchError::from_request(url.as_str(), e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(path, e))?;

        bytes_written += chunk.len() as u64;
    }

    writer.flush().await.map_err(|e| DownloadError::io(path, e))?;

    Ok(bytes_written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_paths() {
        let saved = DownloadOutcome::Saved(PathBuf::from("a.jpg"));
        let existing = DownloadOutcome::AlreadyExists(PathBuf::from("b.jpg"));
        let failed = DownloadOutcome::Failed(DownloadError::io(
            "c.jpg",
            std::io::Error::other("disk full"),
        ));

        assert_eq!(saved.path(), Some(Path::new("a.jpg")));
        assert_eq!(existing.into_path(), Some(PathBuf::from("b.jpg")));
        assert!(failed.path().is_none());
    }
}
