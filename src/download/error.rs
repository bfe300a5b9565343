//! Error types for the download module.

use std::path::PathBuf;

use thiserror::Error;

use crate::fetch::FetchError;

/// Errors that can occur while saving a product image.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The image request failed (network, timeout, non-2xx).
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// File system error while writing the image.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// No `From<std::io::Error>`: the variant needs the path, which the source
// error does not carry. Use `DownloadError::io` at the call site.
