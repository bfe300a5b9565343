//! Run orchestration: context wiring, the per-link pipeline, progress
//! reporting, and the single-run session guard.

mod orchestrator;
mod progress;
mod session;

pub use orchestrator::{PipelineContext, RunOutcome, RunStats, run_pipeline};
pub use progress::{
    LinkPosition, ProgressEvent, ProgressSender, ProgressSink, ProgressStream, progress_channel,
};
pub use session::{RunHandle, RunTask, ScrapeSession, SessionError, SessionState};

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::extract::ExtractError;
use crate::fetch::FetchError;

/// Errors that stop a run from starting or finishing.
///
/// Per-link failures are not errors at this level; they surface as
/// [`ProgressEvent`]s.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Extraction rules do not compile.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// The image directory could not be created.
    #[error("failed to create image directory {path}: {source}", path = path.display())]
    CreateOutputDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
