//! Single-run session: at most one scrape in flight per session.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::PipelineError;
use super::orchestrator::{PipelineContext, RunOutcome, run_pipeline};
use super::progress::{ProgressStream, progress_channel};

/// Errors raised by [`ScrapeSession`] and [`RunHandle`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// A run is already in progress on this session.
    #[error("scraping is already in progress")]
    AlreadyRunning,

    /// The run itself failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// The run task panicked or was aborted.
    #[error("scrape task failed: {0}")]
    Join(#[from] JoinError),
}

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No run in progress; [`ScrapeSession::start`] will succeed.
    Idle,
    /// A run is in progress.
    Running,
}

/// Guards a session so only one run executes at a time.
///
/// Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct ScrapeSession {
    running: Arc<AtomicBool>,
}

/// Resets the session to idle when the run task ends, however it ends.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
        debug!("session idle");
    }
}

impl ScrapeSession {
    /// Creates an idle session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.running.load(Ordering::Acquire) {
            SessionState::Running
        } else {
            SessionState::Idle
        }
    }

    /// Starts a run on the tokio runtime and returns its handle.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::AlreadyRunning`] if a run is in progress; the
    /// running one is not disturbed.
    pub fn start(&self, ctx: PipelineContext) -> Result<RunHandle, SessionError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SessionError::AlreadyRunning);
        }

        let guard = RunningGuard(Arc::clone(&self.running));
        let (sender, progress) = progress_channel();
        let cancel = CancellationToken::new();
        let run_cancel = cancel.clone();

        info!("starting scrape run");
        let task = tokio::spawn(async move {
            let _guard = guard;
            run_pipeline(&ctx, &sender, &run_cancel).await
        });

        Ok(RunHandle {
            progress,
            cancel,
            task,
        })
    }
}

/// Handle to a running scrape.
///
/// The progress stream ends once the run finishes and every event has been
/// read.
#[derive(Debug)]
pub struct RunHandle {
    progress: ProgressStream,
    cancel: CancellationToken,
    task: JoinHandle<Result<RunOutcome, PipelineError>>,
}

impl RunHandle {
    /// Progress events, in emission order.
    pub fn progress_mut(&mut self) -> &mut ProgressStream {
        &mut self.progress
    }

    /// Requests cooperative cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this run; clone it into signal handlers.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Splits the handle so progress can be drained while awaiting the run.
    #[must_use]
    pub fn into_parts(self) -> (ProgressStream, RunTask) {
        (
            self.progress,
            RunTask {
                cancel: self.cancel,
                task: self.task,
            },
        )
    }

    /// Waits for the run to end.
    ///
    /// Unread progress events are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Pipeline`] if the run failed, or
    /// [`SessionError::Join`] if its task panicked.
    pub async fn join(self) -> Result<RunOutcome, SessionError> {
        Ok(self.task.await??)
    }
}

/// The run half of a [`RunHandle`] after [`RunHandle::into_parts`].
#[derive(Debug)]
pub struct RunTask {
    cancel: CancellationToken,
    task: JoinHandle<Result<RunOutcome, PipelineError>>,
}

impl RunTask {
    /// Requests cooperative cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits for the run to end.
    ///
    /// # Errors
    ///
    /// Same as [`RunHandle::join`].
    pub async fn join(self) -> Result<RunOutcome, SessionError> {
        Ok(self.task.await??)
    }
}
