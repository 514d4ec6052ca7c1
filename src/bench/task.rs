//! Background execution of a benchmark run
//!
//! The runner is CPU-bound and blocks for seconds, so it runs on the
//! blocking pool of the tokio runtime while the caller keeps going and
//! observes progress through a reporter.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::bench::cancel::CancellationToken;
use crate::bench::reporter::{ChannelReporter, ProgressReporter, RunMessage};
use crate::bench::runner::BenchmarkRunner;
use crate::models::RunOutcome;
use crate::{ParbenchError, Result};

/// Handle to a benchmark running off the caller's context
pub struct BackgroundTask {
    handle: JoinHandle<RunOutcome>,
    cancel: CancellationToken,
}

impl BackgroundTask {
    /// Start `runner` in the background, reporting to `reporter`.
    /// Must be called from within a tokio runtime.
    pub fn spawn<R>(mut runner: BenchmarkRunner, reporter: R) -> Self
    where
        R: ProgressReporter + 'static,
    {
        let cancel = runner.cancellation_token();
        let handle = tokio::task::spawn_blocking(move || runner.run(&reporter));
        Self { handle, cancel }
    }

    /// Start `runner` in the background and stream its events over a channel
    pub fn spawn_with_channel(
        runner: BenchmarkRunner,
    ) -> (Self, mpsc::UnboundedReceiver<RunMessage>) {
        let (reporter, rx) = ChannelReporter::channel();
        (Self::spawn(runner, reporter), rx)
    }

    /// Request cancellation; the run stops at its next checkpoint
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the run has reached a terminal outcome
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the terminal outcome
    pub async fn join(self) -> Result<RunOutcome> {
        self.handle
            .await
            .map_err(|e| ParbenchError::Worker(format!("Benchmark task join failed: {}", e)))
    }
}
