//! Benchmark runner
//!
//! Runs every workload of a catalog in order: times the sequential path,
//! lets the parallel path time itself, records the speedup and reports
//! progress. The first error aborts the run.

use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn};

use crate::bench::cancel::CancellationToken;
use crate::bench::reporter::ProgressReporter;
use crate::bench::timer::try_measure;
use crate::bench::workloads::WorkloadCatalog;
use crate::config::HarnessConfig;
use crate::error::panic_message;
use crate::models::{BenchmarkRun, RunOutcome, WorkloadReport};
use crate::{ParbenchError, Result};

/// Lifecycle of a runner. Terminal states never go back to `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl RunState {
    /// Whether the run has finished one way or another
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Succeeded | RunState::Failed | RunState::Cancelled)
    }
}

/// Progress percentage after workload `index` (1-based) of `total`.
/// Catalogs of 100 or more workloads repeat values; the runner skips those.
pub fn checkpoint(index: usize, total: usize) -> u8 {
    (index * 100 / (total + 1)).min(100) as u8
}

/// Single-use orchestrator of one benchmark run
pub struct BenchmarkRunner {
    catalog: WorkloadCatalog,
    cancel: CancellationToken,
    state: RunState,
}

impl BenchmarkRunner {
    /// Runner over an explicit catalog, in `Pending` state
    pub fn new(catalog: WorkloadCatalog) -> Self {
        Self {
            catalog,
            cancel: CancellationToken::new(),
            state: RunState::Pending,
        }
    }

    /// Runner over the standard catalog built from `config`
    pub fn from_config(config: &HarnessConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(WorkloadCatalog::standard(config)))
    }

    /// Use an externally owned cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels this run when triggered
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Current lifecycle state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Execute the run, delivering progress and exactly one outcome to `reporter`
    pub fn run(&mut self, reporter: &dyn ProgressReporter) -> RunOutcome {
        if self.state != RunState::Pending {
            let outcome = RunOutcome::Failed("benchmark runner already used".to_string());
            reporter.on_complete(outcome.clone());
            return outcome;
        }

        self.state = RunState::Running;
        info!(workloads = self.catalog.len(), "benchmark started");

        let outcome = match self.execute(reporter) {
            Ok(run) => {
                info!(elapsed = ?run.total_elapsed, "benchmark succeeded");
                self.state = RunState::Succeeded;
                RunOutcome::Succeeded(run)
            }
            Err(ParbenchError::Cancelled) => {
                warn!("benchmark cancelled");
                self.state = RunState::Cancelled;
                RunOutcome::Cancelled
            }
            Err(ParbenchError::RunAborted(msg)) => {
                warn!(error = %msg, "benchmark aborted");
                self.state = RunState::Failed;
                RunOutcome::Failed(msg)
            }
            Err(e) => {
                warn!(error = %e, "benchmark aborted");
                self.state = RunState::Failed;
                RunOutcome::Failed(e.to_string())
            }
        };

        reporter.on_complete(outcome.clone());
        outcome
    }

    fn execute(&self, reporter: &dyn ProgressReporter) -> Result<BenchmarkRun> {
        let started_at = Utc::now();
        let start = Instant::now();
        let total = self.catalog.len();
        let mut reports = Vec::with_capacity(total);
        let mut reported = 0u8;

        for (i, workload) in self.catalog.iter().enumerate() {
            let name = workload.name();

            self.cancel.check()?;
            let sequential = guarded(name, || try_measure(|| workload.run_sequential()))?;

            self.cancel.check()?;
            let parallel = guarded(name, || workload.run_parallel(&self.cancel))?;

            let report = WorkloadReport::new(name, sequential.elapsed, parallel);
            info!(
                workload = name,
                sequential = report.sequential_duration,
                parallel = report.parallel_duration,
                speedup = report.speedup,
                "workload finished"
            );
            reports.push(report);

            let percent = checkpoint(i + 1, total);
            if percent > reported {
                reporter.on_progress(percent);
                reported = percent;
            }
        }

        reporter.on_progress(100);

        Ok(BenchmarkRun {
            started_at,
            reports,
            total_elapsed: start.elapsed(),
        })
    }
}

/// Run one workload phase, turning errors and panics into `RunAborted`
fn guarded<R, F>(name: &str, f: F) -> Result<R>
where
    F: FnOnce() -> Result<R>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(ParbenchError::Cancelled)) => Err(ParbenchError::Cancelled),
        Ok(Err(e)) => Err(ParbenchError::RunAborted(format!("{}: {}", name, e))),
        Err(payload) => Err(ParbenchError::RunAborted(format!(
            "{}: {}",
            name,
            ParbenchError::Worker(format!("panicked: {}", panic_message(payload.as_ref())))
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::reporter::{RecordingReporter, RunMessage};
    use crate::bench::workloads::Workload;
    use std::time::Duration;

    /// Workload with scripted behaviour
    struct Scripted {
        name: &'static str,
        fail_sequential: bool,
        fail_parallel: bool,
        panic_parallel: bool,
        cancel_on_sequential: Option<CancellationToken>,
        parallel_time: Duration,
    }

    impl Scripted {
        fn ok(name: &'static str) -> Self {
            Self {
                name,
                fail_sequential: false,
                fail_parallel: false,
                panic_parallel: false,
                cancel_on_sequential: None,
                parallel_time: Duration::from_millis(1),
            }
        }
    }

    impl Workload for Scripted {
        fn name(&self) -> &str {
            self.name
        }

        fn run_sequential(&self) -> Result<()> {
            if let Some(token) = &self.cancel_on_sequential {
                token.cancel();
            }
            if self.fail_sequential {
                return Err(ParbenchError::Parse {
                    token: "abc".to_string(),
                    position: 0,
                });
            }
            Ok(())
        }

        fn run_parallel(&self, _cancel: &CancellationToken) -> Result<Duration> {
            if self.panic_parallel {
                panic!("pool went away");
            }
            if self.fail_parallel {
                return Err(ParbenchError::Worker("injected failure".to_string()));
            }
            Ok(self.parallel_time)
        }
    }

    #[test]
    fn test_checkpoints() {
        assert_eq!(
            (1..=3).map(|i| checkpoint(i, 3)).collect::<Vec<_>>(),
            vec![25, 50, 75]
        );
        assert_eq!(checkpoint(1, 1), 50);
    }

    #[test]
    fn test_large_catalog_progress_strictly_increases() {
        let catalog = (0..150).fold(WorkloadCatalog::new(), |c, _| c.with(Scripted::ok("w")));
        let mut runner = BenchmarkRunner::new(catalog);
        let reporter = RecordingReporter::new();

        assert!(runner.run(&reporter).is_success());
        let progress = reporter.progress();
        assert!(progress.windows(2).all(|w| w[0] < w[1]), "{:?}", progress);
        assert!(progress.iter().all(|&p| p > 0));
        assert_eq!(progress.last(), Some(&100));
    }

    #[test]
    fn test_successful_run_reports_in_order() {
        let catalog = WorkloadCatalog::new()
            .with(Scripted::ok("a"))
            .with(Scripted::ok("b"))
            .with(Scripted::ok("c"));
        let mut runner = BenchmarkRunner::new(catalog);
        let reporter = RecordingReporter::new();

        assert_eq!(runner.state(), RunState::Pending);
        let outcome = runner.run(&reporter);
        assert_eq!(runner.state(), RunState::Succeeded);

        assert_eq!(reporter.progress(), vec![25, 50, 75, 100]);
        let events = reporter.events();
        assert!(matches!(events.last(), Some(RunMessage::Complete(RunOutcome::Succeeded(_)))));
        assert_eq!(reporter.outcomes().len(), 1);

        match outcome {
            RunOutcome::Succeeded(run) => {
                let names: Vec<&str> = run.reports.iter().map(|r| r.name.as_str()).collect();
                assert_eq!(names, vec!["a", "b", "c"]);
                for report in &run.reports {
                    assert_eq!(report.parallel_duration, 0.001);
                    assert!(report.speedup >= 0.0);
                }
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_parallel_time_gives_zero_speedup() {
        let mut workload = Scripted::ok("instant");
        workload.parallel_time = Duration::ZERO;
        let mut runner = BenchmarkRunner::new(WorkloadCatalog::new().with(workload));
        match runner.run(&RecordingReporter::new()) {
            RunOutcome::Succeeded(run) => assert_eq!(run.reports[0].speedup, 0.0),
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_parallel_failure_aborts_remaining_workloads() {
        let mut failing = Scripted::ok("b");
        failing.fail_parallel = true;
        let catalog = WorkloadCatalog::new()
            .with(Scripted::ok("a"))
            .with(failing)
            .with(Scripted::ok("c"));
        let mut runner = BenchmarkRunner::new(catalog);
        let reporter = RecordingReporter::new();

        let outcome = runner.run(&reporter);
        assert_eq!(runner.state(), RunState::Failed);
        assert_eq!(reporter.progress(), vec![25]);
        assert_eq!(reporter.outcomes(), vec![outcome.clone()]);
        match outcome {
            RunOutcome::Failed(msg) => {
                assert!(msg.starts_with("b: "));
                assert!(msg.contains("injected failure"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_sequential_parse_error_fails_first_workload() {
        let mut failing = Scripted::ok("a");
        failing.fail_sequential = true;
        let mut runner = BenchmarkRunner::new(WorkloadCatalog::new().with(failing));
        let reporter = RecordingReporter::new();

        let outcome = runner.run(&reporter);
        assert!(reporter.progress().is_empty());
        assert!(matches!(outcome, RunOutcome::Failed(msg) if msg.contains("Parse error")));
    }

    #[test]
    fn test_panic_in_workload_is_reported() {
        let mut panicking = Scripted::ok("a");
        panicking.panic_parallel = true;
        let mut runner = BenchmarkRunner::new(WorkloadCatalog::new().with(panicking));
        let reporter = RecordingReporter::new();

        let outcome = runner.run(&reporter);
        assert_eq!(reporter.outcomes().len(), 1);
        assert!(matches!(outcome, RunOutcome::Failed(msg) if msg.contains("pool went away")));
    }

    #[test]
    fn test_cancellation_between_phases() {
        let token = CancellationToken::new();
        let mut cancelling = Scripted::ok("a");
        cancelling.cancel_on_sequential = Some(token.clone());
        let catalog = WorkloadCatalog::new().with(cancelling).with(Scripted::ok("b"));
        let mut runner = BenchmarkRunner::new(catalog).with_cancellation(token);
        let reporter = RecordingReporter::new();

        let outcome = runner.run(&reporter);
        assert_eq!(outcome, RunOutcome::Cancelled);
        assert_eq!(runner.state(), RunState::Cancelled);
        assert!(reporter.progress().is_empty());
        assert_eq!(reporter.outcomes(), vec![RunOutcome::Cancelled]);
    }

    #[test]
    fn test_runner_is_single_use() {
        let mut runner = BenchmarkRunner::new(WorkloadCatalog::new().with(Scripted::ok("a")));
        runner.run(&RecordingReporter::new());

        let reporter = RecordingReporter::new();
        let second = runner.run(&reporter);
        assert!(matches!(second, RunOutcome::Failed(msg) if msg.contains("already used")));
        assert!(reporter.progress().is_empty());
        assert_eq!(runner.state(), RunState::Succeeded);
        assert!(runner.state().is_terminal());
    }

    #[test]
    fn test_standard_catalog_run() {
        let config = HarnessConfig::quick().with_seed(3).with_worker_threads(2);
        let mut runner = BenchmarkRunner::from_config(&config).unwrap();
        let reporter = RecordingReporter::new();

        let outcome = runner.run(&reporter);
        assert_eq!(reporter.progress(), vec![25, 50, 75, 100]);
        match outcome {
            RunOutcome::Succeeded(run) => {
                assert_eq!(run.reports.len(), 3);
                for report in &run.reports {
                    assert!(report.sequential_duration >= 0.0);
                    assert!(report.parallel_duration >= 0.0);
                }
                assert!(run.render().contains("3. Magnitude filter:"));
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let config = HarnessConfig::default().with_email_count(0);
        assert!(BenchmarkRunner::from_config(&config).is_err());
    }
}
