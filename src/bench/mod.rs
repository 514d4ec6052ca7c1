//! Benchmark engine module
//!
//! Contains the workload catalog, worker pools, timing, the runner
//! state machine and background execution with progress reporting.

pub mod cancel;
pub mod pool;
pub mod reporter;
pub mod runner;
pub mod task;
pub mod timer;
pub mod workloads;

// Re-export commonly used types
pub use cancel::CancellationToken;
pub use pool::{PoolKind, WorkerPool};
pub use reporter::{ChannelReporter, ProgressReporter, RecordingReporter, RunMessage};
pub use runner::{BenchmarkRunner, RunState};
pub use task::BackgroundTask;
pub use timer::{measure, try_measure};
pub use workloads::{Workload, WorkloadCatalog};
