//! Data models module
//!
//! Contains timing results, per-workload reports and run outcomes.

pub mod report;

// Re-export commonly used types
pub use report::{speedup, BenchmarkRun, RunOutcome, TimedResult, WorkloadReport};
