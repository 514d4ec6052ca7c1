//! Benchmark report data models
//!
//! Contains the per-workload timing report, the completed run summary
//! and the terminal outcome handed to progress reporters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::util::units::{format_duration, format_seconds, format_speedup};
use crate::Result;

/// A duration paired with the value of the timed computation
#[derive(Debug, Clone, PartialEq)]
pub struct TimedResult<R> {
    /// Wall-clock time spent in the computation
    pub elapsed: Duration,
    /// Value returned by the computation
    pub value: R,
}

impl<R> TimedResult<R> {
    /// Elapsed time in seconds
    pub fn seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Ratio of sequential to parallel duration, 0 when the parallel path took no time
pub fn speedup(sequential_secs: f64, parallel_secs: f64) -> f64 {
    if parallel_secs > 0.0 {
        sequential_secs / parallel_secs
    } else {
        0.0
    }
}

/// Timing comparison for one workload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadReport {
    /// Workload name
    pub name: String,
    /// Sequential path duration in seconds
    pub sequential_duration: f64,
    /// Parallel path duration in seconds
    pub parallel_duration: f64,
    /// sequential_duration / parallel_duration
    pub speedup: f64,
}

impl WorkloadReport {
    /// Build a report from the two measured durations
    pub fn new(name: impl Into<String>, sequential: Duration, parallel: Duration) -> Self {
        let sequential_duration = sequential.as_secs_f64();
        let parallel_duration = parallel.as_secs_f64();
        Self {
            name: name.into(),
            sequential_duration,
            parallel_duration,
            speedup: speedup(sequential_duration, parallel_duration),
        }
    }

    /// Render as a numbered text block
    pub fn render(&self, position: usize) -> String {
        format!(
            "{}. {}:\n   Sequential: {}\n   Parallel: {}\n   Speedup: {}",
            position,
            self.name,
            format_seconds(self.sequential_duration),
            format_seconds(self.parallel_duration),
            format_speedup(self.speedup)
        )
    }
}

/// A completed benchmark run: every workload report in catalog order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRun {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// One report per workload, in catalog order
    pub reports: Vec<WorkloadReport>,
    /// Wall-clock time of the whole run
    #[serde(with = "duration_serde")]
    pub total_elapsed: Duration,
}

impl BenchmarkRun {
    /// Human-readable summary, one block per workload
    pub fn render(&self) -> String {
        self.reports
            .iter()
            .enumerate()
            .map(|(i, report)| report.render(i + 1))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// One-line header for the run
    pub fn headline(&self) -> String {
        format!(
            "{} - {} workloads in {}",
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.reports.len(),
            format_duration(self.total_elapsed)
        )
    }

    /// Structured summary as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Terminal outcome of a benchmark run
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// All workloads completed
    Succeeded(BenchmarkRun),
    /// The first error encountered, no partial reports
    Failed(String),
    /// The run was cancelled before completion
    Cancelled,
}

impl RunOutcome {
    /// Whether every workload completed
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Succeeded(_))
    }
}

/// Custom serialization for Duration
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Ok(Duration::from_secs_f64(secs.max(0.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_run() -> BenchmarkRun {
        BenchmarkRun {
            started_at: Utc::now(),
            reports: vec![
                WorkloadReport::new("Circle areas", Duration::from_millis(30), Duration::from_millis(10)),
                WorkloadReport::new("Email generation", Duration::from_millis(5), Duration::ZERO),
            ],
            total_elapsed: Duration::from_millis(45),
        }
    }

    #[test]
    fn test_speedup_formula() {
        assert_eq!(speedup(2.0, 0.5), 4.0);
        assert_eq!(speedup(0.0, 1.0), 0.0);
        assert_eq!(speedup(3.0, 0.0), 0.0);
    }

    #[test]
    fn test_workload_report_speedup() {
        let report = WorkloadReport::new("x", Duration::from_millis(30), Duration::from_millis(10));
        assert!((report.speedup - 3.0).abs() < 1e-9);

        let zero = WorkloadReport::new("x", Duration::from_millis(30), Duration::ZERO);
        assert_eq!(zero.speedup, 0.0);
        assert_eq!(zero.parallel_duration, 0.0);
    }

    #[test]
    fn test_render_layout() {
        let text = sample_run().render();
        let blocks: Vec<&str> = text.split("\n\n").collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].starts_with("1. Circle areas:\n   Sequential: 0.030000s"));
        assert!(blocks[0].ends_with("Speedup: 3.00x"));
        assert!(blocks[1].starts_with("2. Email generation:"));
        assert!(blocks[1].ends_with("Speedup: 0.00x"));
    }

    #[test]
    fn test_json_summary() {
        let run = sample_run();
        let json = run.to_json().unwrap();
        let back: BenchmarkRun = serde_json::from_str(&json).unwrap();
        assert_eq!(back.reports, run.reports);
        assert!(json.contains("\"speedup\""));
    }

    #[test]
    fn test_outcome_success() {
        assert!(RunOutcome::Succeeded(sample_run()).is_success());
        assert!(!RunOutcome::Failed("boom".to_string()).is_success());
        assert!(!RunOutcome::Cancelled.is_success());
    }
}
