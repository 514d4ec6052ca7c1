//! Utility functions module
//!
//! Contains helper functions for formatting timings and ratios.

pub mod units;

// Re-export commonly used functions
pub use units::{format_duration, format_seconds, format_speedup};
