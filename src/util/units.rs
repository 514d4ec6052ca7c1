//! Units formatting utilities
//!
//! Provides human-readable formatting of timings and speedup ratios.

use std::time::Duration;

/// Format seconds with microsecond precision
///
/// # Examples
/// ```
/// use parbench::util::units::format_seconds;
///
/// assert_eq!(format_seconds(0.5), "0.500000s");
/// assert_eq!(format_seconds(1.25), "1.250000s");
/// ```
pub fn format_seconds(secs: f64) -> String {
    format!("{:.6}s", secs)
}

/// Format a speedup ratio
///
/// # Examples
/// ```
/// use parbench::util::units::format_speedup;
///
/// assert_eq!(format_speedup(3.0), "3.00x");
/// assert_eq!(format_speedup(0.0), "0.00x");
/// ```
pub fn format_speedup(ratio: f64) -> String {
    format!("{:.2}x", ratio)
}

/// Format duration into human-readable string
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use parbench::util::units::format_duration;
///
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_millis(42)), "42ms");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if total_secs >= 60 {
        humantime::format_duration(Duration::from_secs(total_secs)).to_string()
    } else if total_secs > 0 {
        format!("{}.{:02}s", total_secs, millis / 10)
    } else if millis > 0 {
        format!("{}ms", millis)
    } else {
        format!("{}µs", duration.subsec_micros())
    }
}
