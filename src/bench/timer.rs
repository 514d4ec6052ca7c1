//! Wall-clock timing around a computation

use std::time::Instant;

use crate::models::TimedResult;
use crate::Result;

/// Time `f` with the monotonic clock and return its value with the elapsed time
pub fn measure<R, F>(f: F) -> TimedResult<R>
where
    F: FnOnce() -> R,
{
    let start = Instant::now();
    let value = f();
    TimedResult {
        elapsed: start.elapsed(),
        value,
    }
}

/// Like [`measure`], propagating the error of a fallible computation
pub fn try_measure<R, F>(f: F) -> Result<TimedResult<R>>
where
    F: FnOnce() -> Result<R>,
{
    let timed = measure(f);
    let value = timed.value?;
    Ok(TimedResult {
        elapsed: timed.elapsed,
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParbenchError;
    use std::time::Duration;

    #[test]
    fn test_measure_returns_value_and_elapsed() {
        let timed = measure(|| {
            std::thread::sleep(Duration::from_millis(20));
            7
        });
        assert_eq!(timed.value, 7);
        assert!(timed.elapsed >= Duration::from_millis(20));
        assert!(timed.seconds() >= 0.02);
    }

    #[test]
    fn test_try_measure_propagates_error() {
        let result: Result<TimedResult<()>> =
            try_measure(|| Err(ParbenchError::Worker("boom".to_string())));
        assert!(matches!(result, Err(ParbenchError::Worker(msg)) if msg == "boom"));
    }

    #[test]
    #[should_panic(expected = "inner panic")]
    fn test_measure_does_not_swallow_panics() {
        measure(|| panic!("inner panic"));
    }
}
