//! Wall-clock timestamps and monotonic durations.
//!
//! Timestamps are for humans and logs; durations are measured with
//! [`Instant`] so that clock adjustments can never yield a negative value.

use chrono::{SecondsFormat, Utc};
use std::time::Instant;

/// Current UTC time as ISO-8601 with a literal `Z` suffix,
/// e.g. `2026-02-21T10:00:00.123Z`.
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Whole milliseconds elapsed since `start`.
pub fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Monotonic timer around a single execution step.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        elapsed_ms(self.started)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_now_iso8601_uses_z_suffix() {
        let ts = now_iso8601();
        assert!(ts.ends_with('Z'));
        assert!(!ts.contains("+00:00"));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[test]
    fn test_elapsed_ms_is_monotonic() {
        let start = Instant::now();
        std::thread::sleep(Duration::from_millis(5));
        let first = elapsed_ms(start);
        let second = elapsed_ms(start);
        assert!(first >= 5);
        assert!(second >= first);
    }

    #[test]
    fn test_stopwatch_starts_near_zero() {
        let watch = Stopwatch::start();
        assert!(watch.elapsed_ms() < 1000);
    }
}
