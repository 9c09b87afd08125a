//! Injectable time source. Every time-dependent code path in this crate
//! consumes a `Clock` rather than calling `chrono::Utc::now()` directly, so
//! that tests can pin and advance wall-clock time deterministically.

use chrono::{DateTime, Utc};
use std::sync::Mutex;
use std::time::Instant;

/// A single capability: the current instant. Implementations must be safe
/// for concurrent calls.
pub trait Clock: Send + Sync {
    /// Wall-clock time, UTC.
    fn now(&self) -> DateTime<Utc>;

    /// Monotonic reading, used for duration measurements (timeouts,
    /// heartbeat intervals) that must not be perturbed by wall-clock
    /// adjustments.
    fn monotonic(&self) -> Instant;

    /// Epoch milliseconds for the current instant, the wire/persistence
    /// timestamp discipline.
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// Convert an epoch-millisecond timestamp back into a `DateTime<Utc>`.
pub fn from_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_else(|| DateTime::from_timestamp(0, 0).unwrap())
}

/// The real system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn monotonic(&self) -> Instant {
        Instant::now()
    }
}

/// A clock controllable by tests: `set` pins wall-clock time, `advance`
/// moves it forward. Monotonic readings advance in lockstep with real time
/// plus whatever has been added via `advance`, so timeout-style code under
/// test still observes forward progress.
pub struct TestClock {
    inner: Mutex<TestClockState>,
}

struct TestClockState {
    wall: DateTime<Utc>,
    monotonic_base: Instant,
    advanced: chrono::Duration,
}

impl TestClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            inner: Mutex::new(TestClockState {
                wall: start,
                monotonic_base: Instant::now(),
                advanced: chrono::Duration::zero(),
            }),
        }
    }

    /// Pin wall-clock time to an exact instant.
    pub fn set(&self, t: DateTime<Utc>) {
        let mut state = self.inner.lock().expect("test clock mutex poisoned");
        state.wall = t;
    }

    /// Move wall-clock and monotonic readings forward by `d`.
    pub fn advance(&self, d: chrono::Duration) {
        let mut state = self.inner.lock().expect("test clock mutex poisoned");
        state.wall += d;
        state.advanced += d;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        self.inner.lock().expect("test clock mutex poisoned").wall
    }

    fn monotonic(&self) -> Instant {
        let state = self.inner.lock().expect("test clock mutex poisoned");
        state.monotonic_base
            + state
                .advanced
                .to_std()
                .unwrap_or(std::time::Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_millis() {
        let clock = SystemClock;
        let now = clock.now();
        let round_tripped = from_millis(clock.now_millis());
        assert_eq!(round_tripped.timestamp_millis(), now.timestamp_millis());
    }

    #[test]
    fn test_clock_set_and_advance() {
        let start = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let clock = TestClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(chrono::Duration::minutes(5));
        assert_eq!(clock.now(), start + chrono::Duration::minutes(5));

        let pinned = start + chrono::Duration::days(1);
        clock.set(pinned);
        assert_eq!(clock.now(), pinned);
    }

    #[test]
    fn monotonic_advances_with_advance() {
        let clock = TestClock::new(Utc::now());
        let m0 = clock.monotonic();
        clock.advance(chrono::Duration::seconds(10));
        let m1 = clock.monotonic();
        assert!(m1 >= m0 + std::time::Duration::from_secs(10));
    }
}
