//! Time sources for frame-driven loops
//!
//! Schedulers read "now" through a [`Clock`] so the same code runs against
//! the wall clock in an app and against a [`ManualClock`] in tests and
//! headless simulations.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Convert fractional milliseconds to a [`Duration`], rounding to the nanosecond
///
/// Negative and non-finite inputs become zero.
pub fn millis(ms: f64) -> Duration {
    if ms.is_finite() && ms > 0.0 {
        Duration::from_nanos((ms * 1_000_000.0).round() as u64)
    } else {
        Duration::ZERO
    }
}

/// Fractional milliseconds between two instants, zero if `later` is earlier
pub fn elapsed_ms(earlier: Instant, later: Instant) -> f64 {
    later.saturating_duration_since(earlier).as_nanos() as f64 / 1_000_000.0
}

/// A monotonic time source
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`]
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to
///
/// Clones share the same elapsed time, so a test can hold one handle while
/// the engine under test holds another.
#[derive(Clone, Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed_nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.elapsed_nanos.fetch_add(nanos, Ordering::SeqCst);
    }

    /// Move time forward by a (possibly fractional) number of milliseconds
    pub fn advance_ms(&self, ms: f64) {
        self.advance(millis(ms));
    }

    /// Time elapsed since the clock was created
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_nanos.load(Ordering::SeqCst))
    }

    /// The instant the clock started at
    pub fn origin(&self) -> Instant {
        self.origin
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new();
        let handle = clock.clone();

        handle.advance(Duration::from_millis(250));

        assert_eq!(clock.elapsed(), Duration::from_millis(250));
        assert_eq!(clock.now(), handle.now());
    }

    #[test]
    fn test_manual_clock_ignores_invalid_ms() {
        let clock = ManualClock::new();
        clock.advance_ms(f64::NAN);
        clock.advance_ms(-5.0);
        assert_eq!(clock.elapsed(), Duration::ZERO);

        clock.advance_ms(1.5);
        assert_eq!(clock.elapsed(), Duration::from_micros(1500));
    }

    #[test]
    fn test_millis_rounds_and_clamps() {
        assert_eq!(millis(300.0), Duration::from_millis(300));
        assert_eq!(millis(1000.0 / 60.0), Duration::from_nanos(16_666_667));
        assert_eq!(millis(-1.0), Duration::ZERO);
        assert_eq!(millis(f64::INFINITY), Duration::ZERO);
    }

    #[test]
    fn test_elapsed_ms_saturates() {
        let clock = ManualClock::new();
        let a = clock.now();
        clock.advance(Duration::from_millis(40));
        let b = clock.now();
        assert_eq!(elapsed_ms(a, b), 40.0);
        assert_eq!(elapsed_ms(b, a), 0.0);
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
