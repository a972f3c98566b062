//! Time source for order and event timestamps.
//!
//! Production uses [`SystemClock`]. Tests and replays use [`ManualClock`],
//! which only moves when told to.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, Utc};

/// Source of "now" for the exchange.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Name for log output.
    fn name(&self) -> &str {
        "Clock"
    }
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn name(&self) -> &str {
        "SystemClock"
    }
}

/// A clock that stands still until [`set`](Self::set) or
/// [`advance`](Self::advance) is called.
///
/// Shared between the exchange and the test driving it via `Arc`.
#[derive(Debug)]
pub struct ManualClock {
    /// Nanoseconds since the Unix epoch.
    nanos: AtomicI64,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            nanos: AtomicI64::new(to_nanos(start)),
        }
    }

    /// Starts at the Unix epoch.
    #[must_use]
    pub fn at_epoch() -> Self {
        Self::new(DateTime::UNIX_EPOCH)
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.nanos.store(to_nanos(at), Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        let delta = by.num_nanoseconds().unwrap_or(i64::MAX);
        let _ = self
            .nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                Some(n.saturating_add(delta))
            });
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.nanos.load(Ordering::SeqCst))
    }

    fn name(&self) -> &str {
        "ManualClock"
    }
}

fn to_nanos(at: DateTime<Utc>) -> i64 {
    at.timestamp_nanos_opt().unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_stands_still() {
        let clock = ManualClock::at_epoch();
        assert_eq!(clock.now(), DateTime::UNIX_EPOCH);
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn manual_clock_advances_and_sets() {
        let clock = ManualClock::at_epoch();
        clock.advance(Duration::seconds(90));
        assert_eq!(clock.now().timestamp(), 90);

        let later = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        clock.set(later);
        assert_eq!(clock.now(), later);
    }

    #[test]
    fn system_clock_is_monotone_enough() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
        assert_eq!(clock.name(), "SystemClock");
    }
}
