// crates/bos-core/src/core/time.rs
// ============================================================================
// Module: BOS Time Model
// Description: Injectable clock abstraction and time-window value type.
// Purpose: Keep the pipeline deterministic and replayable; no component below
//          the transport layer reads the wall clock directly.
// Dependencies: time
// ============================================================================

//! ## Overview
//! BOS never reads the wall clock from inside the pipeline, the guard stack,
//! or a projection. Every timestamp a core value carries was handed to it by
//! a [`Clock`] the caller constructed — a fixed clock in tests, a system
//! clock at the edge of the process in production. This replaces the
//! "process-wide default clock with a swap-at-test function" pattern with
//! ordinary constructor injection.

use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;

use time::OffsetDateTime;

/// Supplies the current instant to callers that need one.
///
/// # Invariants
/// - `now` must be monotonically non-decreasing for any single `Clock`
///   instance used by a single caller; callers relying on sliding-window
///   behaviour (rate limiting, anomaly detection) depend on this.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> OffsetDateTime;
}

/// Wall-clock [`Clock`] for production use.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Deterministic [`Clock`] for tests: holds an explicit instant that advances
/// only when told to.
///
/// # Invariants
/// - `now` never changes except through [`FixedClock::set`] or
///   [`FixedClock::advance`].
#[derive(Debug)]
pub struct FixedClock {
    unix_nanos: AtomicI64,
}

impl FixedClock {
    /// Creates a fixed clock starting at the given instant.
    #[must_use]
    pub fn new(start: OffsetDateTime) -> Self {
        Self {
            unix_nanos: AtomicI64::new(i64::try_from(start.unix_timestamp_nanos()).unwrap_or(0)),
        }
    }

    /// Overwrites the held instant.
    pub fn set(&self, instant: OffsetDateTime) {
        self.unix_nanos.store(
            i64::try_from(instant.unix_timestamp_nanos()).unwrap_or(0),
            Ordering::SeqCst,
        );
    }

    /// Advances the held instant by the given number of whole seconds.
    pub fn advance_seconds(&self, seconds: i64) {
        self.unix_nanos
            .fetch_add(seconds.saturating_mul(1_000_000_000), Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        let nanos = self.unix_nanos.load(Ordering::SeqCst);
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(nanos)).unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }
}

/// Immutable half-open time window `[start, end)`.
///
/// # Invariants
/// - `start <= end`; construction rejects an inverted range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: OffsetDateTime,
    end: OffsetDateTime,
}

impl TimeWindow {
    /// Creates a time window, rejecting an inverted range.
    ///
    /// # Errors
    ///
    /// Returns an error when `start` is after `end`.
    pub fn new(start: OffsetDateTime, end: OffsetDateTime) -> Result<Self, TimeWindowError> {
        if start > end {
            return Err(TimeWindowError::Inverted);
        }
        Ok(Self { start, end })
    }

    /// Returns the window start.
    #[must_use]
    pub const fn start(&self) -> OffsetDateTime {
        self.start
    }

    /// Returns the window end (exclusive).
    #[must_use]
    pub const fn end(&self) -> OffsetDateTime {
        self.end
    }

    /// Returns whether `instant` falls within `[start, end)`.
    #[must_use]
    pub fn contains(&self, instant: OffsetDateTime) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// Errors constructing a [`TimeWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TimeWindowError {
    /// `start` was after `end`.
    #[error("time window start must not be after end")]
    Inverted,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn fixed_clock_holds_until_advanced() {
        let clock = FixedClock::new(datetime!(2026-01-01 00:00:00 UTC));
        let first = clock.now();
        let second = clock.now();
        assert_eq!(first, second);
        clock.advance_seconds(60);
        assert!(clock.now() > first);
    }

    #[test]
    fn time_window_rejects_inverted_range() {
        let start = datetime!(2026-01-01 00:00:00 UTC);
        let end = datetime!(2026-01-01 00:00:00 UTC) - time::Duration::SECOND;
        assert!(TimeWindow::new(start, end).is_err());
    }

    #[test]
    fn time_window_contains_is_half_open() {
        let start = datetime!(2026-01-01 00:00:00 UTC);
        let end = start + time::Duration::SECOND;
        let window = TimeWindow::new(start, end).expect("valid window");
        assert!(window.contains(start));
        assert!(!window.contains(end));
    }
}
