// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monotonic host time and millisecond conversion.
//!
//! [`HostTime`] represents a point in time as platform-native monotonic
//! ticks (on the web backend, microseconds from `performance.now()`).
//! [`Duration`] is a span in the same tick units. [`Timebase`] carries the
//! rational conversion factor from ticks to nanoseconds so that the
//! millisecond values found in widget configuration (autoplay interval,
//! transition duration) can be converted into deadline arithmetic for
//! whatever tick resolution the backend reports.
//!
//! All conversions use `u128` intermediates to avoid overflow.

use core::fmt;
use core::ops::{Add, Sub};

/// A point in time expressed as platform-native monotonic ticks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HostTime(pub u64);

impl HostTime {
    /// Returns the raw tick value.
    #[inline]
    #[must_use]
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Returns the duration between `self` and an earlier time, or zero if
    /// `earlier` is after `self`.
    #[inline]
    #[must_use]
    pub const fn saturating_duration_since(self, earlier: Self) -> Duration {
        Duration(self.0.saturating_sub(earlier.0))
    }

    /// Saturating addition of a duration.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, duration: Duration) -> Self {
        Self(self.0.saturating_add(duration.0))
    }

    /// Returns whether a deadline at `self` is due at time `now`.
    #[inline]
    #[must_use]
    pub const fn is_due(self, now: Self) -> bool {
        now.0 >= self.0
    }
}

impl Add<Duration> for HostTime {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Duration) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub<Duration> for HostTime {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Duration) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Sub for HostTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: Self) -> Duration {
        Duration(self.0 - rhs.0)
    }
}

impl fmt::Debug for HostTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostTime({})", self.0)
    }
}

/// Rational conversion factor from ticks to nanoseconds.
///
/// `nanoseconds = ticks * numer / denom`. The correct instance for a given
/// platform is provided by the backend crate's `timebase()` free function
/// (the web backend uses microsecond ticks: `numer = 1000, denom = 1`).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timebase {
    /// Numerator of the ticks-to-nanoseconds ratio.
    pub numer: u32,
    /// Denominator of the ticks-to-nanoseconds ratio.
    pub denom: u32,
}

impl Timebase {
    /// A timebase where ticks are already nanoseconds (1:1).
    pub const NANOS: Self = Self { numer: 1, denom: 1 };

    /// A timebase where 1 tick = 1 millisecond.
    ///
    /// Handy for tests: tick values read directly as milliseconds.
    pub const MILLIS: Self = Self {
        numer: 1_000_000,
        denom: 1,
    };

    /// Creates a new timebase with the given numerator and denominator.
    ///
    /// # Panics
    ///
    /// Panics if `denom` is zero.
    #[inline]
    #[must_use]
    pub const fn new(numer: u32, denom: u32) -> Self {
        assert!(denom != 0, "timebase denominator must not be zero");
        Self { numer, denom }
    }

    /// Converts a tick count to nanoseconds.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "u128 intermediate avoids overflow; truncation back to u64 is intentional"
    )]
    pub const fn ticks_to_nanos(self, ticks: u64) -> u64 {
        let wide = ticks as u128 * self.numer as u128 / self.denom as u128;
        wide as u64
    }

    /// Converts nanoseconds to a tick count.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "u128 intermediate avoids overflow; truncation back to u64 is intentional"
    )]
    pub const fn nanos_to_ticks(self, nanos: u64) -> u64 {
        let wide = nanos as u128 * self.denom as u128 / self.numer as u128;
        wide as u64
    }
}

impl fmt::Debug for Timebase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timebase({}/{})", self.numer, self.denom)
    }
}

/// A duration in platform-native ticks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(pub u64);

impl Duration {
    /// A zero-length duration.
    pub const ZERO: Self = Self(0);

    /// Returns the raw tick value.
    #[inline]
    #[must_use]
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Returns whether this duration is zero.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Creates a duration from a millisecond value and timebase.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: u64, timebase: Timebase) -> Self {
        Self(timebase.nanos_to_ticks(millis.saturating_mul(1_000_000)))
    }

    /// Converts this duration to (truncated) milliseconds.
    #[inline]
    #[must_use]
    pub const fn to_millis(self, timebase: Timebase) -> u64 {
        timebase.ticks_to_nanos(self.0) / 1_000_000
    }

    /// Saturating addition.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Saturating subtraction.
    #[inline]
    #[must_use]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Multiplies this duration by a per-mille factor (`value * num / 1000`).
    ///
    /// Used for the transition overlap buffer (e.g. 30% = 300‰) without
    /// floating-point arithmetic.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "u128 intermediate avoids overflow; truncation back to u64 is intentional"
    )]
    pub const fn mul_permille(self, permille: u64) -> Self {
        let wide = self.0 as u128 * permille as u128 / 1000;
        Self(wide as u64)
    }
}

impl Add for Duration {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Duration {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Duration({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_round_trip_identity_timebase() {
        let tb = Timebase::NANOS;
        let d = Duration::from_millis(250, tb);
        assert_eq!(d.ticks(), 250_000_000);
        assert_eq!(d.to_millis(tb), 250);
    }

    #[test]
    fn millis_round_trip_web_style() {
        // Web ticks are microseconds: 1000 ns per tick.
        let tb = Timebase::new(1000, 1);
        let d = Duration::from_millis(5000, tb);
        assert_eq!(d.ticks(), 5_000_000, "5s at µs resolution");
        assert_eq!(d.to_millis(tb), 5000);
    }

    #[test]
    fn millis_timebase_reads_directly() {
        let tb = Timebase::MILLIS;
        assert_eq!(Duration::from_millis(40, tb).ticks(), 40);
        assert_eq!(Duration(40).to_millis(tb), 40);
    }

    #[test]
    fn overflow_safe_conversion() {
        let tb = Timebase::new(125, 3);
        // Should not panic even for values that would overflow u64 naively.
        let _ = tb.ticks_to_nanos(u64::MAX / 2);
    }

    #[test]
    fn deadline_due_comparison() {
        let deadline = HostTime(1000);
        assert!(!deadline.is_due(HostTime(999)));
        assert!(deadline.is_due(HostTime(1000)));
        assert!(deadline.is_due(HostTime(1001)));
    }

    #[test]
    fn host_time_duration_ops() {
        let t = HostTime(1000);
        let d = Duration(200);
        assert_eq!((t + d).ticks(), 1200);
        assert_eq!((t - d).ticks(), 800);
        assert_eq!(t.saturating_duration_since(HostTime(1500)), Duration::ZERO);
        assert_eq!(t.saturating_duration_since(HostTime(400)), Duration(600));
        assert_eq!(HostTime(u64::MAX).saturating_add(d), HostTime(u64::MAX));
    }

    #[test]
    fn permille_scaling() {
        assert_eq!(Duration(1000).mul_permille(300), Duration(300));
        assert_eq!(Duration(700).mul_permille(1300), Duration(910));
        assert_eq!(Duration(0).mul_permille(300), Duration::ZERO);
    }
}
