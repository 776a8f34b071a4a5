// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Autoplay deadline scheduling under independent suspend sources.
//!
//! [`AutoplayScheduler`] owns a single re-armable deadline. It never talks
//! to a platform timer: the engine surfaces the deadline through
//! `Slideshow::next_deadline()` and the backend calls back into
//! `on_tick(now)` when it fires, which drains due deadlines via
//! [`poll`](AutoplayScheduler::poll).
//!
//! Five independent [`SuspendSources`] can each stop autoplay; it runs
//! only while *no* source is set and the interval is non-zero. The flag
//! and the armed deadline are mutated through separate methods
//! ([`set_source`](AutoplayScheduler::set_source) vs
//! [`arm`](AutoplayScheduler::arm)/[`disarm`](AutoplayScheduler::disarm))
//! because pause notifications must be delivered between the flag update
//! and the timer action.

use bitflags::bitflags;

use crate::time::{Duration, HostTime};

bitflags! {
    /// Reasons autoplay is currently not allowed to run.
    ///
    /// Each source is owned by a different signal path and set/cleared
    /// independently; autoplay runs only while the set is empty.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SuspendSources: u8 {
        /// The user paused the instance (pause button, public API).
        const MANUAL = 1 << 0;
        /// The pointer is hovering the widget (when configured).
        const HOVER = 1 << 1;
        /// The page/tab itself is hidden.
        const PAGE_HIDDEN = 1 << 2;
        /// The widget element is insufficiently on-screen.
        const OFFSCREEN = 1 << 3;
        /// The user prefers reduced motion.
        const REDUCED_MOTION = 1 << 4;
    }
}

/// Owns the autoplay interval, suspend set, and the armed deadline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutoplayScheduler {
    interval: Duration,
    suspended: SuspendSources,
    deadline: Option<HostTime>,
}

impl AutoplayScheduler {
    /// Creates a scheduler with nothing armed.
    ///
    /// A zero `interval` permanently disables autoplay.
    #[must_use]
    pub const fn new(interval: Duration, initial: SuspendSources) -> Self {
        Self {
            interval,
            suspended: initial,
            deadline: None,
        }
    }

    /// Returns the configured interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns whether the combined predicate currently allows autoplay.
    #[must_use]
    pub const fn may_run(&self) -> bool {
        self.suspended.is_empty() && !self.interval.is_zero()
    }

    /// Returns whether the given source is currently set.
    #[must_use]
    pub const fn is_suspended_by(&self, source: SuspendSources) -> bool {
        self.suspended.contains(source)
    }

    /// Returns whether a deadline is armed.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns the armed deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<HostTime> {
        self.deadline
    }

    /// Sets or clears a suspend source *without* touching the deadline.
    ///
    /// Callers that don't need to order notifications between the flag
    /// update and the timer action should use
    /// [`suspend`](Self::suspend) / [`release`](Self::release) instead.
    pub fn set_source(&mut self, source: SuspendSources, on: bool) {
        self.suspended.set(source, on);
    }

    /// Arms (or re-arms) the deadline at `now + interval`.
    ///
    /// Idempotent: an existing deadline is discarded first. A no-op unless
    /// the combined predicate holds.
    pub fn arm(&mut self, now: HostTime) {
        self.deadline = if self.may_run() {
            Some(now + self.interval)
        } else {
            None
        };
    }

    /// Clears the armed deadline.
    pub const fn disarm(&mut self) {
        self.deadline = None;
    }

    /// Sets a suspend source and clears the deadline.
    pub fn suspend(&mut self, source: SuspendSources) {
        self.set_source(source, true);
        self.disarm();
    }

    /// Clears a suspend source and re-arms if nothing else suspends.
    pub fn release(&mut self, source: SuspendSources, now: HostTime) {
        self.set_source(source, false);
        self.arm(now);
    }

    /// Fires the deadline if it is due, re-arming the next one.
    ///
    /// Returns `true` when a tick fired; the caller then advances the
    /// slideshow.
    pub fn poll(&mut self, now: HostTime) -> bool {
        match self.deadline {
            Some(deadline) if deadline.is_due(now) => {
                // Re-arm from `now`, not from the missed deadline: a late
                // tick must not cause a burst of catch-up advances.
                self.deadline = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_scheduler() -> AutoplayScheduler {
        let mut s = AutoplayScheduler::new(Duration(5000), SuspendSources::empty());
        s.arm(HostTime(0));
        s
    }

    #[test]
    fn arm_is_idempotent_and_rearms() {
        let mut s = AutoplayScheduler::new(Duration(5000), SuspendSources::empty());
        s.arm(HostTime(100));
        assert_eq!(s.deadline(), Some(HostTime(5100)));
        // Re-arming discards the existing deadline.
        s.arm(HostTime(2000));
        assert_eq!(s.deadline(), Some(HostTime(7000)));
    }

    #[test]
    fn arm_refuses_while_suspended_or_disabled() {
        let mut s = AutoplayScheduler::new(Duration(5000), SuspendSources::MANUAL);
        s.arm(HostTime(0));
        assert!(!s.is_running(), "suspended scheduler stays disarmed");

        let mut s = AutoplayScheduler::new(Duration::ZERO, SuspendSources::empty());
        s.arm(HostTime(0));
        assert!(!s.is_running(), "zero interval disables autoplay");
    }

    #[test]
    fn poll_fires_once_due_and_rearms() {
        let mut s = running_scheduler();
        assert!(!s.poll(HostTime(4999)));
        assert!(s.poll(HostTime(5000)));
        // Re-armed relative to the firing time.
        assert_eq!(s.deadline(), Some(HostTime(10_000)));
    }

    #[test]
    fn late_poll_rearms_from_now() {
        let mut s = running_scheduler();
        assert!(s.poll(HostTime(8000)), "late tick still fires");
        assert_eq!(
            s.deadline(),
            Some(HostTime(13_000)),
            "no catch-up burst after a late tick"
        );
    }

    #[test]
    fn suspend_disarms_and_release_rearms() {
        let mut s = running_scheduler();
        s.suspend(SuspendSources::PAGE_HIDDEN);
        assert!(!s.is_running());
        assert!(s.is_suspended_by(SuspendSources::PAGE_HIDDEN));

        s.release(SuspendSources::PAGE_HIDDEN, HostTime(9000));
        assert_eq!(s.deadline(), Some(HostTime(14_000)));
    }

    #[test]
    fn release_with_other_sources_set_stays_stopped() {
        let mut s = running_scheduler();
        s.suspend(SuspendSources::PAGE_HIDDEN);
        s.suspend(SuspendSources::MANUAL);

        s.release(SuspendSources::PAGE_HIDDEN, HostTime(100));
        assert!(
            !s.is_running(),
            "manual pause still suspends after page becomes visible"
        );

        s.release(SuspendSources::MANUAL, HostTime(200));
        assert!(s.is_running());
    }

    #[test]
    fn sources_are_independent() {
        let mut s = running_scheduler();
        s.suspend(SuspendSources::HOVER);
        s.suspend(SuspendSources::OFFSCREEN);
        s.release(SuspendSources::HOVER, HostTime(0));
        assert!(s.is_suspended_by(SuspendSources::OFFSCREEN));
        assert!(!s.is_suspended_by(SuspendSources::HOVER));
        assert!(!s.may_run());
    }

    #[test]
    fn set_source_leaves_deadline_untouched() {
        let mut s = running_scheduler();
        let before = s.deadline();
        s.set_source(SuspendSources::MANUAL, true);
        assert_eq!(
            s.deadline(),
            before,
            "flag-only mutation must not disarm; callers order the timer action separately"
        );
    }
}
