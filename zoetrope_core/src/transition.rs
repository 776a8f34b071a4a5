// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transition jobs with race-free, exactly-once completion.
//!
//! A navigation that animates produces a [`TransitionJob`]. At most one
//! job exists per instance; beginning a new one cancels whatever was in
//! flight. Completion can arrive from two directions — the backend's
//! native animation-finished hook, or the fallback deadline the engine
//! arms at `total duration + epsilon` — and the first signal wins. Both
//! paths are guarded by the job's [`JobId`]: a monotonically increasing
//! generation counter, so a signal for a canceled or already-completed job
//! is ignored rather than completing twice. This is the same
//! stale-handle-by-generation idea the deck could not use (slides are
//! never reallocated), applied to in-flight work.
//!
//! # Reduced motion
//!
//! Once a reduced-motion preference is observed (at init or on a live
//! preference change), the engine forces [`TransitionKind::Instant`] for
//! the rest of the instance's lifetime. There is no automatic revert; the
//! downgrade is recorded as the new operating mode.

use crate::config::TransitionKind;
use crate::time::{Duration, HostTime};

/// Minimum fallback slack beyond the visual duration.
const MIN_EPSILON_MS: u64 = 100;

/// Per-mille of the base duration the staggered kinds add as overlap.
const STAGGER_OVERLAP_PERMILLE: u64 = 300;

/// Per-mille of the base duration the outgoing slide animates for in the
/// staggered kinds.
const STAGGER_FADE_OUT_PERMILLE: u64 = 700;

/// Generation identifier for one transition job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

/// An in-flight animated slide change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionJob {
    /// Generation id; completion signals must match it.
    pub id: JobId,
    /// The outgoing 1-based slide index.
    pub from: u32,
    /// The incoming 1-based slide index.
    pub to: u32,
    /// The kind that is running (after any reduced-motion downgrade).
    pub kind: TransitionKind,
    /// When the job began.
    pub started_at: HostTime,
    /// When the fallback completion fires if the native hook never does.
    pub fallback_deadline: HostTime,
}

/// The result of beginning a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Begin {
    /// No animation: the change completes synchronously.
    Immediate {
        /// The job that was canceled to make way, if one was in flight.
        canceled: Option<JobId>,
    },
    /// An animated job is now in flight.
    Animated {
        /// The job that was canceled to make way, if one was in flight.
        canceled: Option<JobId>,
        /// The new in-flight job.
        job: TransitionJob,
    },
}

/// Owns the single in-flight transition job for one instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionEngine {
    configured: TransitionKind,
    duration: Duration,
    epsilon: Duration,
    forced_instant: bool,
    active: Option<TransitionJob>,
    next_id: u64,
}

impl TransitionEngine {
    /// Creates an engine for the configured kind and base duration.
    ///
    /// `epsilon_floor` is the fallback slack beyond the visual duration.
    /// Callers must pass at least [`min_epsilon_ms`](Self::min_epsilon_ms)
    /// worth of ticks; the engine composition derives it from the
    /// backend's timebase.
    #[must_use]
    pub const fn new(configured: TransitionKind, duration: Duration, epsilon_floor: Duration) -> Self {
        Self {
            configured,
            duration,
            epsilon: epsilon_floor,
            forced_instant: false,
            active: None,
            next_id: 0,
        }
    }

    /// Returns the minimum fallback slack in milliseconds.
    #[must_use]
    pub const fn min_epsilon_ms() -> u64 {
        MIN_EPSILON_MS
    }

    /// Returns the kind that will actually run, after any reduced-motion
    /// downgrade.
    #[must_use]
    pub const fn effective_kind(&self) -> TransitionKind {
        if self.forced_instant {
            TransitionKind::Instant
        } else {
            self.configured
        }
    }

    /// Returns whether the reduced-motion downgrade is in effect.
    #[must_use]
    pub const fn reduced_motion(&self) -> bool {
        self.forced_instant
    }

    /// Forces [`TransitionKind::Instant`] for the rest of the instance's
    /// lifetime. Irreversible.
    pub const fn force_reduced_motion(&mut self) {
        self.forced_instant = true;
    }

    /// Returns the in-flight job, if any.
    #[must_use]
    pub const fn active(&self) -> Option<TransitionJob> {
        self.active
    }

    /// Returns whether a job is in flight.
    #[must_use]
    pub const fn in_flight(&self) -> bool {
        self.active.is_some()
    }

    /// Returns the fallback deadline of the in-flight job, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<HostTime> {
        self.active.map(|job| job.fallback_deadline)
    }

    /// How long the outgoing slide animates for under the effective kind.
    ///
    /// Backends map this to the outgoing element's CSS duration.
    #[must_use]
    pub fn fade_out_duration(&self) -> Duration {
        match self.effective_kind() {
            TransitionKind::Instant => Duration::ZERO,
            TransitionKind::CrossfadeClassic => self.duration,
            TransitionKind::CrossfadeStaged | TransitionKind::CrossfadeDynamic => {
                self.duration.mul_permille(STAGGER_FADE_OUT_PERMILLE)
            }
        }
    }

    /// How long the incoming slide animates for under the effective kind.
    #[must_use]
    pub fn fade_in_duration(&self) -> Duration {
        match self.effective_kind() {
            TransitionKind::Instant => Duration::ZERO,
            TransitionKind::CrossfadeClassic => self.duration,
            TransitionKind::CrossfadeStaged | TransitionKind::CrossfadeDynamic => self
                .duration
                .saturating_add(self.duration.mul_permille(STAGGER_OVERLAP_PERMILLE)),
        }
    }

    /// Total wall-clock time until the change is visually settled.
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        // The staggered incoming fade is the longest-running leg.
        self.fade_in_duration()
    }

    /// Begins a transition from `from` to `to`.
    ///
    /// Any in-flight job is canceled first (its id is returned so the
    /// caller can release per-job resources); its pending completion
    /// signals become stale and will be ignored. For the instant kind no
    /// job is created and the caller completes the change synchronously.
    pub fn begin(&mut self, now: HostTime, from: u32, to: u32) -> Begin {
        let canceled = self.active.take().map(|job| job.id);

        if self.effective_kind().is_instant() {
            return Begin::Immediate { canceled };
        }

        self.next_id += 1;
        let job = TransitionJob {
            id: JobId(self.next_id),
            from,
            to,
            kind: self.effective_kind(),
            started_at: now,
            fallback_deadline: now + self.total_duration().saturating_add(self.epsilon),
        };
        self.active = Some(job);
        Begin::Animated { canceled, job }
    }

    /// Completes the in-flight job if `id` matches it.
    ///
    /// This is the native animation-finished path. Stale ids (canceled or
    /// already-completed jobs) return `None`; the fallback deadline of the
    /// completed job is disarmed by clearing the active slot.
    pub fn on_animation_end(&mut self, id: JobId) -> Option<TransitionJob> {
        match self.active {
            Some(job) if job.id == id => {
                self.active = None;
                Some(job)
            }
            _ => None,
        }
    }

    /// Completes the in-flight job if its fallback deadline is due.
    ///
    /// This is the guarantee path: it fires even if the native hook never
    /// does (element removed, animation canceled by the browser). Once it
    /// fires, a late native hook for the same job finds a stale id.
    pub fn poll(&mut self, now: HostTime) -> Option<TransitionJob> {
        match self.active {
            Some(job) if job.fallback_deadline.is_due(now) => {
                self.active = None;
                Some(job)
            }
            _ => None,
        }
    }

    /// Cancels the in-flight job without completing it.
    pub const fn cancel(&mut self) -> Option<JobId> {
        match self.active.take() {
            Some(job) => Some(job.id),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(kind: TransitionKind) -> TransitionEngine {
        // 1 tick = 1 ms in these tests.
        TransitionEngine::new(kind, Duration(700), Duration(100))
    }

    fn begin_job(e: &mut TransitionEngine, now: u64, from: u32, to: u32) -> TransitionJob {
        match e.begin(HostTime(now), from, to) {
            Begin::Animated { job, .. } => job,
            Begin::Immediate { .. } => panic!("expected an animated transition"),
        }
    }

    #[test]
    fn instant_kind_completes_synchronously() {
        let mut e = engine(TransitionKind::Instant);
        assert_eq!(
            e.begin(HostTime(0), 1, 2),
            Begin::Immediate { canceled: None }
        );
        assert!(!e.in_flight());
    }

    #[test]
    fn crossfade_creates_job_with_fallback_slack() {
        let mut e = engine(TransitionKind::CrossfadeClassic);
        let job = begin_job(&mut e, 1000, 1, 2);
        assert_eq!(job.fallback_deadline, HostTime(1000 + 700 + 100));
        assert_eq!(job.kind, TransitionKind::CrossfadeClassic);
        assert!(e.in_flight());
    }

    #[test]
    fn staggered_kinds_extend_the_fallback_by_the_overlap() {
        for kind in [
            TransitionKind::CrossfadeStaged,
            TransitionKind::CrossfadeDynamic,
        ] {
            let mut e = engine(kind);
            assert_eq!(e.fade_out_duration(), Duration(490), "70% of 700");
            assert_eq!(e.fade_in_duration(), Duration(910), "700 + 30% overlap");
            let job = begin_job(&mut e, 0, 1, 2);
            assert_eq!(job.fallback_deadline, HostTime(910 + 100));
        }
    }

    #[test]
    fn native_hook_completes_exactly_once() {
        let mut e = engine(TransitionKind::CrossfadeClassic);
        let job = begin_job(&mut e, 0, 1, 2);

        let done = e.on_animation_end(job.id).expect("first signal completes");
        assert_eq!(done.id, job.id);

        // The fallback would fire next, but the job is gone.
        assert_eq!(e.poll(HostTime(10_000)), None);
        // And a duplicate native hook is stale.
        assert_eq!(e.on_animation_end(job.id), None);
    }

    #[test]
    fn fallback_fires_when_native_hook_never_arrives() {
        let mut e = engine(TransitionKind::CrossfadeClassic);
        let job = begin_job(&mut e, 0, 1, 2);

        assert_eq!(e.poll(HostTime(799)), None, "not due yet");
        let done = e.poll(HostTime(800)).expect("fallback completes");
        assert_eq!(done.id, job.id);

        // A late native hook after the fallback is stale.
        assert_eq!(e.on_animation_end(job.id), None);
    }

    #[test]
    fn superseding_navigation_cancels_the_previous_job() {
        let mut e = engine(TransitionKind::CrossfadeClassic);
        let first = begin_job(&mut e, 0, 1, 2);

        let second = match e.begin(HostTime(100), 2, 3) {
            Begin::Animated { canceled, job } => {
                assert_eq!(canceled, Some(first.id), "previous job is canceled");
                job
            }
            Begin::Immediate { .. } => panic!("expected an animated transition"),
        };

        // Signals for the first job are stale in both directions.
        assert_eq!(e.on_animation_end(first.id), None);
        let done = e.poll(HostTime(10_000)).expect("second job completes");
        assert_eq!(done.id, second.id);
    }

    #[test]
    fn reduced_motion_downgrade_is_permanent() {
        let mut e = engine(TransitionKind::CrossfadeClassic);
        e.force_reduced_motion();
        assert_eq!(e.effective_kind(), TransitionKind::Instant);
        assert_eq!(
            e.begin(HostTime(0), 1, 2),
            Begin::Immediate { canceled: None }
        );
        // There is no way back; the engine records the downgrade as the
        // operating mode.
        assert!(e.reduced_motion());
        assert_eq!(e.fade_out_duration(), Duration::ZERO);
    }

    #[test]
    fn cancel_releases_the_job() {
        let mut e = engine(TransitionKind::CrossfadeClassic);
        let job = begin_job(&mut e, 0, 1, 2);
        assert_eq!(e.cancel(), Some(job.id));
        assert_eq!(e.cancel(), None);
        assert_eq!(e.poll(HostTime(10_000)), None);
    }

    #[test]
    fn job_ids_are_monotonic() {
        let mut e = engine(TransitionKind::CrossfadeClassic);
        let a = begin_job(&mut e, 0, 1, 2);
        let _ = e.cancel();
        let b = begin_job(&mut e, 0, 2, 3);
        assert!(b.id > a.id, "ids never repeat within an instance");
    }
}
