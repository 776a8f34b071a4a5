// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-instance slideshow engine.
//!
//! [`Slideshow`] composes the index machine, autoplay scheduler,
//! transition engine, slide deck, visibility tracker, and swipe
//! recognizer into one single-writer engine. It upholds the notification
//! ordering guarantees documented in [`crate::events`] and owns the two
//! deadline kinds a backend must arm timers for (autoplay tick,
//! transition fallback).
//!
//! # Driving the engine
//!
//! The backend feeds inputs (pointer, keyboard, hover, visibility,
//! reduced motion) through the corresponding methods, arms a single
//! one-shot timer for [`next_deadline`](Slideshow::next_deadline), and
//! calls [`on_tick`](Slideshow::on_tick) when it fires. After any call
//! that may have changed visual state, the backend drains
//! [`evaluate_into`](Slideshow::evaluate_into) and hands the changes to
//! its presenter.
//!
//! # Teardown
//!
//! [`destroy`](Slideshow::destroy) is the cancellation boundary: it
//! clears both deadlines, drops the in-flight transition job, emits the
//! final `destroyed` notification, and silences the instance — no event
//! is ever delivered afterwards, and every subsequent operation is a
//! no-op.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Point;

use crate::config::{SlideshowConfig, TransitionKind};
use crate::deck::{SlideDeck, StageChanges};
use crate::error::SlideshowError;
use crate::events::{
    EventSink, Initialized, PauseToggled, SlideChanged, SlideChanging, TransitionComplete,
};
use crate::gesture::{GestureConfig, PointerSource, Swipe, SwipeRecognizer, TrackResponse};
use crate::machine::{Navigation, NextPlan, SlideMachine};
use crate::scheduler::{AutoplayScheduler, SuspendSources};
use crate::time::{Duration, HostTime, Timebase};
use crate::transition::{Begin, JobId, TransitionEngine, TransitionJob};
use crate::visibility::VisibilityTracker;

/// Keyboard navigation intents, produced by the backend's key mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NavKey {
    /// Navigate to the previous slide (e.g. ArrowLeft).
    Previous,
    /// Navigate to the next slide (e.g. ArrowRight).
    Next,
}

/// A point-in-time snapshot of the externally visible instance state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineState {
    /// The current 1-based slide index.
    pub index: u32,
    /// The slide count.
    pub total: u32,
    /// Whether the instance is manually paused.
    pub paused: bool,
    /// The combined page-and-element visibility signal.
    pub visible: bool,
    /// Whether a transition job is in flight.
    pub in_transition: bool,
}

/// The slideshow runtime engine for one widget instance.
pub struct Slideshow {
    config: SlideshowConfig,
    machine: SlideMachine,
    scheduler: AutoplayScheduler,
    transitions: TransitionEngine,
    deck: SlideDeck,
    visibility: VisibilityTracker,
    gestures: SwipeRecognizer,
    sinks: Vec<Box<dyn EventSink>>,
    initialized: bool,
    destroyed: bool,
}

impl fmt::Debug for Slideshow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slideshow")
            .field("index", &self.machine.index())
            .field("total", &self.machine.total())
            .field("paused", &self.is_paused())
            .field("in_transition", &self.transitions.in_flight())
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl Slideshow {
    /// Builds an engine from a (not necessarily normalized) configuration.
    ///
    /// `timebase` converts the configuration's millisecond values into the
    /// backend's tick resolution. Fails only for a slide-less
    /// configuration; everything else is clamped into validity.
    pub fn new(config: SlideshowConfig, timebase: Timebase) -> Result<Self, SlideshowError> {
        if config.total == 0 {
            return Err(SlideshowError::NoSlides);
        }
        let config = config.normalize();

        let interval = Duration::from_millis(config.autoplay_interval_ms, timebase);
        let duration = Duration::from_millis(config.transition_duration_ms, timebase);
        let epsilon = Duration::from_millis(TransitionEngine::min_epsilon_ms(), timebase);

        let mut initial = SuspendSources::empty();
        if config.start_paused {
            initial |= SuspendSources::MANUAL;
        }

        let machine = SlideMachine::new(config.total, config.start_index, config.looping);
        let mut deck = SlideDeck::new(config.total);
        deck.stage_instant(machine.index());

        let gestures = SwipeRecognizer::new(GestureConfig {
            enabled: config.swipe_enabled,
            ..GestureConfig::default()
        });

        Ok(Self {
            machine,
            scheduler: AutoplayScheduler::new(interval, initial),
            transitions: TransitionEngine::new(config.transition, duration, epsilon),
            deck,
            visibility: VisibilityTracker::default(),
            gestures,
            sinks: Vec::new(),
            initialized: false,
            destroyed: false,
            config,
        })
    }

    /// Registers an observer. Sinks receive every event emitted from this
    /// point on, in registration order.
    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Emits `initialized` and starts autoplay. Call once, after sinks
    /// are attached; further calls are no-ops.
    pub fn initialize(&mut self, now: HostTime) {
        if self.destroyed || self.initialized {
            return;
        }
        self.initialized = true;
        let e = Initialized {
            index: self.machine.index(),
            total: self.machine.total(),
        };
        self.emit(|s| s.on_initialized(&e));
        self.arm_autoplay(now);
    }

    // -- Introspection --

    /// Returns the normalized configuration.
    #[must_use]
    pub fn config(&self) -> &SlideshowConfig {
        &self.config
    }

    /// Returns a snapshot of the externally visible state.
    #[must_use]
    pub fn state(&self) -> EngineState {
        EngineState {
            index: self.machine.index(),
            total: self.machine.total(),
            paused: self.is_paused(),
            visible: self.visibility.visible(),
            in_transition: self.transitions.in_flight(),
        }
    }

    /// Returns whether the instance is manually paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.scheduler.is_suspended_by(SuspendSources::MANUAL)
    }

    /// Returns whether the autoplay deadline is armed.
    #[must_use]
    pub fn autoplay_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Returns whether the instance has been destroyed.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Returns the visual state store, for the presenter.
    #[must_use]
    pub const fn deck(&self) -> &SlideDeck {
        &self.deck
    }

    /// Returns the transition kind that will actually run.
    #[must_use]
    pub const fn effective_transition(&self) -> TransitionKind {
        self.transitions.effective_kind()
    }

    /// Returns the (fade-out, fade-in) durations for the effective kind,
    /// for backends that map them onto CSS animation durations.
    #[must_use]
    pub fn fade_durations(&self) -> (Duration, Duration) {
        (
            self.transitions.fade_out_duration(),
            self.transitions.fade_in_duration(),
        )
    }

    /// Returns the in-flight transition job, if any.
    ///
    /// Backends read the job id here to tag their native
    /// animation-finished hook for [`on_animation_end`](Self::on_animation_end).
    #[must_use]
    pub const fn active_job(&self) -> Option<TransitionJob> {
        self.transitions.active()
    }

    // -- Navigation --

    /// Jumps to slide `n` (1-based).
    ///
    /// Returns whether a navigation happened. Out-of-range targets and
    /// the current index are silent no-ops.
    pub fn go_to(&mut self, n: u32, now: HostTime) -> bool {
        if self.destroyed {
            return false;
        }
        match self.machine.plan_to(n) {
            Some(nav) => {
                self.navigate(nav, now);
                true
            }
            None => false,
        }
    }

    /// Advances one slide, wrapping per the looping policy.
    ///
    /// At the last slide of a non-looping instance this is a no-op that
    /// also stops autoplay.
    pub fn next(&mut self, now: HostTime) -> bool {
        if self.destroyed {
            return false;
        }
        match self.machine.plan_next() {
            NextPlan::Move(nav) => {
                self.navigate(nav, now);
                true
            }
            NextPlan::EndStop => {
                self.stop_autoplay();
                false
            }
        }
    }

    /// Steps back one slide, wrapping per the looping policy.
    pub fn prev(&mut self, now: HostTime) -> bool {
        if self.destroyed {
            return false;
        }
        match self.machine.plan_prev() {
            Some(nav) => {
                self.navigate(nav, now);
                true
            }
            None => false,
        }
    }

    /// Handles a keyboard navigation intent. Silent when keyboard input
    /// is disabled by configuration.
    pub fn key_nav(&mut self, key: NavKey, now: HostTime) -> bool {
        if self.destroyed || !self.config.keyboard_enabled {
            return false;
        }
        match key {
            NavKey::Previous => self.prev(now),
            NavKey::Next => self.next(now),
        }
    }

    // -- Pause and suspension --

    /// Flips the manual pause flag and returns the new value.
    ///
    /// Listeners observe the flag already updated: the `pause toggled`
    /// notification is delivered after the flag write and before the
    /// autoplay timer is started or stopped.
    pub fn toggle_pause(&mut self, now: HostTime) -> bool {
        if self.destroyed {
            return self.is_paused();
        }
        let paused = !self.is_paused();
        self.set_manual_pause(paused, now);
        paused
    }

    /// Sets the manual pause flag. A no-op when already paused.
    pub fn pause(&mut self, now: HostTime) {
        if !self.destroyed && !self.is_paused() {
            self.set_manual_pause(true, now);
        }
    }

    /// Clears the manual pause flag. A no-op when not paused.
    pub fn resume(&mut self, now: HostTime) {
        if !self.destroyed && self.is_paused() {
            self.set_manual_pause(false, now);
        }
    }

    /// Reports a hover edge. Only suspends when configured to
    /// pause-on-hover; never emits `pause toggled`.
    pub fn set_hover(&mut self, hovered: bool, now: HostTime) {
        if self.destroyed || !self.config.pause_on_hover {
            return;
        }
        if hovered {
            self.suspend_autoplay(SuspendSources::HOVER);
        } else {
            self.release_autoplay(SuspendSources::HOVER, now);
        }
    }

    /// Reports the document-level visibility signal.
    ///
    /// Page-hidden force-stops autoplay immediately; page-visible resumes
    /// it only if the element is independently visible and no other
    /// source suspends. Never changes the current index.
    pub fn set_page_visible(&mut self, visible: bool, now: HostTime) {
        if self.destroyed {
            return;
        }
        if let Some(visible) = self.visibility.set_page_visible(visible) {
            if visible {
                self.release_autoplay(SuspendSources::PAGE_HIDDEN, now);
            } else {
                self.suspend_autoplay(SuspendSources::PAGE_HIDDEN);
            }
        }
    }

    /// Reports an element visibility ratio observation (from an
    /// intersection observer or the bounding-rect fallback).
    pub fn observe_element_ratio(&mut self, ratio: f64, now: HostTime) {
        if self.destroyed {
            return;
        }
        if let Some(visible) = self.visibility.observe_ratio(ratio) {
            if visible {
                self.release_autoplay(SuspendSources::OFFSCREEN, now);
            } else {
                self.suspend_autoplay(SuspendSources::OFFSCREEN);
            }
        }
    }

    /// Convenience for boolean element-visibility sources.
    pub fn set_element_visible(&mut self, visible: bool, now: HostTime) {
        self.observe_element_ratio(if visible { 1.0 } else { 0.0 }, now);
    }

    /// Reports the reduced-motion preference.
    ///
    /// Seeing the preference once permanently downgrades transitions to
    /// instant; a later flip back only releases the autoplay suspension.
    pub fn set_reduced_motion(&mut self, reduced: bool, now: HostTime) {
        if self.destroyed {
            return;
        }
        if reduced {
            self.transitions.force_reduced_motion();
            self.suspend_autoplay(SuspendSources::REDUCED_MOTION);
        } else {
            self.release_autoplay(SuspendSources::REDUCED_MOTION, now);
        }
    }

    // -- Pointer input --

    /// Feeds a pointer/touch-down.
    pub fn pointer_down(&mut self, x: f64, y: f64, source: PointerSource) {
        if self.destroyed {
            return;
        }
        self.gestures.pointer_down(Point::new(x, y), source);
    }

    /// Feeds a pointer/touch-move. Returns `true` when the session is a
    /// horizontal drag and the backend should suppress default scrolling.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        if self.destroyed {
            return false;
        }
        matches!(
            self.gestures.pointer_move(Point::new(x, y)),
            TrackResponse::Drag
        )
    }

    /// Feeds a pointer/touch-up. A classified swipe triggers the
    /// corresponding navigation and restarts autoplay.
    pub fn pointer_up(&mut self, x: f64, y: f64, now: HostTime) -> Option<Swipe> {
        if self.destroyed {
            return None;
        }
        let swipe = self.gestures.pointer_up(Point::new(x, y))?;
        match swipe {
            Swipe::Previous => {
                let _ = self.prev(now);
            }
            Swipe::Next => {
                let _ = self.next(now);
            }
        }
        Some(swipe)
    }

    /// Aborts the pointer session without classifying.
    pub fn pointer_cancel(&mut self) {
        self.gestures.cancel();
    }

    // -- Deadlines and completion --

    /// Returns the earliest pending deadline (autoplay tick or transition
    /// fallback), for the backend to arm a single one-shot timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<HostTime> {
        if self.destroyed {
            return None;
        }
        match (self.scheduler.deadline(), self.transitions.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Fires every due deadline: the transition fallback first (so a
    /// queued autoplay advance starts from settled state), then the
    /// autoplay tick.
    pub fn on_tick(&mut self, now: HostTime) {
        if self.destroyed {
            return;
        }
        if let Some(job) = self.transitions.poll(now) {
            self.complete_job(job);
        }
        if self.scheduler.poll(now) {
            let _ = self.next(now);
        }
    }

    /// Reports the native animation-finished hook for `id`.
    ///
    /// Completes the matching in-flight job; stale ids (canceled or
    /// already completed, e.g. the fallback fired first) are ignored.
    pub fn on_animation_end(&mut self, id: JobId) {
        if self.destroyed {
            return;
        }
        if let Some(job) = self.transitions.on_animation_end(id) {
            self.complete_job(job);
        }
    }

    // -- Evaluation --

    /// Drains the deck's dirty channels into `changes` for the presenter.
    pub fn evaluate_into(&mut self, changes: &mut StageChanges) {
        self.deck.evaluate_into(changes);
    }

    /// Allocating variant of [`evaluate_into`](Self::evaluate_into).
    pub fn evaluate(&mut self) -> StageChanges {
        self.deck.evaluate()
    }

    // -- Teardown --

    /// Tears the instance down: clears every deadline, cancels the
    /// in-flight job, emits the final `destroyed` notification, and
    /// silences the instance for good.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.scheduler.disarm();
        let _ = self.transitions.cancel();
        self.gestures.cancel();
        self.emit(|s| s.on_destroyed());
        self.destroyed = true;
    }

    // -- Internals --

    fn emit(&mut self, f: impl Fn(&mut dyn EventSink)) {
        if self.destroyed {
            return;
        }
        for sink in &mut self.sinks {
            f(sink.as_mut());
        }
    }

    /// Performs a planned navigation, upholding the ordering guarantees:
    /// changing → index commit → deck mutation → (changed/complete now,
    /// or on job completion).
    fn navigate(&mut self, nav: Navigation, now: HostTime) {
        let changing = SlideChanging {
            from: nav.from,
            to: nav.to,
        };
        self.emit(|s| s.on_slide_changing(&changing));
        self.machine.commit(nav.to);

        match self.transitions.begin(now, nav.from, nav.to) {
            Begin::Immediate { .. } => {
                self.deck.stage_instant(nav.to);
                self.emit_settled(nav.to, TransitionKind::Instant);
            }
            Begin::Animated { .. } => {
                self.deck.stage_crossfade(nav.from, nav.to);
            }
        }

        // Navigation restarts the interval so a full period separates this
        // change from the next automatic advance.
        self.arm_autoplay(now);
    }

    fn complete_job(&mut self, job: TransitionJob) {
        self.deck.settle(job.to);
        self.emit_settled(job.to, job.kind);
    }

    fn emit_settled(&mut self, index: u32, kind: TransitionKind) {
        let changed = SlideChanged {
            index,
            total: self.machine.total(),
        };
        self.emit(|s| s.on_slide_changed(&changed));
        let complete = TransitionComplete { index, kind };
        self.emit(|s| s.on_transition_complete(&complete));
    }

    fn set_manual_pause(&mut self, paused: bool, now: HostTime) {
        // Flag first, then notify, then the timer action: listeners must
        // observe the flag already updated.
        self.scheduler.set_source(SuspendSources::MANUAL, paused);
        self.emit(|s| s.on_pause_toggled(&PauseToggled { paused }));
        let was = self.scheduler.is_running();
        if paused {
            self.scheduler.disarm();
        } else {
            self.scheduler.arm(now);
        }
        self.autoplay_edge(was);
    }

    fn arm_autoplay(&mut self, now: HostTime) {
        let was = self.scheduler.is_running();
        self.scheduler.arm(now);
        self.autoplay_edge(was);
    }

    fn stop_autoplay(&mut self) {
        let was = self.scheduler.is_running();
        self.scheduler.disarm();
        self.autoplay_edge(was);
    }

    fn suspend_autoplay(&mut self, source: SuspendSources) {
        let was = self.scheduler.is_running();
        self.scheduler.suspend(source);
        self.autoplay_edge(was);
    }

    fn release_autoplay(&mut self, source: SuspendSources, now: HostTime) {
        let was = self.scheduler.is_running();
        self.scheduler.release(source, now);
        self.autoplay_edge(was);
    }

    fn autoplay_edge(&mut self, was_running: bool) {
        let running = self.scheduler.is_running();
        if running == was_running {
            return;
        }
        if running {
            self.emit(|s| s.on_autoplay_started());
        } else {
            self.emit(|s| s.on_autoplay_stopped());
        }
    }
}
