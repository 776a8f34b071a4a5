// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic test scaffolding for the slideshow engine.
//!
//! The engine is sans-IO: it surfaces deadlines and waits to be ticked.
//! That makes every timing scenario replayable on a virtual clock:
//!
//! - [`ScriptedClock`] — a manually advanced [`HostTime`] source
//!   (1 tick = 1 ms via [`Timebase::MILLIS`]).
//! - [`RecordingSink`] — an [`EventSink`] that appends every notification
//!   to a shared [`EventLog`].
//! - [`RecordingPresenter`] — a [`Presenter`] that records applied
//!   [`StageChanges`] and mirrors the deck's visible set.
//! - [`Driver`] — owns an engine plus all of the above and fires due
//!   engine deadlines while advancing virtual time, the way a backend's
//!   timer would.

#![no_std]

extern crate alloc;

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use zoetrope_core::backend::Presenter;
use zoetrope_core::config::{SlideshowConfig, TransitionKind};
use zoetrope_core::deck::{SlideDeck, StageChanges};
use zoetrope_core::engine::Slideshow;
use zoetrope_core::error::SlideshowError;
use zoetrope_core::events::{
    EventSink, Initialized, PauseToggled, SlideChanged, SlideChanging, TransitionComplete,
};
use zoetrope_core::time::{Duration, HostTime, Timebase};

/// A manually advanced monotonic clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScriptedClock {
    now: HostTime,
}

impl ScriptedClock {
    /// Creates a clock at tick zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { now: HostTime(0) }
    }

    /// Returns the current virtual time.
    #[must_use]
    pub const fn now(&self) -> HostTime {
        self.now
    }

    /// Jumps to `to`. Time never moves backwards.
    pub fn set(&mut self, to: HostTime) {
        self.now = self.now.max(to);
    }

    /// Advances by `by` ticks.
    pub fn advance(&mut self, by: Duration) {
        self.now = self.now.saturating_add(by);
    }
}

/// One recorded engine notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// `initialized {index, total}`.
    Initialized(u32, u32),
    /// `slide changing {from, to}`.
    SlideChanging(u32, u32),
    /// `slide changed {index, total}`.
    SlideChanged(u32, u32),
    /// `pause toggled {paused}`.
    PauseToggled(bool),
    /// `autoplay started`.
    AutoplayStarted,
    /// `autoplay stopped`.
    AutoplayStopped,
    /// `transition complete {index, kind}`.
    TransitionComplete(u32, TransitionKind),
    /// `destroyed`.
    Destroyed,
}

/// Shared, drainable log of recorded events.
#[derive(Clone, Debug, Default)]
pub struct EventLog(Rc<RefCell<Vec<RecordedEvent>>>);

impl EventLog {
    /// Drains and returns everything recorded so far.
    pub fn take(&self) -> Vec<RecordedEvent> {
        self.0.borrow_mut().drain(..).collect()
    }

    /// Returns a copy of the log without draining it.
    #[must_use]
    pub fn snapshot(&self) -> Vec<RecordedEvent> {
        self.0.borrow().clone()
    }

    /// Returns how many of the recorded events satisfy `pred`.
    pub fn count(&self, pred: impl Fn(&RecordedEvent) -> bool) -> usize {
        self.0.borrow().iter().filter(|e| pred(e)).count()
    }
}

/// An [`EventSink`] that appends every notification to an [`EventLog`].
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    log: EventLog,
}

impl RecordingSink {
    /// Creates a sink and returns it with a handle to its log.
    #[must_use]
    pub fn new() -> (Self, EventLog) {
        let sink = Self::default();
        let log = sink.log.clone();
        (sink, log)
    }
}

impl EventSink for RecordingSink {
    fn on_initialized(&mut self, e: &Initialized) {
        self.log
            .0
            .borrow_mut()
            .push(RecordedEvent::Initialized(e.index, e.total));
    }

    fn on_slide_changing(&mut self, e: &SlideChanging) {
        self.log
            .0
            .borrow_mut()
            .push(RecordedEvent::SlideChanging(e.from, e.to));
    }

    fn on_slide_changed(&mut self, e: &SlideChanged) {
        self.log
            .0
            .borrow_mut()
            .push(RecordedEvent::SlideChanged(e.index, e.total));
    }

    fn on_pause_toggled(&mut self, e: &PauseToggled) {
        self.log
            .0
            .borrow_mut()
            .push(RecordedEvent::PauseToggled(e.paused));
    }

    fn on_autoplay_started(&mut self) {
        self.log.0.borrow_mut().push(RecordedEvent::AutoplayStarted);
    }

    fn on_autoplay_stopped(&mut self) {
        self.log.0.borrow_mut().push(RecordedEvent::AutoplayStopped);
    }

    fn on_transition_complete(&mut self, e: &TransitionComplete) {
        self.log
            .0
            .borrow_mut()
            .push(RecordedEvent::TransitionComplete(e.index, e.kind));
    }

    fn on_destroyed(&mut self) {
        self.log.0.borrow_mut().push(RecordedEvent::Destroyed);
    }
}

/// A [`Presenter`] double that records what it was asked to apply.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    /// Every non-empty [`StageChanges`] applied, in order.
    pub applied: Vec<StageChanges>,
    /// The currently visible slides, mirrored from the deck.
    pub visible: Vec<u32>,
}

impl RecordingPresenter {
    /// Creates an empty presenter double.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Presenter for RecordingPresenter {
    fn apply(&mut self, deck: &SlideDeck, changes: &StageChanges) {
        if changes.is_empty() {
            return;
        }
        self.applied.push(changes.clone());
        self.visible = (1..=deck.total())
            .filter(|&slide| deck.is_visible(slide))
            .collect();
    }
}

/// Owns an engine and drives it on a [`ScriptedClock`].
///
/// The driver plays the backend's role: after every input it evaluates
/// the deck into its [`RecordingPresenter`], and
/// [`advance_ms`](Driver::advance_ms) fires due engine deadlines exactly
/// as a one-shot platform timer would.
#[derive(Debug)]
pub struct Driver {
    engine: Slideshow,
    clock: ScriptedClock,
    /// Where applied changes accumulate.
    pub presenter: RecordingPresenter,
    log: EventLog,
    scratch: StageChanges,
}

impl Driver {
    /// Builds an engine (1 tick = 1 ms) with a recording sink attached,
    /// and initializes it at tick zero.
    pub fn new(config: SlideshowConfig) -> Result<Self, SlideshowError> {
        let mut engine = Slideshow::new(config, Timebase::MILLIS)?;
        let (sink, log) = RecordingSink::new();
        engine.add_sink(Box::new(sink));

        let mut driver = Self {
            engine,
            clock: ScriptedClock::new(),
            presenter: RecordingPresenter::new(),
            log,
            scratch: StageChanges::default(),
        };
        driver.engine.initialize(driver.clock.now());
        driver.render();
        Ok(driver)
    }

    /// Returns the current virtual time.
    #[must_use]
    pub const fn now(&self) -> HostTime {
        self.clock.now()
    }

    /// Returns the engine for direct input calls.
    pub fn engine(&mut self) -> &mut Slideshow {
        &mut self.engine
    }

    /// Read-only engine access.
    #[must_use]
    pub const fn engine_ref(&self) -> &Slideshow {
        &self.engine
    }

    /// Returns the shared event log.
    #[must_use]
    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Applies pending deck changes to the recording presenter.
    pub fn render(&mut self) {
        self.engine.evaluate_into(&mut self.scratch);
        self.presenter.apply(self.engine.deck(), &self.scratch);
    }

    /// Advances virtual time by `ms`, firing every engine deadline that
    /// falls within the window, in order, and rendering after each.
    pub fn advance_ms(&mut self, ms: u64) {
        let target = self.clock.now() + Duration(ms);
        while let Some(deadline) = self.engine.next_deadline() {
            if !deadline.is_due(target) {
                break;
            }
            self.clock.set(deadline);
            self.engine.on_tick(self.clock.now());
            self.render();
        }
        self.clock.set(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant_config(total: u32) -> SlideshowConfig {
        SlideshowConfig {
            total,
            autoplay_interval_ms: 1000,
            transition: TransitionKind::Instant,
            ..SlideshowConfig::default()
        }
    }

    #[test]
    fn clock_never_runs_backwards() {
        let mut clock = ScriptedClock::new();
        clock.set(HostTime(500));
        clock.set(HostTime(100));
        assert_eq!(clock.now(), HostTime(500));
        clock.advance(Duration(50));
        assert_eq!(clock.now(), HostTime(550));
    }

    #[test]
    fn driver_fires_each_interval_once() {
        let mut driver = Driver::new(instant_config(4)).expect("valid config");
        let _ = driver.log().take();

        driver.advance_ms(3500);
        assert_eq!(driver.engine_ref().state().index, 4, "three ticks fired");
        assert_eq!(
            driver
                .log()
                .count(|e| matches!(e, RecordedEvent::SlideChanged(..))),
            3
        );
    }

    #[test]
    fn presenter_mirrors_the_visible_set() {
        let mut driver = Driver::new(instant_config(3)).expect("valid config");
        assert_eq!(driver.presenter.visible, [1]);

        let now = driver.now();
        let _ = driver.engine().go_to(3, now);
        driver.render();
        assert_eq!(driver.presenter.visible, [3]);
    }

    #[test]
    fn empty_changes_are_not_recorded() {
        let mut driver = Driver::new(instant_config(2)).expect("valid config");
        let applied = driver.presenter.applied.len();
        driver.render();
        driver.render();
        assert_eq!(
            driver.presenter.applied.len(),
            applied,
            "idle renders apply nothing"
        );
    }
}
