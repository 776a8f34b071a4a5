// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change notifications and the observer contract.
//!
//! Every externally observable state change of a slideshow instance is
//! surfaced as a typed event through the [`EventSink`] trait. UI
//! collaborators (navigation indicators, progress bar, screen-reader
//! announcer, URL-hash sync) and diagnostics sinks implement it; all
//! methods default to no-ops so a sink only overrides the events it cares
//! about.
//!
//! # Ordering guarantees
//!
//! The engine upholds three ordering rules across all sinks:
//!
//! 1. [`on_slide_changing`](EventSink::on_slide_changing) always precedes
//!    any deck/DOM mutation for that change.
//! 2. Every [`on_slide_changed`](EventSink::on_slide_changed) /
//!    [`on_transition_complete`](EventSink::on_transition_complete) pair
//!    follows exactly one prior `on_slide_changing` — never zero or two.
//! 3. [`on_pause_toggled`](EventSink::on_pause_toggled) carries the
//!    *post*-toggle value and fires before the dependent autoplay timer
//!    start/stop (and its started/stopped events).
//!
//! No event is delivered after [`on_destroyed`](EventSink::on_destroyed).

use crate::config::TransitionKind;

/// Emitted once after construction, when the instance is wired and the
/// initial slide is staged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Initialized {
    /// The initial 1-based slide index.
    pub index: u32,
    /// The instance's slide count.
    pub total: u32,
}

/// Emitted when a navigation has been accepted, before any visual update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlideChanging {
    /// The outgoing 1-based slide index.
    pub from: u32,
    /// The incoming 1-based slide index.
    pub to: u32,
}

/// Emitted when a navigation has fully taken effect.
///
/// For instant transitions this immediately follows [`SlideChanging`]; for
/// crossfade kinds it is deferred until the transition completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlideChanged {
    /// The now-current 1-based slide index.
    pub index: u32,
    /// The instance's slide count.
    pub total: u32,
}

/// Emitted when the manual pause flag flips, carrying the new value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PauseToggled {
    /// The paused state *after* the toggle.
    pub paused: bool,
}

/// Emitted when a transition job completes (exactly once per job).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionComplete {
    /// The now-current 1-based slide index.
    pub index: u32,
    /// The transition kind that ran (after any reduced-motion downgrade).
    pub kind: TransitionKind,
}

/// Receives change notifications from a slideshow instance.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait EventSink {
    /// Called once after the instance is constructed and wired.
    fn on_initialized(&mut self, e: &Initialized) {
        _ = e;
    }

    /// Called when a navigation is accepted, before any visual update.
    fn on_slide_changing(&mut self, e: &SlideChanging) {
        _ = e;
    }

    /// Called when a navigation has fully taken effect.
    fn on_slide_changed(&mut self, e: &SlideChanged) {
        _ = e;
    }

    /// Called when the manual pause flag flips.
    fn on_pause_toggled(&mut self, e: &PauseToggled) {
        _ = e;
    }

    /// Called when the autoplay timer is armed after having been stopped.
    fn on_autoplay_started(&mut self) {}

    /// Called when the autoplay timer is disarmed after having been
    /// running.
    fn on_autoplay_stopped(&mut self) {}

    /// Called when a transition job completes.
    fn on_transition_complete(&mut self, e: &TransitionComplete) {
        _ = e;
    }

    /// Called when the instance is torn down. Final event.
    fn on_destroyed(&mut self) {}
}

/// An [`EventSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {}
