// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for platform integrations.
//!
//! Zoetrope splits platform-specific work into *backend* crates. Each
//! backend provides the following pieces:
//!
//! - **Timer source** — Arms a one-shot timer for
//!   [`Slideshow::next_deadline`] (autoplay tick or transition fallback,
//!   whichever is earliest) and calls
//!   [`Slideshow::on_tick`] when it fires. This is backend-specific and
//!   not abstracted by a trait because timer setup and lifecycle differ
//!   across hosts (browser `setTimeout`, a test harness's scripted clock).
//!
//! - **Time** — `now() -> HostTime` and `timebase() -> Timebase` free
//!   functions that read the platform's monotonic clock (the web backend
//!   reads `performance.now()` as microsecond ticks).
//!
//! - **Input sources** — Feeds pointer/touch coordinates, keyboard
//!   navigation, and hover edges into the engine's input methods,
//!   honoring the engine's drag responses (suppress default scrolling
//!   only once a drag is recognized).
//!
//! - **Visibility sources** — Reports page visibility, element
//!   intersection ratios (or the debounced bounding-rect fallback), and
//!   reduced-motion preference edges.
//!
//! - **Presenter** — Implements the [`Presenter`] trait to apply staged
//!   deck changes to a platform-native surface (DOM elements, or a
//!   recording double in tests).
//!
//! # Crate boundaries
//!
//! `zoetrope_core` owns the state machines, scheduling, evaluation, and
//! this contract module. Backend crates depend on `zoetrope_core` and
//! provide platform glue. The orchestrator wires them together per widget
//! instance.
//!
//! # Instance loop pseudocode
//!
//! A typical backend wires one instance like this:
//!
//! ```rust,ignore
//! // Input path (DOM event handlers):
//! engine.pointer_down(x, y, source);
//! if engine.pointer_move(x, y) { event.prevent_default(); }
//! engine.pointer_up(x, y, now());
//!
//! // Timer path:
//! fn on_timer() {
//!     engine.on_tick(now());
//!     engine.evaluate_into(&mut changes);
//!     presenter.apply(engine.deck(), &changes);
//!     rearm(engine.next_deadline());
//! }
//! ```
//!
//! [`Slideshow::next_deadline`]: crate::engine::Slideshow::next_deadline
//! [`Slideshow::on_tick`]: crate::engine::Slideshow::on_tick

use crate::deck::{SlideDeck, StageChanges};

/// Applies evaluated stage changes to a platform-native surface.
///
/// Both the DOM-based presenter and test doubles implement this trait,
/// enabling generic instance loops and deterministic tests.
pub trait Presenter {
    /// Applies the given [`StageChanges`] to the backing surface, reading
    /// current property values from `deck` as needed.
    fn apply(&mut self, deck: &SlideDeck, changes: &StageChanges);
}
