// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser backend for the zoetrope slideshow engine.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`DeadlineTimer`]: `setTimeout`-based one-shot timer for engine
//!   deadlines
//! - [`DomPresenter`]: slide element management
//! - [`Orchestrator`]: per-page instance construction, registry, public
//!   control surface, and teardown
//! - Input, visibility, reduced-motion, and deep-link wiring
//!
//! Timing is pacing-only: `performance.now()` provides the monotonic
//! clock (microsecond ticks), and deadlines are scheduled through
//! `setTimeout` with no precision guarantees — which is fine, because the
//! engine's transition completion has a first-signal-wins fallback and
//! autoplay re-arms relative to the actual firing time.

mod collaborators;
mod fragment;
mod input;
mod instance;
mod observe;
mod orchestrate;
mod presenter;
mod timer;

pub use orchestrate::Orchestrator;
pub use presenter::DomPresenter;
pub use timer::DeadlineTimer;
pub use zoetrope_core::backend::Presenter;

use zoetrope_core::time::{HostTime, Timebase};

/// Returns the current host time from `performance.now()`.
///
/// The returned [`HostTime`] is in microsecond ticks. Use [`timebase`] to
/// convert to nanoseconds.
#[must_use]
pub fn now() -> HostTime {
    let ms = timer::performance_now();
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "performance.now() returns a small positive f64; µs fits in u64"
    )]
    let us = (ms * 1000.0) as u64;
    HostTime(us)
}

/// Returns the web [`Timebase`]: 1 tick = 1 µs = 1000 ns.
#[must_use]
pub fn timebase() -> Timebase {
    Timebase::new(1000, 1)
}
