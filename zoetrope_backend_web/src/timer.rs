// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `setTimeout`-based one-shot deadline timer.
//!
//! [`DeadlineTimer`] schedules a single pending callback at a time; the
//! instance loop re-arms it for whatever
//! [`Slideshow::next_deadline`](zoetrope_core::engine::Slideshow::next_deadline)
//! reports after each engine interaction. Re-arming cancels the pending
//! timeout first, so at most one platform timer is ever live per
//! `DeadlineTimer` — the engine side of that guarantee is the
//! single-owner job/deadline model.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use zoetrope_core::time::HostTime;

// Direct global bindings instead of `web_sys::Window` methods — avoids
// fetching (and unwrapping) the Window object on every arm.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "setTimeout")]
    fn set_timeout(callback: &JsValue, delay_ms: f64) -> i32;

    #[wasm_bindgen(js_name = "clearTimeout")]
    fn clear_timeout(id: i32);
}

type TimerClosure = Closure<dyn FnMut()>;

struct TimerInner {
    /// The JS closure registered with `setTimeout`.
    ///
    /// Built once in `new()` and reused for every arm, referenced from
    /// its own `RefCell` so arming doesn't conflict with `callback`.
    closure: RefCell<Option<TimerClosure>>,

    /// The user-supplied callback invoked when the timeout fires.
    callback: RefCell<Box<dyn FnMut()>>,

    /// The pending timeout id, if armed.
    timeout_id: Cell<Option<i32>>,
}

/// A one-shot timer that fires a callback at a scheduled deadline.
///
/// Create with [`DeadlineTimer::new`], then [`arm`](Self::arm) (or
/// [`arm_at`](Self::arm_at)) as deadlines come and go. Dropping the timer
/// cancels any pending timeout.
pub struct DeadlineTimer {
    inner: Rc<TimerInner>,
}

impl DeadlineTimer {
    /// Creates a timer that is **not yet armed**.
    pub fn new(callback: impl FnMut() + 'static) -> Self {
        let inner = Rc::new(TimerInner {
            closure: RefCell::new(None),
            callback: RefCell::new(Box::new(callback)),
            timeout_id: Cell::new(None),
        });

        let closure_inner = Rc::clone(&inner);
        let closure = Closure::wrap(Box::new(move || {
            closure_inner.timeout_id.set(None);
            // The borrow is scoped so a callback that re-arms the timer
            // doesn't conflict with itself.
            (closure_inner.callback.borrow_mut())();
        }) as Box<dyn FnMut()>);
        *inner.closure.borrow_mut() = Some(closure);

        Self { inner }
    }

    /// Schedules the callback after `delay_ms`. A pending timeout is
    /// cancelled first.
    pub fn arm(&self, delay_ms: f64) {
        self.cancel();
        if let Some(closure) = self.inner.closure.borrow().as_ref() {
            let id = set_timeout(closure.as_ref().unchecked_ref(), delay_ms.max(0.0));
            self.inner.timeout_id.set(Some(id));
        }
    }

    /// Schedules the callback for the given deadline, measured against
    /// `now` in microsecond ticks. Past deadlines fire as soon as the
    /// event loop allows.
    pub fn arm_at(&self, deadline: HostTime, now: HostTime) {
        let delay_us = deadline.saturating_duration_since(now).ticks();
        #[expect(
            clippy::cast_precision_loss,
            reason = "deadline spans are far below f64's integer range"
        )]
        self.arm(delay_us as f64 / 1000.0);
    }

    /// Cancels the pending timeout, if any.
    pub fn cancel(&self) {
        if let Some(id) = self.inner.timeout_id.take() {
            clear_timeout(id);
        }
    }

    /// Returns `true` while a timeout is pending.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.inner.timeout_id.get().is_some()
    }
}

impl Drop for DeadlineTimer {
    fn drop(&mut self) {
        self.cancel();
        // Drop the JS closure so it doesn't leak.
        self.inner.closure.borrow_mut().take();
    }
}

impl std::fmt::Debug for DeadlineTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeadlineTimer")
            .field("armed", &self.is_armed())
            .finish_non_exhaustive()
    }
}
