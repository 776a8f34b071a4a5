// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-instance plumbing shared by every wiring module.
//!
//! [`Shared`] owns the engine, the DOM presenter, and the deadline
//! timer for one widget instance. Every DOM callback funnels through
//! [`Shared::pump`]: evaluate the deck, apply the changes, re-arm the
//! timer for the engine's next deadline. The timer's own callback holds
//! only a [`Weak`] reference, so dropping the instance breaks the cycle
//! and silences the timer.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget};

use zoetrope_core::backend::Presenter as _;
use zoetrope_core::deck::StageChanges;
use zoetrope_core::engine::Slideshow;
use zoetrope_core::time::HostTime;

use crate::presenter::DomPresenter;
use crate::timer::DeadlineTimer;
use crate::now;

/// Engine + presenter + timer for one widget instance.
pub(crate) struct Shared {
    pub(crate) engine: RefCell<Slideshow>,
    pub(crate) presenter: RefCell<DomPresenter>,
    timer: DeadlineTimer,
    changes: RefCell<StageChanges>,
}

impl Shared {
    /// Builds the shared core, wiring the timer callback to `on_tick` +
    /// pump through a weak self-reference.
    pub(crate) fn build(engine: Slideshow, presenter: DomPresenter) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            let timer = DeadlineTimer::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.on_timer();
                }
            });
            Self {
                engine: RefCell::new(engine),
                presenter: RefCell::new(presenter),
                timer,
                changes: RefCell::new(StageChanges::default()),
            }
        })
    }

    fn on_timer(&self) {
        self.engine.borrow_mut().on_tick(now());
        self.pump();
    }

    /// Runs an engine operation at the current host time, then pumps.
    pub(crate) fn with_engine<R>(&self, f: impl FnOnce(&mut Slideshow, HostTime) -> R) -> R {
        let result = f(&mut self.engine.borrow_mut(), now());
        self.pump();
        result
    }

    /// Evaluates pending deck changes into the DOM and re-arms the
    /// deadline timer.
    pub(crate) fn pump(&self) {
        let mut changes = self.changes.borrow_mut();
        let mut engine = self.engine.borrow_mut();
        engine.evaluate_into(&mut changes);
        self.presenter.borrow_mut().apply(engine.deck(), &changes);

        match engine.next_deadline() {
            Some(deadline) => self.timer.arm_at(deadline, now()),
            None => self.timer.cancel(),
        }
    }

    /// Stops the timer without touching the engine. Used during
    /// teardown, after `engine.destroy()` has already run.
    pub(crate) fn halt_timer(&self) {
        self.timer.cancel();
    }
}

impl std::fmt::Debug for Shared {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shared")
            .field("timer", &self.timer)
            .finish_non_exhaustive()
    }
}

/// A DOM event listener that detaches itself on drop.
///
/// Teardown is reverse construction order and each removal is
/// independent, so one failed detach never blocks the rest.
pub(crate) struct ListenerHandle {
    target: EventTarget,
    kind: String,
    closure: Closure<dyn FnMut(Event)>,
}

impl ListenerHandle {
    /// Attaches `handler` to `target` for events of `kind`.
    pub(crate) fn add(
        target: &EventTarget,
        kind: &str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            kind: kind.to_owned(),
            closure,
        })
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(&self.kind, self.closure.as_ref().unchecked_ref());
    }
}

impl std::fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
