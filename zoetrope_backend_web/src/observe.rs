// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visibility and reduced-motion wiring.
//!
//! Three platform signals feed the engine's scheduler (never its index
//! state):
//!
//! - **Page visibility** — `visibilitychange` on the document.
//! - **Element visibility** — an `IntersectionObserver` at the engine's
//!   ratio threshold with a small pre-trigger margin; where the API is
//!   missing, a debounced scroll/resize fallback measures bounding rects
//!   through [`visible_ratio`] with the same threshold.
//! - **Reduced motion** — `matchMedia('(prefers-reduced-motion: reduce)')`,
//!   checked at init and observed for live preference changes.
//!
//! Resize additionally re-measures the widget height (debounced), since
//! layout changes can change what fraction of the element is on-screen.

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::Rect;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast as _;
use web_sys::{
    Document, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, MediaQueryList, MediaQueryListEvent, Window,
};

use zoetrope_core::time::Duration;
use zoetrope_core::visibility::{visible_ratio, Debouncer};

use crate::instance::{ListenerHandle, Shared};
use crate::timer::DeadlineTimer;
use crate::{now, timebase};

/// Pre-trigger margin for the intersection observer.
const OBSERVER_MARGIN: &str = "50px";

/// Quiet period for the scroll/resize fallback measurement.
const DEBOUNCE_MS: u64 = 150;

type ObserverClosure = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

/// Owns every visibility-related listener and observer for one instance.
///
/// Dropping it detaches the listeners and disconnects the observer.
pub(crate) struct VisibilityWiring {
    _listeners: Vec<ListenerHandle>,
    observer: Option<IntersectionObserver>,
    _observer_closure: Option<ObserverClosure>,
    _debounce_timer: Option<Rc<DeadlineTimer>>,
}

impl Drop for VisibilityWiring {
    fn drop(&mut self) {
        if let Some(observer) = &self.observer {
            observer.disconnect();
        }
    }
}

impl std::fmt::Debug for VisibilityWiring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityWiring")
            .field("observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

/// Wires page visibility, element visibility, and reduced motion for one
/// instance.
pub(crate) fn wire_visibility(
    shared: &Rc<Shared>,
    root: &HtmlElement,
    window: &Window,
    document: &Document,
) -> Result<VisibilityWiring, JsValue> {
    let mut listeners = Vec::new();

    wire_page_visibility(shared, document, &mut listeners)?;
    wire_reduced_motion(shared, window, &mut listeners)?;

    let (observer, observer_closure) = match wire_intersection(shared, root)? {
        Some((observer, closure)) => (Some(observer), Some(closure)),
        None => (None, None),
    };

    // The debounced scroll/resize path runs in both modes: with an
    // observer it only re-measures height, without one it also computes
    // the fallback visibility ratio.
    let debounce_timer = wire_debounced_measure(
        shared,
        root,
        window,
        observer.is_none(),
        &mut listeners,
    )?;

    Ok(VisibilityWiring {
        _listeners: listeners,
        observer,
        _observer_closure: observer_closure,
        _debounce_timer: Some(debounce_timer),
    })
}

fn wire_page_visibility(
    shared: &Rc<Shared>,
    document: &Document,
    listeners: &mut Vec<ListenerHandle>,
) -> Result<(), JsValue> {
    let page = Rc::clone(shared);
    let doc = document.clone();
    listeners.push(ListenerHandle::add(document, "visibilitychange", move |_| {
        let visible = !doc.hidden();
        page.with_engine(|engine, now| engine.set_page_visible(visible, now));
    })?);
    Ok(())
}

fn wire_reduced_motion(
    shared: &Rc<Shared>,
    window: &Window,
    listeners: &mut Vec<ListenerHandle>,
) -> Result<(), JsValue> {
    let Some(query): Option<MediaQueryList> =
        window.match_media("(prefers-reduced-motion: reduce)")?
    else {
        return Ok(());
    };

    if query.matches() {
        shared.with_engine(|engine, now| engine.set_reduced_motion(true, now));
    }

    let motion = Rc::clone(shared);
    listeners.push(ListenerHandle::add(&query, "change", move |event| {
        let Some(event) = event.dyn_ref::<MediaQueryListEvent>() else {
            return;
        };
        let reduced = event.matches();
        motion.with_engine(|engine, now| engine.set_reduced_motion(reduced, now));
    })?);
    Ok(())
}

fn wire_intersection(
    shared: &Rc<Shared>,
    root: &HtmlElement,
) -> Result<Option<(IntersectionObserver, ObserverClosure)>, JsValue> {
    let has_observer = js_sys::Reflect::has(
        &js_sys::global(),
        &JsValue::from_str("IntersectionObserver"),
    )
    .unwrap_or(false);
    if !has_observer {
        return Ok(None);
    }

    let observed = Rc::clone(shared);
    let closure: ObserverClosure = Closure::wrap(Box::new(
        move |entries: js_sys::Array, _observer: IntersectionObserver| {
            // Only the most recent entry matters.
            let Some(entry) = entries
                .get(entries.length().saturating_sub(1))
                .dyn_into::<IntersectionObserverEntry>()
                .ok()
            else {
                return;
            };
            let ratio = entry.intersection_ratio();
            observed.with_engine(|engine, now| engine.observe_element_ratio(ratio, now));
        },
    )
        as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>);

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(
        zoetrope_core::visibility::DEFAULT_RATIO_THRESHOLD,
    ));
    options.set_root_margin(OBSERVER_MARGIN);

    let observer =
        IntersectionObserver::new_with_options(closure.as_ref().unchecked_ref(), &options)?;
    observer.observe(root);

    Ok(Some((observer, closure)))
}

fn wire_debounced_measure(
    shared: &Rc<Shared>,
    root: &HtmlElement,
    window: &Window,
    measure_ratio: bool,
    listeners: &mut Vec<ListenerHandle>,
) -> Result<Rc<DeadlineTimer>, JsValue> {
    let debouncer = Rc::new(RefCell::new(Debouncer::new(Duration::from_millis(
        DEBOUNCE_MS,
        timebase(),
    ))));

    let fired = Rc::clone(shared);
    let fired_root = root.clone();
    let fired_window = window.clone();
    let fired_debouncer = Rc::clone(&debouncer);
    let timer = Rc::new(DeadlineTimer::new(move || {
        if !fired_debouncer.borrow_mut().poll(now()) {
            return;
        }
        fired.presenter.borrow().remeasure_height();
        if measure_ratio {
            let ratio = measured_ratio(&fired_root, &fired_window);
            fired.with_engine(|engine, now| engine.observe_element_ratio(ratio, now));
        }
    }));

    for kind in ["scroll", "resize"] {
        let trigger_debouncer = Rc::clone(&debouncer);
        let trigger_timer = Rc::clone(&timer);
        listeners.push(ListenerHandle::add(window, kind, move |_| {
            let at = now();
            let mut debouncer = trigger_debouncer.borrow_mut();
            debouncer.trigger(at);
            if let Some(deadline) = debouncer.deadline() {
                trigger_timer.arm_at(deadline, at);
            }
        })?);
    }

    Ok(timer)
}

/// Bounding-rect fallback: fraction of the root inside the viewport.
fn measured_ratio(root: &HtmlElement, window: &Window) -> f64 {
    let rect = root.get_bounding_client_rect();
    let element = Rect::new(
        rect.left(),
        rect.top(),
        rect.left() + rect.width(),
        rect.top() + rect.height(),
    );
    let width = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    visible_ratio(element, Rect::new(0.0, 0.0, width, height))
}
