// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer, touch, keyboard, and hover wiring.
//!
//! One behavior, two possible low-level sources: the unified pointer-event
//! API when the browser has it, else discrete touch events. Both feed
//! the engine's gesture recognizer; default scrolling is suppressed only
//! once the recognizer reports a committed horizontal drag. Keyboard
//! arrows map to navigation intents, and mouseenter/mouseleave drive the
//! hover suspend source.

use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast as _;
use web_sys::{Event, HtmlElement, KeyboardEvent, PointerEvent, TouchEvent};

use zoetrope_core::engine::NavKey;
use zoetrope_core::gesture::PointerSource;

use crate::instance::{ListenerHandle, Shared};

/// Attaches every input listener for one instance to its root element.
///
/// Returns the handles; dropping them detaches the listeners.
pub(crate) fn wire_input(
    shared: &Rc<Shared>,
    root: &HtmlElement,
) -> Result<Vec<ListenerHandle>, JsValue> {
    let mut handles = Vec::new();

    if has_pointer_events() {
        wire_pointer(shared, root, &mut handles)?;
    } else {
        wire_touch(shared, root, &mut handles)?;
    }
    wire_keyboard(shared, root, &mut handles)?;
    wire_hover(shared, root, &mut handles)?;

    Ok(handles)
}

fn has_pointer_events() -> bool {
    js_sys::Reflect::has(&js_sys::global(), &JsValue::from_str("PointerEvent")).unwrap_or(false)
}

fn pointer_source(event: &PointerEvent) -> PointerSource {
    match event.pointer_type().as_str() {
        "mouse" => PointerSource::Mouse,
        "pen" => PointerSource::Pen,
        _ => PointerSource::Touch,
    }
}

fn wire_pointer(
    shared: &Rc<Shared>,
    root: &HtmlElement,
    handles: &mut Vec<ListenerHandle>,
) -> Result<(), JsValue> {
    let down = Rc::clone(shared);
    handles.push(ListenerHandle::add(root, "pointerdown", move |event| {
        if let Some(event) = event.dyn_ref::<PointerEvent>() {
            down.engine.borrow_mut().pointer_down(
                f64::from(event.client_x()),
                f64::from(event.client_y()),
                pointer_source(event),
            );
        }
    })?);

    let moved = Rc::clone(shared);
    handles.push(ListenerHandle::add(root, "pointermove", move |event| {
        if let Some(pointer) = event.dyn_ref::<PointerEvent>() {
            let drag = moved.engine.borrow_mut().pointer_move(
                f64::from(pointer.client_x()),
                f64::from(pointer.client_y()),
            );
            if drag {
                event.prevent_default();
            }
        }
    })?);

    let up = Rc::clone(shared);
    handles.push(ListenerHandle::add(root, "pointerup", move |event| {
        if let Some(event) = event.dyn_ref::<PointerEvent>() {
            let x = f64::from(event.client_x());
            let y = f64::from(event.client_y());
            up.with_engine(|engine, now| {
                let _ = engine.pointer_up(x, y, now);
            });
        }
    })?);

    let cancel = Rc::clone(shared);
    handles.push(ListenerHandle::add(root, "pointercancel", move |_| {
        cancel.engine.borrow_mut().pointer_cancel();
    })?);

    Ok(())
}

fn touch_point(event: &Event) -> Option<(f64, f64)> {
    let touch = event.dyn_ref::<TouchEvent>()?.changed_touches().get(0)?;
    Some((f64::from(touch.client_x()), f64::from(touch.client_y())))
}

fn wire_touch(
    shared: &Rc<Shared>,
    root: &HtmlElement,
    handles: &mut Vec<ListenerHandle>,
) -> Result<(), JsValue> {
    let down = Rc::clone(shared);
    handles.push(ListenerHandle::add(root, "touchstart", move |event| {
        if let Some((x, y)) = touch_point(&event) {
            down.engine
                .borrow_mut()
                .pointer_down(x, y, PointerSource::Touch);
        }
    })?);

    let moved = Rc::clone(shared);
    handles.push(ListenerHandle::add(root, "touchmove", move |event| {
        if let Some((x, y)) = touch_point(&event) {
            if moved.engine.borrow_mut().pointer_move(x, y) {
                event.prevent_default();
            }
        }
    })?);

    let up = Rc::clone(shared);
    handles.push(ListenerHandle::add(root, "touchend", move |event| {
        if let Some((x, y)) = touch_point(&event) {
            up.with_engine(|engine, now| {
                let _ = engine.pointer_up(x, y, now);
            });
        }
    })?);

    let cancel = Rc::clone(shared);
    handles.push(ListenerHandle::add(root, "touchcancel", move |_| {
        cancel.engine.borrow_mut().pointer_cancel();
    })?);

    Ok(())
}

fn wire_keyboard(
    shared: &Rc<Shared>,
    root: &HtmlElement,
    handles: &mut Vec<ListenerHandle>,
) -> Result<(), JsValue> {
    let keys = Rc::clone(shared);
    handles.push(ListenerHandle::add(root, "keydown", move |event| {
        let Some(keyboard) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        let key = match keyboard.key().as_str() {
            "ArrowLeft" => NavKey::Previous,
            "ArrowRight" => NavKey::Next,
            _ => return,
        };
        let handled = keys.with_engine(|engine, now| engine.key_nav(key, now));
        if handled {
            event.prevent_default();
        }
    })?);
    Ok(())
}

fn wire_hover(
    shared: &Rc<Shared>,
    root: &HtmlElement,
    handles: &mut Vec<ListenerHandle>,
) -> Result<(), JsValue> {
    let enter = Rc::clone(shared);
    handles.push(ListenerHandle::add(root, "mouseenter", move |_| {
        enter.with_engine(|engine, now| engine.set_hover(true, now));
    })?);

    let leave = Rc::clone(shared);
    handles.push(ListenerHandle::add(root, "mouseleave", move |_| {
        leave.with_engine(|engine, now| engine.set_hover(false, now));
    })?);

    Ok(())
}
