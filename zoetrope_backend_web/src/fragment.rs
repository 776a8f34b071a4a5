// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! URL-fragment deep-link consumer.
//!
//! A thin layer over the engine's public surface, exactly as specified:
//! it resolves `#<identifier>-<index>` to a navigation call on load and
//! on `hashchange`, and on "slide changed" rewrites the fragment via
//! `history.replaceState` (no history entries). It holds no state of its
//! own beyond the instance identifier.

use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::Window;

use zoetrope_core::deeplink::{format_fragment, parse_fragment};
use zoetrope_core::events::{EventSink, SlideChanged};

use crate::instance::{ListenerHandle, Shared};

/// Rewrites the URL fragment as slides change.
#[derive(Debug)]
pub(crate) struct FragmentSync {
    identifier: String,
}

impl FragmentSync {
    pub(crate) fn new(identifier: String) -> Self {
        Self { identifier }
    }
}

impl EventSink for FragmentSync {
    fn on_slide_changed(&mut self, e: &SlideChanged) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Ok(history) = window.history() else {
            return;
        };
        let url = format!("#{}", format_fragment(&self.identifier, e.index));
        let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(&url));
    }
}

/// Returns the slide index the current fragment requests for
/// `identifier`, if any.
pub(crate) fn requested_index(window: &Window, identifier: &str) -> Option<u32> {
    let hash = window.location().hash().ok()?;
    let (id, index) = parse_fragment(&hash)?;
    (id == identifier).then_some(index)
}

/// Listens for `hashchange` and routes matching fragments to
/// `navigate_to`.
pub(crate) fn wire_hashchange(
    shared: &Rc<Shared>,
    window: &Window,
    identifier: String,
) -> Result<ListenerHandle, JsValue> {
    let changed = Rc::clone(shared);
    let changed_window = window.clone();
    ListenerHandle::add(window, "hashchange", move |_| {
        if let Some(index) = requested_index(&changed_window, &identifier) {
            changed.with_engine(|engine, now| {
                let _ = engine.go_to(index, now);
            });
        }
    })
}
