// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-page instance construction, registry, and control surface.
//!
//! [`Orchestrator`] scans the document for widget roots
//! (`[data-zoetrope]`) and builds one instance per root, idempotently.
//! Construction order is fixed — engine and presenter first, then the
//! transition hook, input, visibility, collaborators, and deep-link
//! wiring — because later components read state established by earlier
//! ones. A later component's construction failure degrades that one
//! concern: the engine keeps running, the initial slide stays visible,
//! the root is marked `zoetrope-error`, and the failure is logged rather
//! than propagated.
//!
//! # Markup contract
//!
//! | Piece | Selector |
//! |---|---|
//! | Widget root | `[data-zoetrope]` |
//! | Slides | `.zoetrope-slide` (document order = slide 1, 2, …) |
//! | Navigation dots | `[data-slide-to="<1-based index>"]` |
//! | Progress bar | `.zoetrope-progress` |
//! | Announcer region | `[data-zoetrope-live]` |
//!
//! Configuration attributes on the root (`data-interval`, `data-loop`,
//! `data-start`, `data-transition`, `data-transition-duration`,
//! `data-pause-on-hover`, `data-swipe`, `data-keyboard`, `data-paused`)
//! are parsed permissively by
//! [`SlideshowConfig::from_attrs`].

use std::rc::Rc;

use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast as _;
use web_sys::{Document, HtmlElement, TransitionEvent, Window};

use zoetrope_core::config::SlideshowConfig;
use zoetrope_core::engine::{EngineState, Slideshow};
use zoetrope_core::error::SlideshowError;
use zoetrope_core::registry::Registry;

use crate::collaborators::{Announcer, NavIndicators, ProgressBar};
use crate::fragment::{self, FragmentSync};
use crate::input::wire_input;
use crate::instance::{ListenerHandle, Shared};
use crate::observe::{wire_visibility, VisibilityWiring};
use crate::presenter::DomPresenter;
use crate::timebase;

const ROOT_SELECTOR: &str = "[data-zoetrope]";
const SLIDE_SELECTOR: &str = ".zoetrope-slide";
const DOT_SELECTOR: &str = "[data-slide-to]";
const PROGRESS_SELECTOR: &str = ".zoetrope-progress";
const LIVE_SELECTOR: &str = "[data-zoetrope-live]";
const READY_ATTR: &str = "data-zoetrope-ready";
const ERROR_CLASS: &str = "zoetrope-error";

const CONFIG_ATTRS: &[&str] = &[
    "data-interval",
    "data-loop",
    "data-start",
    "data-transition",
    "data-transition-duration",
    "data-pause-on-hover",
    "data-swipe",
    "data-keyboard",
    "data-paused",
];

/// One constructed widget instance, held by the registry.
struct Instance {
    shared: Rc<Shared>,
    root: HtmlElement,
    listeners: Vec<ListenerHandle>,
    visibility: Option<VisibilityWiring>,
}

impl Instance {
    /// Tears down in reverse construction order; each step is
    /// independent, so nothing here can block the rest.
    fn teardown(mut self) {
        self.visibility.take();
        self.listeners.clear();
        self.shared.engine.borrow_mut().destroy();
        self.shared.halt_timer();
        let _ = self.root.remove_attribute(READY_ATTR);
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

/// Builds, registers, controls, and tears down the page's widget
/// instances.
#[derive(Debug)]
pub struct Orchestrator {
    window: Window,
    document: Document,
    registry: Registry<Instance>,
    anonymous: u32,
}

impl Orchestrator {
    /// Creates an orchestrator over the current document.
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        Ok(Self {
            window,
            document,
            registry: Registry::new(),
            anonymous: 0,
        })
    }

    /// Builds an instance for every widget root in the document.
    ///
    /// Roots that are already initialized are skipped; a root that fails
    /// outright (no slides) is marked errored and skipped. Returns the
    /// number of live instances built by this pass.
    pub fn init_all(&mut self) -> usize {
        let mut built = 0;
        let Ok(roots) = self.document.query_selector_all(ROOT_SELECTOR) else {
            return 0;
        };
        for i in 0..roots.length() {
            let Some(root) = roots.get(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
                continue;
            };
            match self.attach(&root) {
                Ok(_) => built += 1,
                Err(error) => {
                    warn!(%error, "zoetrope root skipped");
                }
            }
        }
        built
    }

    /// Builds one instance for `root`.
    ///
    /// Idempotent: a root that is already initialized keeps its existing
    /// instance and this returns its identifier.
    pub fn attach(&mut self, root: &HtmlElement) -> Result<String, SlideshowError> {
        if let Some(existing) = root.get_attribute(READY_ATTR) {
            return Ok(existing);
        }

        let identifier = self.identifier_for(root);
        let slides = self.collect(root, SLIDE_SELECTOR);
        if slides.is_empty() {
            let _ = root.class_list().add_1(ERROR_CLASS);
            warn!(identifier = %identifier, "widget root has no slides");
            return Err(SlideshowError::NoSlides);
        }

        // -- Phase 1: engine + presenter (must succeed) --

        let mut config = self.read_config(root, u32::try_from(slides.len()).unwrap_or(u32::MAX));
        if let Some(index) = fragment::requested_index(&self.window, &identifier) {
            // Deep link wins over the configured start slide.
            config.start_index = index;
        }
        let interval_ms = config.autoplay_interval_ms;

        let engine = Slideshow::new(config, timebase()).inspect_err(|error| {
            let _ = root.class_list().add_1(ERROR_CLASS);
            warn!(identifier = %identifier, %error, "engine construction failed");
        })?;

        let presenter = DomPresenter::new(root.clone(), slides);
        presenter.set_fade_durations(
            engine.fade_durations().0,
            engine.fade_durations().1,
            timebase(),
        );
        presenter.remeasure_height();

        let shared = Shared::build(engine, presenter);
        let mut listeners = Vec::new();

        // -- Phase 2: observers, each failure isolated --

        match wire_transition_hook(&shared, root) {
            Ok(handle) => listeners.push(handle),
            Err(error) => degraded(root, "transition-hook", &error),
        }

        match wire_input(&shared, root) {
            Ok(mut handles) => listeners.append(&mut handles),
            Err(error) => degraded(root, "input", &error),
        }

        let visibility = match wire_visibility(&shared, root, &self.window, &self.document) {
            Ok(wiring) => Some(wiring),
            Err(error) => {
                degraded(root, "visibility", &error);
                None
            }
        };

        if let Err(error) = self.wire_collaborators(&shared, root, interval_ms, &mut listeners) {
            degraded(root, "collaborators", &error);
        }

        shared
            .engine
            .borrow_mut()
            .add_sink(Box::new(FragmentSync::new(identifier.clone())));
        match fragment::wire_hashchange(&shared, &self.window, identifier.clone()) {
            Ok(handle) => listeners.push(handle),
            Err(error) => degraded(root, "deep-link", &error),
        }

        // -- Go live --

        shared.with_engine(|engine, now| engine.initialize(now));
        let _ = root.set_attribute(READY_ATTR, &identifier);

        self.registry.insert(
            &identifier,
            Instance {
                shared,
                root: root.clone(),
                listeners,
                visibility,
            },
        );
        Ok(identifier)
    }

    // -- Public control surface --

    /// Navigates an instance to a 1-based slide index.
    ///
    /// Returns whether a navigation happened; out-of-range targets are a
    /// silent `false`.
    pub fn navigate_to(&self, query: &str, index: u32) -> Result<bool, SlideshowError> {
        let instance = self.registry.resolve(query)?;
        Ok(instance.shared.with_engine(|engine, now| engine.go_to(index, now)))
    }

    /// Advances an instance one slide.
    pub fn next(&self, query: &str) -> Result<bool, SlideshowError> {
        let instance = self.registry.resolve(query)?;
        Ok(instance.shared.with_engine(|engine, now| engine.next(now)))
    }

    /// Steps an instance back one slide.
    pub fn previous(&self, query: &str) -> Result<bool, SlideshowError> {
        let instance = self.registry.resolve(query)?;
        Ok(instance.shared.with_engine(|engine, now| engine.prev(now)))
    }

    /// Manually pauses an instance.
    pub fn pause(&self, query: &str) -> Result<(), SlideshowError> {
        let instance = self.registry.resolve(query)?;
        instance.shared.with_engine(|engine, now| engine.pause(now));
        Ok(())
    }

    /// Clears an instance's manual pause.
    pub fn resume(&self, query: &str) -> Result<(), SlideshowError> {
        let instance = self.registry.resolve(query)?;
        instance.shared.with_engine(|engine, now| engine.resume(now));
        Ok(())
    }

    /// Returns an instance's externally visible state.
    pub fn state(&self, query: &str) -> Result<EngineState, SlideshowError> {
        let instance = self.registry.resolve(query)?;
        let state = instance.shared.engine.borrow().state();
        Ok(state)
    }

    /// Returns the identifiers of all live instances, in page order.
    #[must_use]
    pub fn identifiers(&self) -> Vec<String> {
        self.registry.iter().map(|(id, _)| id.to_owned()).collect()
    }

    /// Manually pauses every instance.
    pub fn pause_all(&self) {
        for (_, instance) in self.registry.iter() {
            instance.shared.with_engine(|engine, now| engine.pause(now));
        }
    }

    /// Clears every instance's manual pause.
    pub fn resume_all(&self) {
        for (_, instance) in self.registry.iter() {
            instance.shared.with_engine(|engine, now| engine.resume(now));
        }
    }

    /// Tears one instance down and unregisters it.
    pub fn destroy(&mut self, query: &str) -> Result<(), SlideshowError> {
        let identifier = query.strip_prefix('#').unwrap_or(query);
        match self.registry.remove(identifier) {
            Some(instance) => {
                instance.teardown();
                Ok(())
            }
            None => Err(SlideshowError::UnknownInstance(identifier.to_owned())),
        }
    }

    /// Tears an instance down and rebuilds it from the current markup.
    ///
    /// Use after dynamic content replacement; configuration attributes
    /// are re-read.
    pub fn reinitialize(&mut self, query: &str) -> Result<String, SlideshowError> {
        let identifier = query.strip_prefix('#').unwrap_or(query).to_owned();
        let instance = self
            .registry
            .remove(&identifier)
            .ok_or(SlideshowError::UnknownInstance(identifier))?;
        let root = instance.root.clone();
        instance.teardown();
        self.attach(&root)
    }

    /// Tears down every instance.
    pub fn destroy_all(&mut self) {
        for (_, instance) in self.registry.drain() {
            instance.teardown();
        }
    }

    // -- Internals --

    fn identifier_for(&mut self, root: &HtmlElement) -> String {
        let id = root.id();
        if !id.is_empty() {
            return id;
        }
        if let Some(value) = root.get_attribute("data-zoetrope")
            && !value.is_empty()
        {
            return value;
        }
        self.anonymous += 1;
        format!("zoetrope-{}", self.anonymous)
    }

    fn read_config(&self, root: &HtmlElement, total: u32) -> SlideshowConfig {
        let attrs: Vec<(String, String)> = CONFIG_ATTRS
            .iter()
            .filter_map(|name| root.get_attribute(name).map(|v| ((*name).to_owned(), v)))
            .collect();
        SlideshowConfig::from_attrs(total, attrs.iter().map(|(n, v)| (n.as_str(), v.as_str())))
    }

    fn collect(&self, root: &HtmlElement, selector: &str) -> Vec<HtmlElement> {
        let mut out = Vec::new();
        if let Ok(nodes) = root.query_selector_all(selector) {
            for i in 0..nodes.length() {
                if let Some(el) = nodes.get(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) {
                    out.push(el);
                }
            }
        }
        out
    }

    /// Wires the optional UI collaborators: navigation dots (highlight +
    /// click), progress bar, and screen-reader announcer.
    fn wire_collaborators(
        &self,
        shared: &Rc<Shared>,
        root: &HtmlElement,
        interval_ms: u64,
        listeners: &mut Vec<ListenerHandle>,
    ) -> Result<(), JsValue> {
        let dots = self.collect(root, DOT_SELECTOR);
        if !dots.is_empty() {
            let initial = shared.engine.borrow().state().index;
            shared
                .engine
                .borrow_mut()
                .add_sink(Box::new(NavIndicators::new(dots.clone(), initial)));

            for dot in dots {
                let Some(target) = dot
                    .get_attribute("data-slide-to")
                    .and_then(|v| v.trim().parse::<u32>().ok())
                else {
                    continue;
                };
                let clicked = Rc::clone(shared);
                listeners.push(ListenerHandle::add(&dot, "click", move |_| {
                    clicked.with_engine(|engine, now| {
                        let _ = engine.go_to(target, now);
                    });
                })?);
            }
        }

        if let Ok(Some(bar)) = root.query_selector(PROGRESS_SELECTOR)
            && let Ok(bar) = bar.dyn_into::<HtmlElement>()
        {
            shared
                .engine
                .borrow_mut()
                .add_sink(Box::new(ProgressBar::new(bar, interval_ms)));
        }

        if let Ok(Some(region)) = root.query_selector(LIVE_SELECTOR)
            && let Ok(region) = region.dyn_into::<HtmlElement>()
        {
            shared
                .engine
                .borrow_mut()
                .add_sink(Box::new(Announcer::new(region)));
        }

        Ok(())
    }
}

/// Marks a root degraded and logs the failing component.
fn degraded(root: &HtmlElement, component: &str, error: &JsValue) {
    let _ = root.class_list().add_1(ERROR_CLASS);
    warn!(component, ?error, "zoetrope component degraded; instance continues");
}

/// Routes the native `transitionend` hook to the engine's in-flight job.
///
/// Only an opacity transition ending on the *incoming* slide counts; the
/// engine's job id makes stale or duplicate hooks harmless.
fn wire_transition_hook(
    shared: &Rc<Shared>,
    root: &HtmlElement,
) -> Result<ListenerHandle, JsValue> {
    let hooked = Rc::clone(shared);
    ListenerHandle::add(root, "transitionend", move |event| {
        let Some(transition) = event.dyn_ref::<TransitionEvent>() else {
            return;
        };
        if transition.property_name() != "opacity" {
            return;
        }
        let Some(target) = event.target().and_then(|t| t.dyn_into::<HtmlElement>().ok()) else {
            return;
        };

        let job = hooked.engine.borrow().active_job();
        let Some(job) = job else {
            return;
        };
        let is_incoming = hooked
            .presenter
            .borrow()
            .slide_element(job.to)
            .is_some_and(|el| el.is_same_node(Some(target.as_ref())));
        if is_incoming {
            hooked.with_engine(|engine, _| engine.on_animation_end(job.id));
        }
    })
}
