// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! UI collaborator observers.
//!
//! These sinks react to engine notifications by updating markup the
//! widget already carries (markup generation itself is a theme concern):
//!
//! - [`NavIndicators`] — highlights the dot matching the current slide.
//! - [`ProgressBar`] — restarts the interval progress animation on every
//!   change and reflects autoplay running state.
//! - [`Announcer`] — writes "Slide X of Y" into an `aria-live` region
//!   for screen readers.
//!
//! Each collaborator is optional: when its markup is absent the
//! orchestrator simply doesn't construct it.

use web_sys::HtmlElement;

use zoetrope_core::events::{EventSink, SlideChanged};

const DOT_ACTIVE_CLASS: &str = "is-active";
const PROGRESS_RUNNING_CLASS: &str = "is-running";

/// Highlights the navigation dot for the current slide.
#[derive(Debug)]
pub(crate) struct NavIndicators {
    dots: Vec<HtmlElement>,
}

impl NavIndicators {
    /// Creates the observer over the root's dot elements, in document
    /// order (dot for slide 1 first).
    pub(crate) fn new(dots: Vec<HtmlElement>, initial: u32) -> Self {
        let indicators = Self { dots };
        indicators.highlight(initial);
        indicators
    }

    fn highlight(&self, index: u32) {
        for (slide, dot) in (1u32..).zip(self.dots.iter()) {
            let classes = dot.class_list();
            if slide == index {
                let _ = classes.add_1(DOT_ACTIVE_CLASS);
                let _ = dot.set_attribute("aria-current", "true");
            } else {
                let _ = classes.remove_1(DOT_ACTIVE_CLASS);
                let _ = dot.remove_attribute("aria-current");
            }
        }
    }
}

impl EventSink for NavIndicators {
    fn on_slide_changed(&mut self, e: &SlideChanged) {
        self.highlight(e.index);
    }
}

/// Restarts the interval progress animation as slides change.
#[derive(Debug)]
pub(crate) struct ProgressBar {
    bar: HtmlElement,
}

impl ProgressBar {
    /// Creates the observer, publishing the autoplay interval for the
    /// theme's animation rule.
    pub(crate) fn new(bar: HtmlElement, interval_ms: u64) -> Self {
        let _ = bar
            .style()
            .set_property("--zoetrope-interval", &format!("{interval_ms}ms"));
        Self { bar }
    }

    fn restart(&self) {
        let classes = self.bar.class_list();
        let _ = classes.remove_1(PROGRESS_RUNNING_CLASS);
        // Reading a layout property flushes styles, so re-adding the
        // class restarts the CSS animation from zero.
        let _ = self.bar.offset_width();
        let _ = classes.add_1(PROGRESS_RUNNING_CLASS);
    }
}

impl EventSink for ProgressBar {
    fn on_slide_changed(&mut self, _e: &SlideChanged) {
        self.restart();
    }

    fn on_autoplay_started(&mut self) {
        self.restart();
    }

    fn on_autoplay_stopped(&mut self) {
        let _ = self.bar.class_list().remove_1(PROGRESS_RUNNING_CLASS);
    }
}

/// Announces slide changes to assistive technology.
#[derive(Debug)]
pub(crate) struct Announcer {
    region: HtmlElement,
}

impl Announcer {
    /// Creates the observer over an `aria-live` region element.
    pub(crate) fn new(region: HtmlElement) -> Self {
        if region.get_attribute("aria-live").is_none() {
            let _ = region.set_attribute("aria-live", "polite");
        }
        Self { region }
    }
}

impl EventSink for Announcer {
    fn on_slide_changed(&mut self, e: &SlideChanged) {
        self.region
            .set_text_content(Some(&format!("Slide {} of {}", e.index, e.total)));
    }
}
