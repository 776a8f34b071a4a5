// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slide element management.
//!
//! Translates [`SlideDeck`] state into DOM mutations by applying
//! incremental updates from [`StageChanges`]: role marker classes
//! (`is-active` / `is-previous`), opacity, z-order, and visibility. The
//! theme's stylesheet defines the actual animation curves; this
//! presenter only moves the state markers and exposes the engine's fade
//! durations as CSS custom properties for the theme to consume.

use web_sys::HtmlElement;

use zoetrope_core::backend::Presenter;
use zoetrope_core::deck::{SlideDeck, SlideRole, StageChanges};
use zoetrope_core::time::{Duration, Timebase};

const ACTIVE_CLASS: &str = "is-active";
const PREVIOUS_CLASS: &str = "is-previous";

/// Maps a [`SlideDeck`] to live slide elements, applying incremental
/// updates from [`StageChanges`].
pub struct DomPresenter {
    container: HtmlElement,
    slides: Vec<HtmlElement>,
}

impl std::fmt::Debug for DomPresenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomPresenter")
            .field("slides", &self.slides.len())
            .finish_non_exhaustive()
    }
}

impl DomPresenter {
    /// Creates a presenter over the widget root and its slide elements,
    /// in document order (slide 1 first).
    #[must_use]
    pub fn new(container: HtmlElement, slides: Vec<HtmlElement>) -> Self {
        Self { container, slides }
    }

    /// Returns the widget root element.
    #[must_use]
    pub fn container(&self) -> &HtmlElement {
        &self.container
    }

    /// Returns the number of slide elements.
    #[must_use]
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Returns the element for a 1-based slide index, if it exists.
    #[must_use]
    pub fn slide_element(&self, slide: u32) -> Option<&HtmlElement> {
        self.slides.get((slide as usize).checked_sub(1)?)
    }

    /// Publishes the engine's fade timings as CSS custom properties on
    /// the root, for the theme's transition rules.
    pub fn set_fade_durations(&self, fade_out: Duration, fade_in: Duration, timebase: Timebase) {
        let style = self.container.style();
        let _ = style.set_property(
            "--zoetrope-fade-out",
            &format!("{}ms", fade_out.to_millis(timebase)),
        );
        let _ = style.set_property(
            "--zoetrope-fade-in",
            &format!("{}ms", fade_in.to_millis(timebase)),
        );
    }

    /// Sizes the root to the tallest slide, so absolutely positioned
    /// slides don't collapse the container. Called at attach time and on
    /// debounced resize.
    pub fn remeasure_height(&self) {
        let tallest = self
            .slides
            .iter()
            .map(|slide| slide.offset_height())
            .max()
            .unwrap_or(0);
        if tallest > 0 {
            let _ = self
                .container
                .style()
                .set_property("height", &format!("{tallest}px"));
        }
    }

    /// Marks the root as degraded after a component construction
    /// failure.
    pub fn mark_errored(&self) {
        let _ = self.container.class_list().add_1("zoetrope-error");
    }
}

impl Presenter for DomPresenter {
    /// Applies incremental changes from a [`StageChanges`] to the DOM.
    fn apply(&mut self, deck: &SlideDeck, changes: &StageChanges) {
        // 1. Role markers
        for &slide in &changes.roles {
            if let Some(el) = self.slide_element(slide) {
                let classes = el.class_list();
                match deck.role(slide) {
                    SlideRole::Active => {
                        let _ = classes.add_1(ACTIVE_CLASS);
                        let _ = classes.remove_1(PREVIOUS_CLASS);
                    }
                    SlideRole::Previous => {
                        let _ = classes.add_1(PREVIOUS_CLASS);
                        let _ = classes.remove_1(ACTIVE_CLASS);
                    }
                    SlideRole::Idle => {
                        let _ = classes.remove_1(ACTIVE_CLASS);
                        let _ = classes.remove_1(PREVIOUS_CLASS);
                    }
                }
            }
        }

        // 2. Opacity targets
        for &slide in &changes.opacities {
            if let Some(el) = self.slide_element(slide) {
                let opacity = deck.opacity(slide);
                let _ = el.style().set_property("opacity", &format!("{opacity}"));
            }
        }

        // 3. Stacking
        for &slide in &changes.stacking {
            if let Some(el) = self.slide_element(slide) {
                let stacking = deck.stacking(slide);
                let _ = el.style().set_property("z-index", &format!("{stacking}"));
            }
        }

        // 4. Visibility
        for &slide in &changes.visibility {
            if let Some(el) = self.slide_element(slide) {
                if deck.is_visible(slide) {
                    let _ = el.style().set_property("visibility", "visible");
                    let _ = el.set_attribute("aria-hidden", "false");
                } else {
                    let _ = el.style().set_property("visibility", "hidden");
                    let _ = el.set_attribute("aria-hidden", "true");
                }
            }
        }
    }
}
