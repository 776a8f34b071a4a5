// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Page and element visibility combination.
//!
//! Two independent signals feed the autoplay predicate:
//!
//! - **Element visibility** — what fraction of the widget is on-screen,
//!   compared against a ratio threshold (default 50%). Preferentially
//!   reported by an intersection-style observer; where that API is
//!   unavailable the backend falls back to a debounced scroll/resize
//!   handler that measures bounding rects and calls
//!   [`visible_ratio`] with the same threshold.
//! - **Page visibility** — the document-level hidden/visible signal.
//!
//! [`VisibilityTracker`] folds both into edge-detected booleans; the
//! engine maps the edges onto scheduler suspend sources. Neither signal
//! ever touches index state.

use kurbo::Rect;

use crate::time::{Duration, HostTime};

/// Default fraction of the element's area that must be on-screen.
pub const DEFAULT_RATIO_THRESHOLD: f64 = 0.5;

/// Folds page and element visibility signals into edge-detected state.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibilityTracker {
    threshold: f64,
    page_visible: bool,
    element_visible: bool,
}

impl VisibilityTracker {
    /// Creates a tracker with the given ratio threshold.
    ///
    /// Both signals start visible: an instance whose observer never
    /// reports still autoplays, and the first real observation corrects
    /// the state.
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            page_visible: true,
            element_visible: true,
        }
    }

    /// Returns the ratio threshold.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns whether the page/tab is visible.
    #[must_use]
    pub const fn page_visible(&self) -> bool {
        self.page_visible
    }

    /// Returns whether the element is sufficiently on-screen.
    #[must_use]
    pub const fn element_visible(&self) -> bool {
        self.element_visible
    }

    /// Returns the combined signal.
    #[must_use]
    pub const fn visible(&self) -> bool {
        self.page_visible && self.element_visible
    }

    /// Records the document-level signal.
    ///
    /// Returns the new value when it changed, `None` otherwise.
    pub const fn set_page_visible(&mut self, visible: bool) -> Option<bool> {
        if self.page_visible == visible {
            return None;
        }
        self.page_visible = visible;
        Some(visible)
    }

    /// Records an element visibility ratio observation.
    ///
    /// Returns the new on-screen state when the threshold was crossed,
    /// `None` otherwise.
    pub fn observe_ratio(&mut self, ratio: f64) -> Option<bool> {
        let visible = ratio >= self.threshold;
        if self.element_visible == visible {
            return None;
        }
        self.element_visible = visible;
        Some(visible)
    }
}

impl Default for VisibilityTracker {
    fn default() -> Self {
        Self::new(DEFAULT_RATIO_THRESHOLD)
    }
}

/// Computes the fraction of `element` that lies within `viewport`.
///
/// This is the fallback measurement used when no intersection-style
/// observer is available: `visible_area / total_area`, 0.0 for an empty
/// element.
#[must_use]
pub fn visible_ratio(element: Rect, viewport: Rect) -> f64 {
    let total = element.area();
    if total <= 0.0 {
        return 0.0;
    }
    let visible = element.intersect(viewport).area();
    (visible / total).clamp(0.0, 1.0)
}

/// Deadline-based debouncing for scroll/resize-driven re-measurement.
///
/// Every [`trigger`](Debouncer::trigger) pushes the deadline out by the
/// configured delay; the backend arms a timer for
/// [`deadline`](Debouncer::deadline) and calls
/// [`poll`](Debouncer::poll) when it fires. Only a quiet period produces
/// a measurement pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<HostTime>,
}

impl Debouncer {
    /// Creates a debouncer with the given quiet-period delay.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Records an input burst, pushing the deadline out.
    pub fn trigger(&mut self, now: HostTime) {
        self.deadline = Some(now + self.delay);
    }

    /// Returns the pending deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<HostTime> {
        self.deadline
    }

    /// Fires the deadline if due. Returns `true` when the debounced
    /// action should run now.
    pub fn poll(&mut self, now: HostTime) -> bool {
        match self.deadline {
            Some(deadline) if deadline.is_due(now) => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drops any pending deadline.
    pub const fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_signal_edges() {
        let mut v = VisibilityTracker::default();
        assert_eq!(v.set_page_visible(true), None, "already visible");
        assert_eq!(v.set_page_visible(false), Some(false));
        assert_eq!(v.set_page_visible(false), None);
        assert_eq!(v.set_page_visible(true), Some(true));
    }

    #[test]
    fn ratio_crossing_the_threshold_edges() {
        let mut v = VisibilityTracker::new(0.5);
        assert_eq!(v.observe_ratio(0.8), None, "starts visible");
        assert_eq!(v.observe_ratio(0.3), Some(false));
        assert_eq!(v.observe_ratio(0.49), None);
        assert_eq!(v.observe_ratio(0.5), Some(true), "threshold is inclusive");
    }

    #[test]
    fn combined_signal_requires_both() {
        let mut v = VisibilityTracker::default();
        assert!(v.visible());
        let _ = v.set_page_visible(false);
        assert!(!v.visible());
        let _ = v.set_page_visible(true);
        let _ = v.observe_ratio(0.1);
        assert!(!v.visible());
    }

    #[test]
    fn fully_contained_element_is_fully_visible() {
        let viewport = Rect::new(0.0, 0.0, 1000.0, 800.0);
        let element = Rect::new(100.0, 100.0, 500.0, 400.0);
        assert_eq!(visible_ratio(element, viewport), 1.0);
    }

    #[test]
    fn half_scrolled_element_is_half_visible() {
        let viewport = Rect::new(0.0, 0.0, 1000.0, 800.0);
        // Bottom half of the element is below the fold.
        let element = Rect::new(0.0, 600.0, 1000.0, 1000.0);
        let ratio = visible_ratio(element, viewport);
        assert!((ratio - 0.5).abs() < 1e-9, "expected 0.5, got {ratio}");
    }

    #[test]
    fn off_screen_and_empty_elements_are_invisible() {
        let viewport = Rect::new(0.0, 0.0, 1000.0, 800.0);
        assert_eq!(
            visible_ratio(Rect::new(0.0, 900.0, 1000.0, 1700.0), viewport),
            0.0
        );
        assert_eq!(
            visible_ratio(Rect::new(10.0, 10.0, 10.0, 10.0), viewport),
            0.0,
            "zero-area element"
        );
    }

    #[test]
    fn debouncer_extends_on_every_trigger() {
        let mut d = Debouncer::new(Duration(150));
        d.trigger(HostTime(0));
        assert_eq!(d.deadline(), Some(HostTime(150)));
        d.trigger(HostTime(100));
        assert_eq!(d.deadline(), Some(HostTime(250)), "burst pushes the deadline");

        assert!(!d.poll(HostTime(249)));
        assert!(d.poll(HostTime(250)));
        assert!(!d.poll(HostTime(251)), "fires once per quiet period");
    }

    #[test]
    fn debouncer_cancel_drops_the_deadline() {
        let mut d = Debouncer::new(Duration(150));
        d.trigger(HostTime(0));
        d.cancel();
        assert!(!d.poll(HostTime(1000)));
    }
}
