// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer/touch swipe recognition.
//!
//! [`SwipeRecognizer`] unifies pointer events and discrete touch events
//! behind one state machine: `Idle → Tracking → Idle`. Tracking begins on
//! a touch/pen down (mouse-class pointers are ignored — swiping is a
//! touch interaction). While tracking, horizontal movement beyond a small
//! move threshold that dominates vertical movement marks the session as a
//! drag; the backend uses that to suppress default scroll handling. On
//! release, the total delta classifies as a [`Swipe`] when it clears the
//! drag threshold horizontally without drifting too far vertically.
//!
//! The recognizer holds one [`GestureSample`] per pointer session and
//! clears it on up/cancel; nothing persists across sessions. When swipe
//! is disabled by configuration every input is a silent no-op.

use kurbo::Point;

/// Which class of input device produced a pointer-down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerSource {
    /// A mouse. Ignored for swipe tracking.
    Mouse,
    /// A touch contact.
    Touch,
    /// A stylus.
    Pen,
}

/// A classified horizontal swipe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Swipe {
    /// Rightward drag: navigate to the previous slide.
    Previous,
    /// Leftward drag: navigate to the next slide.
    Next,
}

/// The recognizer's reaction to a pointer-move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackResponse {
    /// Not tracking (idle, disabled, or mouse session).
    Ignored,
    /// Tracking, but movement has not yet committed to a horizontal drag.
    Tracking,
    /// Horizontal drag in progress: suppress default scroll behavior.
    Drag,
}

/// Thresholds for swipe classification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureConfig {
    /// Whether swipe recognition is enabled at all.
    pub enabled: bool,
    /// Total horizontal travel (px) required to classify a swipe.
    pub drag_threshold: f64,
    /// Movement (px) at which a session commits to being a drag.
    pub move_threshold: f64,
    /// Vertical drift tolerance as a multiple of `drag_threshold`.
    pub vertical_ratio: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            drag_threshold: 40.0,
            move_threshold: 10.0,
            vertical_ratio: 1.5,
        }
    }
}

/// Per-pointer-session tracking state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureSample {
    /// Where the session started.
    pub start: Point,
    /// Whether the session has committed to a horizontal drag.
    pub dragging: bool,
}

/// Converts low-level pointer/touch input into discrete swipe intents.
#[derive(Clone, Debug, PartialEq)]
pub struct SwipeRecognizer {
    config: GestureConfig,
    session: Option<GestureSample>,
}

impl SwipeRecognizer {
    /// Creates a recognizer with the given thresholds.
    #[must_use]
    pub const fn new(config: GestureConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    /// Returns whether a session is being tracked.
    #[must_use]
    pub const fn is_tracking(&self) -> bool {
        self.session.is_some()
    }

    /// Begins tracking on pointer/touch-down.
    ///
    /// Mouse-class pointers never start a session, and neither does a
    /// disabled recognizer.
    pub fn pointer_down(&mut self, at: Point, source: PointerSource) {
        if !self.config.enabled || matches!(source, PointerSource::Mouse) {
            return;
        }
        self.session = Some(GestureSample {
            start: at,
            dragging: false,
        });
    }

    /// Feeds a pointer-move, upgrading the session to a drag when
    /// horizontal movement passes the move threshold and dominates
    /// vertical movement.
    pub fn pointer_move(&mut self, at: Point) -> TrackResponse {
        let Some(session) = &mut self.session else {
            return TrackResponse::Ignored;
        };
        let delta = at - session.start;
        if !session.dragging
            && delta.x.abs() > self.config.move_threshold
            && delta.x.abs() > delta.y.abs()
        {
            session.dragging = true;
        }
        if session.dragging {
            TrackResponse::Drag
        } else {
            TrackResponse::Tracking
        }
    }

    /// Ends the session on pointer/touch-up, classifying a swipe.
    ///
    /// Positive horizontal delta means "previous", negative means "next".
    /// Vertical drift beyond `vertical_ratio × drag_threshold` disqualifies
    /// the gesture.
    pub fn pointer_up(&mut self, at: Point) -> Option<Swipe> {
        let session = self.session.take()?;
        let delta = at - session.start;
        let vertical_limit = self.config.vertical_ratio * self.config.drag_threshold;
        if delta.x.abs() <= self.config.drag_threshold || delta.y.abs() >= vertical_limit {
            return None;
        }
        Some(if delta.x > 0.0 {
            Swipe::Previous
        } else {
            Swipe::Next
        })
    }

    /// Aborts the session without classifying, on pointer/touch-cancel.
    pub fn cancel(&mut self) {
        self.session = None;
    }
}
