// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slide-index state machine with looping/bounds policy.
//!
//! [`SlideMachine`] owns the current 1-based slide index and answers
//! navigation requests. Navigation is split into *plan* and *commit*:
//! `plan_*` computes the [`Navigation`] without touching stored state so
//! the engine can emit its "slide changing" notification first, then
//! [`commit`](SlideMachine::commit) updates the index. This is what lets
//! the changing notification observably precede the stored-index update.
//!
//! Wraparound uses 1-based modulo: `next` maps `index` to
//! `(index % total) + 1`, `prev` maps 1 to `total` and otherwise
//! decrements.

/// A planned index change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Navigation {
    /// The outgoing 1-based index.
    pub from: u32,
    /// The incoming 1-based index.
    pub to: u32,
}

/// The outcome of planning a forward step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NextPlan {
    /// Move to the contained target.
    Move(Navigation),
    /// Non-looping instance at the last slide: stay put and stop autoplay.
    EndStop,
}

/// Owns the current slide index and the looping policy.
///
/// Invariant: `1 <= index() <= total()` at all times.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlideMachine {
    index: u32,
    total: u32,
    looping: bool,
}

impl SlideMachine {
    /// Creates a machine positioned at `start`.
    ///
    /// `total` must be at least 1 and `start` within `1..=total`; the
    /// engine guarantees this via config normalization.
    ///
    /// # Panics
    ///
    /// Panics (debug builds) if `total` is zero or `start` is out of range.
    #[must_use]
    pub fn new(total: u32, start: u32, looping: bool) -> Self {
        debug_assert!(total >= 1, "slide machine needs at least one slide");
        debug_assert!(
            (1..=total).contains(&start),
            "start index must be within 1..=total"
        );
        Self {
            index: start.clamp(1, total.max(1)),
            total: total.max(1),
            looping,
        }
    }

    /// Returns the current 1-based index.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Returns the slide count.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.total
    }

    /// Returns whether navigation wraps at the boundaries.
    #[must_use]
    pub const fn looping(&self) -> bool {
        self.looping
    }

    /// Plans a jump to slide `n`.
    ///
    /// Out-of-range targets and the current index both yield `None`
    /// (a silent no-op, not an error).
    #[must_use]
    pub const fn plan_to(&self, n: u32) -> Option<Navigation> {
        if n < 1 || n > self.total || n == self.index {
            return None;
        }
        Some(Navigation {
            from: self.index,
            to: n,
        })
    }

    /// Plans a forward step.
    #[must_use]
    pub const fn plan_next(&self) -> NextPlan {
        if self.looping {
            // 1-based modulo: last slide wraps to 1.
            NextPlan::Move(Navigation {
                from: self.index,
                to: (self.index % self.total) + 1,
            })
        } else if self.index == self.total {
            NextPlan::EndStop
        } else {
            NextPlan::Move(Navigation {
                from: self.index,
                to: self.index + 1,
            })
        }
    }

    /// Plans a backward step.
    ///
    /// Returns `None` for a non-looping instance at the first slide.
    #[must_use]
    pub const fn plan_prev(&self) -> Option<Navigation> {
        let to = if self.index == 1 {
            if !self.looping {
                return None;
            }
            self.total
        } else {
            self.index - 1
        };
        Some(Navigation {
            from: self.index,
            to,
        })
    }

    /// Commits a previously planned navigation target.
    ///
    /// Out-of-range targets are ignored, preserving the index invariant.
    pub const fn commit(&mut self, to: u32) {
        if to >= 1 && to <= self.total {
            self.index = to;
        }
    }
}
