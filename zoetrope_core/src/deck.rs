// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-slide visual state with multi-channel dirty tracking.
//!
//! [`SlideDeck`] is the engine's model of what each slide should look
//! like: a role marker (active/previous/idle), an opacity target, a
//! stacking order, and a visibility flag. Mutations automatically mark
//! the corresponding dirty channel (via [`understory_dirty`]);
//! [`evaluate`](SlideDeck::evaluate) drains every channel into a
//! [`StageChanges`] value that the backend's presenter consumes to apply
//! incremental DOM updates.
//!
//! All four channels are local-only: a slide deck is a flat slot list,
//! so no propagation graph or dependency edges exist. Slides are
//! addressed by their 1-based index everywhere, matching the rest of the
//! engine; `StageChanges` carries the same 1-based indices.

use alloc::vec;
use alloc::vec::Vec;

use understory_dirty::{Channel, DirtyTracker};

/// Role marker changed — the presenter retargets active/previous classes.
pub const ROLE: Channel = Channel::new(0);

/// Opacity target changed.
pub const OPACITY: Channel = Channel::new(1);

/// Stacking order changed.
pub const STACKING: Channel = Channel::new(2);

/// Visibility flag changed.
pub const VISIBILITY: Channel = Channel::new(3);

/// The part a slide currently plays in the stage composition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SlideRole {
    /// Not involved in the current change.
    #[default]
    Idle,
    /// The current (or incoming) slide.
    Active,
    /// The outgoing slide during a crossfade.
    Previous,
}

/// The set of changes produced by a single [`SlideDeck::evaluate`] call.
///
/// Each field contains the 1-based indices of slides whose corresponding
/// property changed, in ascending order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StageChanges {
    /// Slides whose role marker changed.
    pub roles: Vec<u32>,
    /// Slides whose opacity target changed.
    pub opacities: Vec<u32>,
    /// Slides whose stacking order changed.
    pub stacking: Vec<u32>,
    /// Slides whose visibility flag changed.
    pub visibility: Vec<u32>,
}

impl StageChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.roles.clear();
        self.opacities.clear();
        self.stacking.clear();
        self.visibility.clear();
    }

    /// Returns whether no changes are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
            && self.opacities.is_empty()
            && self.stacking.is_empty()
            && self.visibility.is_empty()
    }
}

/// Flat per-slide visual state storage.
#[derive(Debug)]
pub struct SlideDeck {
    role: Vec<SlideRole>,
    opacity: Vec<f32>,
    stacking: Vec<i32>,
    visible: Vec<bool>,
    dirty: DirtyTracker<u32>,
}

impl SlideDeck {
    /// Creates a deck of `total` slides, all idle, transparent, and hidden.
    ///
    /// The caller stages the starting slide with
    /// [`stage_instant`](Self::stage_instant) before the first evaluate.
    #[must_use]
    pub fn new(total: u32) -> Self {
        let n = total as usize;
        Self {
            role: vec![SlideRole::Idle; n],
            opacity: vec![0.0; n],
            stacking: vec![0; n],
            visible: vec![false; n],
            dirty: DirtyTracker::new(),
        }
    }

    /// Returns the slide count.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "deck length is constructed from a u32"
    )]
    pub fn total(&self) -> u32 {
        self.role.len() as u32
    }

    // -- Property getters (read-only, no dirty marking) --

    /// Returns the role of a slide.
    #[must_use]
    pub fn role(&self, slide: u32) -> SlideRole {
        self.role[self.slot(slide)]
    }

    /// Returns the opacity target of a slide.
    #[must_use]
    pub fn opacity(&self, slide: u32) -> f32 {
        self.opacity[self.slot(slide)]
    }

    /// Returns the stacking order of a slide.
    #[must_use]
    pub fn stacking(&self, slide: u32) -> i32 {
        self.stacking[self.slot(slide)]
    }

    /// Returns whether a slide is visible.
    #[must_use]
    pub fn is_visible(&self, slide: u32) -> bool {
        self.visible[self.slot(slide)]
    }

    // -- Mutation API (auto-marks dirty, skips no-op writes) --

    /// Sets the role of a slide.
    pub fn set_role(&mut self, slide: u32, role: SlideRole) {
        let slot = self.slot(slide);
        if self.role[slot] != role {
            self.role[slot] = role;
            self.dirty.mark(slide, ROLE);
        }
    }

    /// Sets the opacity target of a slide.
    pub fn set_opacity(&mut self, slide: u32, opacity: f32) {
        let slot = self.slot(slide);
        if self.opacity[slot] != opacity {
            self.opacity[slot] = opacity;
            self.dirty.mark(slide, OPACITY);
        }
    }

    /// Sets the stacking order of a slide.
    pub fn set_stacking(&mut self, slide: u32, stacking: i32) {
        let slot = self.slot(slide);
        if self.stacking[slot] != stacking {
            self.stacking[slot] = stacking;
            self.dirty.mark(slide, STACKING);
        }
    }

    /// Sets the visibility flag of a slide.
    pub fn set_visible(&mut self, slide: u32, visible: bool) {
        let slot = self.slot(slide);
        if self.visible[slot] != visible {
            self.visible[slot] = visible;
            self.dirty.mark(slide, VISIBILITY);
        }
    }

    // -- Staging compositions --

    /// Stages `active` as the only visible slide, fully opaque.
    ///
    /// Used at attach time and for instant changes.
    pub fn stage_instant(&mut self, active: u32) {
        for slide in 1..=self.total() {
            if slide == active {
                self.set_role(slide, SlideRole::Active);
                self.set_opacity(slide, 1.0);
                self.set_stacking(slide, 1);
                self.set_visible(slide, true);
            } else {
                self.reset_slide(slide);
            }
        }
    }

    /// Stages a crossfade: `from` marked previous underneath, `to` marked
    /// active on top; every other slide is reset.
    ///
    /// Resetting the rest also restages correctly when a crossfade
    /// supersedes an in-flight one.
    pub fn stage_crossfade(&mut self, from: u32, to: u32) {
        for slide in 1..=self.total() {
            if slide == to {
                self.set_role(slide, SlideRole::Active);
                self.set_opacity(slide, 1.0);
                self.set_stacking(slide, 2);
                self.set_visible(slide, true);
            } else if slide == from {
                self.set_role(slide, SlideRole::Previous);
                self.set_opacity(slide, 0.0);
                self.set_stacking(slide, 1);
                self.set_visible(slide, true);
            } else {
                self.reset_slide(slide);
            }
        }
    }

    /// Settles the stage after a transition completes: only `active`
    /// remains visible.
    pub fn settle(&mut self, active: u32) {
        self.stage_instant(active);
    }

    fn reset_slide(&mut self, slide: u32) {
        self.set_role(slide, SlideRole::Idle);
        self.set_opacity(slide, 0.0);
        self.set_stacking(slide, 0);
        self.set_visible(slide, false);
    }

    // -- Evaluation --

    /// Drains all dirty channels and returns the set of changes.
    pub fn evaluate(&mut self) -> StageChanges {
        let mut changes = StageChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided
    /// buffer to avoid allocation.
    pub fn evaluate_into(&mut self, changes: &mut StageChanges) {
        changes.clear();
        changes.roles.extend(self.dirty.drain_sorted(ROLE));
        changes.opacities.extend(self.dirty.drain_sorted(OPACITY));
        changes.stacking.extend(self.dirty.drain_sorted(STACKING));
        changes.visibility.extend(self.dirty.drain_sorted(VISIBILITY));
        // Flat deck, no dependency edges: the topological drain yields
        // marked keys in unspecified order, so sort for determinism.
        changes.roles.sort_unstable();
        changes.opacities.sort_unstable();
        changes.stacking.sort_unstable();
        changes.visibility.sort_unstable();
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "slide indices originate from a u32 total"
    )]
    fn slot(&self, slide: u32) -> usize {
        let slot = (slide as usize).wrapping_sub(1);
        assert!(
            slot < self.role.len(),
            "slide {slide} out of range 1..={}",
            self.role.len() as u32
        );
        slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_deck_is_dark() {
        let deck = SlideDeck::new(3);
        for slide in 1..=3 {
            assert_eq!(deck.role(slide), SlideRole::Idle);
            assert_eq!(deck.opacity(slide), 0.0);
            assert!(!deck.is_visible(slide));
        }
    }

    #[test]
    fn stage_instant_shows_only_the_active_slide() {
        let mut deck = SlideDeck::new(3);
        deck.stage_instant(2);

        assert_eq!(deck.role(2), SlideRole::Active);
        assert_eq!(deck.opacity(2), 1.0);
        assert!(deck.is_visible(2));
        assert!(!deck.is_visible(1));
        assert!(!deck.is_visible(3));

        let changes = deck.evaluate();
        assert_eq!(changes.roles, &[2]);
        assert_eq!(changes.opacities, &[2]);
        assert_eq!(changes.stacking, &[2]);
        assert_eq!(changes.visibility, &[2]);
    }

    #[test]
    fn stage_crossfade_layers_incoming_over_outgoing() {
        let mut deck = SlideDeck::new(4);
        deck.stage_instant(1);
        let _ = deck.evaluate();

        deck.stage_crossfade(1, 2);
        assert_eq!(deck.role(1), SlideRole::Previous);
        assert_eq!(deck.role(2), SlideRole::Active);
        assert!(deck.stacking(2) > deck.stacking(1), "incoming stacks on top");
        assert!(deck.is_visible(1) && deck.is_visible(2));

        let changes = deck.evaluate();
        assert_eq!(changes.roles, &[1, 2]);
        assert_eq!(changes.visibility, &[2]);
    }

    #[test]
    fn settle_hides_the_outgoing_slide() {
        let mut deck = SlideDeck::new(3);
        deck.stage_instant(1);
        deck.stage_crossfade(1, 2);
        let _ = deck.evaluate();

        deck.settle(2);
        assert_eq!(deck.role(1), SlideRole::Idle);
        assert!(!deck.is_visible(1));
        assert_eq!(deck.role(2), SlideRole::Active);

        let changes = deck.evaluate();
        assert_eq!(changes.roles, &[1]);
        assert_eq!(changes.visibility, &[1]);
        assert_eq!(changes.stacking, &[1, 2]);
    }

    #[test]
    fn noop_writes_do_not_dirty() {
        let mut deck = SlideDeck::new(2);
        deck.stage_instant(1);
        let _ = deck.evaluate();

        deck.set_opacity(1, 1.0);
        deck.set_role(1, SlideRole::Active);
        let changes = deck.evaluate();
        assert!(changes.is_empty(), "idempotent writes produce no changes");
    }

    #[test]
    fn restaging_over_an_in_flight_crossfade_resets_the_stale_slide() {
        let mut deck = SlideDeck::new(3);
        deck.stage_instant(1);
        deck.stage_crossfade(1, 2);
        let _ = deck.evaluate();

        // Superseding navigation: 2 → 3 while 1 → 2 is still in flight.
        deck.stage_crossfade(2, 3);
        assert_eq!(deck.role(1), SlideRole::Idle, "stale outgoing slide reset");
        assert!(!deck.is_visible(1));
        assert_eq!(deck.role(2), SlideRole::Previous);
        assert_eq!(deck.role(3), SlideRole::Active);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn zero_index_panics() {
        let deck = SlideDeck::new(2);
        let _ = deck.role(0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn past_end_index_panics() {
        let deck = SlideDeck::new(2);
        let _ = deck.role(3);
    }
}
