// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core state machines and scheduling for the zoetrope slideshow engine.
//!
//! `zoetrope_core` owns everything a self-contained, auto-advancing carousel
//! widget needs except the platform itself: slide-index state, autoplay
//! scheduling under multiple suspend sources, transition jobs with
//! race-free completion, swipe recognition, and visibility-aware pause
//! logic. It is `no_std` compatible (with `alloc`) and makes no platform
//! calls; a backend feeds it input events and fires its deadlines.
//!
//! # Architecture
//!
//! One [`engine::Slideshow`] exists per widget instance. The backend drives
//! it in a small loop:
//!
//! ```text
//!   Backend (input + timer source)
//!       │  pointer / key / visibility / tick
//!       ▼
//!   Slideshow ──► mutates SlideMachine / AutoplayScheduler / TransitionEngine
//!       │               │
//!       │               └──► EventSink notifications (changing, changed, …)
//!       ▼
//!   SlideDeck::evaluate() ──► StageChanges ──► Presenter::apply()
//!       │
//!   Slideshow::next_deadline() ──► backend arms one timer ──► on_tick()
//! ```
//!
//! **[`machine`]** — 1-based slide-index state machine with looping/bounds
//! policy, split into plan and commit so change notifications can precede
//! the stored-index update.
//!
//! **[`scheduler`]** — autoplay deadline scheduling under five independent
//! suspend sources (manual pause, hover, page hidden, off-screen, reduced
//! motion).
//!
//! **[`transition`]** — single-owner transition jobs with generation ids;
//! exactly one completion per job no matter how the native hook and the
//! fallback deadline race.
//!
//! **[`deck`]** — per-slide visual store (role, opacity, stacking,
//! visibility) with multi-channel dirty tracking via `understory_dirty`;
//! evaluation drains the channels into [`deck::StageChanges`] for the
//! [`backend::Presenter`].
//!
//! **[`gesture`]** — pointer/touch swipe recognition.
//!
//! **[`visibility`]** — page/element visibility combination and the
//! bounding-rect fallback ratio computation.
//!
//! **[`events`]** — typed change notifications and the [`events::EventSink`]
//! observer trait.
//!
//! **[`engine`]** — the per-instance composition of all of the above.
//!
//! **[`registry`]** — page-scoped instance registry for the external
//! control surface.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod config;
pub mod deck;
pub mod deeplink;
pub mod engine;
pub mod error;
pub mod events;
pub mod gesture;
pub mod machine;
pub mod registry;
pub mod scheduler;
pub mod time;
pub mod transition;
pub mod visibility;
