// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording and pretty-printing for zoetrope diagnostics.
//!
//! This crate provides [`EventSink`](zoetrope_core::events::EventSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`] — human-readable one-line-per-event
//!   output.
//! - [`recorder::RecorderSink`] — compact binary recording with
//!   [`recorder::decode`] for playback.

pub mod pretty;
pub mod recorder;
