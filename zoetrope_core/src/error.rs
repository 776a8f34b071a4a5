// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error taxonomy for the engine and the external control surface.
//!
//! The engine is deliberately permissive: misuse of the public API returns
//! an error value (or is silently ignored where the operation contract says
//! so), it never panics, and nothing here is fatal to the hosting page. A
//! failure degrades one widget instance only.

use alloc::string::String;

/// Failures reported by engine construction and the external control
/// surface.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SlideshowError {
    /// The widget root contained no slide elements (or a zero slide count
    /// was configured). The instance degrades to an inert no-op.
    #[error("slideshow has no slides")]
    NoSlides,

    /// An external API call referenced a slide outside `1..=total`.
    #[error("slide index {index} out of range 1..={total}")]
    IndexOutOfRange {
        /// The requested 1-based index.
        index: u32,
        /// The instance's slide count.
        total: u32,
    },

    /// An external API call referenced an identifier with no live
    /// instance behind it.
    #[error("unknown slideshow instance `{0}`")]
    UnknownInstance(String),
}
