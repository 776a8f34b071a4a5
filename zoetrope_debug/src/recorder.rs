// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements
//! [`EventSink`](zoetrope_core::events::EventSink) and encodes events
//! into a `Vec<u8>` as fixed-size little-endian records. [`decode`] reads
//! them back as an iterator of [`RecordedEvent`].

use zoetrope_core::config::TransitionKind;
use zoetrope_core::events::{
    EventSink, Initialized, PauseToggled, SlideChanged, SlideChanging, TransitionComplete,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_INITIALIZED: u8 = 1;
const TAG_SLIDE_CHANGING: u8 = 2;
const TAG_SLIDE_CHANGED: u8 = 3;
const TAG_PAUSE_TOGGLED: u8 = 4;
const TAG_AUTOPLAY_STARTED: u8 = 5;
const TAG_AUTOPLAY_STOPPED: u8 = 6;
const TAG_TRANSITION_COMPLETE: u8 = 7;
const TAG_DESTROYED: u8 = 8;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// An [`EventSink`](zoetrope_core::events::EventSink) that encodes
/// events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_kind(&mut self, kind: TransitionKind) {
        self.write_u8(match kind {
            TransitionKind::Instant => 0,
            TransitionKind::CrossfadeClassic => 1,
            TransitionKind::CrossfadeStaged => 2,
            TransitionKind::CrossfadeDynamic => 3,
        });
    }
}

impl EventSink for RecorderSink {
    fn on_initialized(&mut self, e: &Initialized) {
        self.write_u8(TAG_INITIALIZED);
        self.write_u32(e.index);
        self.write_u32(e.total);
    }

    fn on_slide_changing(&mut self, e: &SlideChanging) {
        self.write_u8(TAG_SLIDE_CHANGING);
        self.write_u32(e.from);
        self.write_u32(e.to);
    }

    fn on_slide_changed(&mut self, e: &SlideChanged) {
        self.write_u8(TAG_SLIDE_CHANGED);
        self.write_u32(e.index);
        self.write_u32(e.total);
    }

    fn on_pause_toggled(&mut self, e: &PauseToggled) {
        self.write_u8(TAG_PAUSE_TOGGLED);
        self.write_u8(u8::from(e.paused));
    }

    fn on_autoplay_started(&mut self) {
        self.write_u8(TAG_AUTOPLAY_STARTED);
    }

    fn on_autoplay_stopped(&mut self) {
        self.write_u8(TAG_AUTOPLAY_STOPPED);
    }

    fn on_transition_complete(&mut self, e: &TransitionComplete) {
        self.write_u8(TAG_TRANSITION_COMPLETE);
        self.write_u32(e.index);
        self.write_kind(e.kind);
    }

    fn on_destroyed(&mut self) {
        self.write_u8(TAG_DESTROYED);
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// A decoded event record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// `initialized {index, total}`.
    Initialized {
        /// Initial 1-based index.
        index: u32,
        /// Slide count.
        total: u32,
    },
    /// `slide changing {from, to}`.
    SlideChanging {
        /// Outgoing index.
        from: u32,
        /// Incoming index.
        to: u32,
    },
    /// `slide changed {index, total}`.
    SlideChanged {
        /// New current index.
        index: u32,
        /// Slide count.
        total: u32,
    },
    /// `pause toggled {paused}`.
    PauseToggled {
        /// Post-toggle value.
        paused: bool,
    },
    /// `autoplay started`.
    AutoplayStarted,
    /// `autoplay stopped`.
    AutoplayStopped,
    /// `transition complete {index, kind}`.
    TransitionComplete {
        /// New current index.
        index: u32,
        /// The kind that ran.
        kind: TransitionKind,
    },
    /// `destroyed`.
    Destroyed,
}

/// Decodes recorded bytes back into events.
///
/// Stops at the first malformed or truncated record.
pub fn decode(bytes: &[u8]) -> impl Iterator<Item = RecordedEvent> + '_ {
    Decoder { bytes, pos: 0 }
}

struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Decoder<'_> {
    fn read_u8(&mut self) -> Option<u8> {
        let v = *self.bytes.get(self.pos)?;
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        let slice = self.bytes.get(self.pos..self.pos + 4)?;
        self.pos += 4;
        Some(u32::from_le_bytes(slice.try_into().ok()?))
    }

    fn read_kind(&mut self) -> Option<TransitionKind> {
        match self.read_u8()? {
            0 => Some(TransitionKind::Instant),
            1 => Some(TransitionKind::CrossfadeClassic),
            2 => Some(TransitionKind::CrossfadeStaged),
            3 => Some(TransitionKind::CrossfadeDynamic),
            _ => None,
        }
    }
}

impl Iterator for Decoder<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<RecordedEvent> {
        match self.read_u8()? {
            TAG_INITIALIZED => Some(RecordedEvent::Initialized {
                index: self.read_u32()?,
                total: self.read_u32()?,
            }),
            TAG_SLIDE_CHANGING => Some(RecordedEvent::SlideChanging {
                from: self.read_u32()?,
                to: self.read_u32()?,
            }),
            TAG_SLIDE_CHANGED => Some(RecordedEvent::SlideChanged {
                index: self.read_u32()?,
                total: self.read_u32()?,
            }),
            TAG_PAUSE_TOGGLED => Some(RecordedEvent::PauseToggled {
                paused: self.read_u8()? != 0,
            }),
            TAG_AUTOPLAY_STARTED => Some(RecordedEvent::AutoplayStarted),
            TAG_AUTOPLAY_STOPPED => Some(RecordedEvent::AutoplayStopped),
            TAG_TRANSITION_COMPLETE => Some(RecordedEvent::TransitionComplete {
                index: self.read_u32()?,
                kind: self.read_kind()?,
            }),
            TAG_DESTROYED => Some(RecordedEvent::Destroyed),
            _ => None,
        }
    }
}
