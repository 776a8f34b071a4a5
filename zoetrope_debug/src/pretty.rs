// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable event output.
//!
//! [`PrettyPrintSink`] implements
//! [`EventSink`](zoetrope_core::events::EventSink) and writes one line
//! per event to a [`Write`](std::io::Write) destination (default:
//! stderr).

use std::io::Write;

use zoetrope_core::events::{
    EventSink, Initialized, PauseToggled, SlideChanged, SlideChanging, TransitionComplete,
};

/// Writes human-readable event lines to a [`Write`](std::io::Write)
/// destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> EventSink for PrettyPrintSink<W> {
    fn on_initialized(&mut self, e: &Initialized) {
        let _ = writeln!(
            self.writer,
            "[init] slide {}/{} staged",
            e.index, e.total
        );
    }

    fn on_slide_changing(&mut self, e: &SlideChanging) {
        let _ = writeln!(self.writer, "[changing] {} -> {}", e.from, e.to);
    }

    fn on_slide_changed(&mut self, e: &SlideChanged) {
        let _ = writeln!(self.writer, "[changed] now {}/{}", e.index, e.total);
    }

    fn on_pause_toggled(&mut self, e: &PauseToggled) {
        let state = if e.paused { "paused" } else { "running" };
        let _ = writeln!(self.writer, "[pause] {state}");
    }

    fn on_autoplay_started(&mut self) {
        let _ = writeln!(self.writer, "[autoplay] started");
    }

    fn on_autoplay_stopped(&mut self) {
        let _ = writeln!(self.writer, "[autoplay] stopped");
    }

    fn on_transition_complete(&mut self, e: &TransitionComplete) {
        let _ = writeln!(
            self.writer,
            "[transition] settled on {} ({})",
            e.index,
            e.kind.as_str(),
        );
    }

    fn on_destroyed(&mut self) {
        let _ = writeln!(self.writer, "[destroyed]");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_prints_a_change() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_slide_changing(&SlideChanging { from: 1, to: 2 });
        sink.on_slide_changed(&SlideChanged { index: 2, total: 5 });
        let output = String::from_utf8(sink.writer).unwrap();
        assert!(output.contains("[changing] 1 -> 2"), "got: {output}");
        assert!(output.contains("[changed] now 2/5"), "got: {output}");
    }

    #[test]
    fn pretty_prints_pause_states() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_pause_toggled(&PauseToggled { paused: true });
        sink.on_pause_toggled(&PauseToggled { paused: false });
        let output = String::from_utf8(sink.writer).unwrap();
        assert!(output.contains("[pause] paused"), "got: {output}");
        assert!(output.contains("[pause] running"), "got: {output}");
    }
}
