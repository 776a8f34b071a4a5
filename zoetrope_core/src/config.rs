// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-instance widget configuration.
//!
//! [`SlideshowConfig`] is read once from the widget root's markup
//! attributes at attach time and is immutable for the lifetime of the
//! instance; changing configuration requires a reinitialize pass.
//!
//! Parsing is deliberately permissive: unknown attributes are ignored,
//! malformed values fall back to the default, and out-of-range values are
//! clamped during [`normalize`](SlideshowConfig::normalize). A widget with
//! a broken attribute still runs, it just runs with defaults.

/// The visual style used when moving from one slide to the next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// No animation; the incoming slide replaces the outgoing one at once.
    Instant,
    /// Symmetric crossfade; both slides animate over the same duration.
    #[default]
    CrossfadeClassic,
    /// Staggered crossfade; the outgoing slide fades out over roughly 70%
    /// of the duration while the incoming slide fades in over the full
    /// duration plus an overlap buffer.
    CrossfadeStaged,
    /// Fast fade-out, slow fade-in. Shares the staged timing; the visual
    /// curve difference is theme styling, not engine logic.
    CrossfadeDynamic,
}

impl TransitionKind {
    /// Parses a configuration attribute value.
    ///
    /// Returns `None` for unrecognized values.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "none" | "instant" => Some(Self::Instant),
            "crossfade" | "crossfade-classic" => Some(Self::CrossfadeClassic),
            "crossfade-staged" => Some(Self::CrossfadeStaged),
            "crossfade-dynamic" => Some(Self::CrossfadeDynamic),
            _ => None,
        }
    }

    /// Returns the canonical attribute value for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Instant => "instant",
            Self::CrossfadeClassic => "crossfade-classic",
            Self::CrossfadeStaged => "crossfade-staged",
            Self::CrossfadeDynamic => "crossfade-dynamic",
        }
    }

    /// Returns whether this kind completes without animation.
    #[must_use]
    pub const fn is_instant(self) -> bool {
        matches!(self, Self::Instant)
    }

    /// Returns whether this kind uses the staggered (staged/dynamic)
    /// timing with an overlap buffer.
    #[must_use]
    pub const fn is_staggered(self) -> bool {
        matches!(self, Self::CrossfadeStaged | Self::CrossfadeDynamic)
    }
}

/// Immutable per-instance configuration, derived from markup attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlideshowConfig {
    /// Total slide count. Must be at least 1 for a functioning instance.
    pub total: u32,
    /// Autoplay interval in milliseconds. `0` disables autoplay.
    pub autoplay_interval_ms: u64,
    /// Whether navigation wraps at the first/last slide boundary.
    pub looping: bool,
    /// Starting slide, 1-based. Clamped to `[1, total]` by
    /// [`normalize`](Self::normalize).
    pub start_index: u32,
    /// The transition style.
    pub transition: TransitionKind,
    /// Transition duration in milliseconds.
    pub transition_duration_ms: u64,
    /// Whether hovering the widget suspends autoplay.
    pub pause_on_hover: bool,
    /// Whether swipe gestures are recognized.
    pub swipe_enabled: bool,
    /// Whether arrow-key navigation is recognized.
    pub keyboard_enabled: bool,
    /// Whether the instance starts manually paused.
    pub start_paused: bool,
}

impl SlideshowConfig {
    /// Creates a configuration with defaults for the given slide count.
    #[must_use]
    pub fn new(total: u32) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Clamps fields into their valid ranges.
    ///
    /// `start_index` is clamped to `[1, total]` (when `total` is zero the
    /// index clamps to 1; such a configuration is rejected later at engine
    /// construction).
    #[must_use]
    pub fn normalize(mut self) -> Self {
        self.start_index = self.start_index.clamp(1, self.total.max(1));
        self
    }

    /// Returns whether autoplay is enabled at all by this configuration.
    #[must_use]
    pub const fn autoplay_enabled(&self) -> bool {
        self.autoplay_interval_ms > 0
    }

    /// Builds a configuration from `(name, value)` markup attribute pairs.
    ///
    /// Attribute names may carry a `data-` prefix. Unknown names are
    /// ignored; unparsable values keep the default. The result is already
    /// [`normalize`](Self::normalize)d.
    ///
    /// Recognized names: `interval`, `loop`, `start`, `transition`,
    /// `transition-duration`, `pause-on-hover`, `swipe`, `keyboard`,
    /// `paused`.
    #[must_use]
    pub fn from_attrs<'a, I>(total: u32, attrs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = Self::new(total);
        for (name, value) in attrs {
            let name = name.strip_prefix("data-").unwrap_or(name);
            match name {
                "interval" => {
                    if let Some(ms) = parse_u64(value) {
                        config.autoplay_interval_ms = ms;
                    }
                }
                "loop" => {
                    if let Some(b) = parse_bool(value) {
                        config.looping = b;
                    }
                }
                "start" => {
                    if let Some(n) = parse_u64(value) {
                        config.start_index = u32::try_from(n).unwrap_or(u32::MAX);
                    }
                }
                "transition" => {
                    if let Some(kind) = TransitionKind::parse(value) {
                        config.transition = kind;
                    }
                }
                "transition-duration" => {
                    if let Some(ms) = parse_u64(value) {
                        config.transition_duration_ms = ms;
                    }
                }
                "pause-on-hover" => {
                    if let Some(b) = parse_bool(value) {
                        config.pause_on_hover = b;
                    }
                }
                "swipe" => {
                    if let Some(b) = parse_bool(value) {
                        config.swipe_enabled = b;
                    }
                }
                "keyboard" => {
                    if let Some(b) = parse_bool(value) {
                        config.keyboard_enabled = b;
                    }
                }
                "paused" => {
                    if let Some(b) = parse_bool(value) {
                        config.start_paused = b;
                    }
                }
                _ => {}
            }
        }
        config.normalize()
    }
}

impl Default for SlideshowConfig {
    fn default() -> Self {
        Self {
            total: 1,
            autoplay_interval_ms: 5000,
            looping: true,
            start_index: 1,
            transition: TransitionKind::default(),
            transition_duration_ms: 700,
            pause_on_hover: true,
            swipe_enabled: true,
            keyboard_enabled: true,
            start_paused: false,
        }
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse().ok()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_kind_parses_canonical_names() {
        assert_eq!(TransitionKind::parse("none"), Some(TransitionKind::Instant));
        assert_eq!(
            TransitionKind::parse("instant"),
            Some(TransitionKind::Instant)
        );
        assert_eq!(
            TransitionKind::parse("crossfade-classic"),
            Some(TransitionKind::CrossfadeClassic)
        );
        assert_eq!(
            TransitionKind::parse("crossfade-staged"),
            Some(TransitionKind::CrossfadeStaged)
        );
        assert_eq!(
            TransitionKind::parse("crossfade-dynamic"),
            Some(TransitionKind::CrossfadeDynamic)
        );
        assert_eq!(TransitionKind::parse("spin"), None);
    }

    #[test]
    fn kind_round_trips_through_as_str() {
        for kind in [
            TransitionKind::Instant,
            TransitionKind::CrossfadeClassic,
            TransitionKind::CrossfadeStaged,
            TransitionKind::CrossfadeDynamic,
        ] {
            assert_eq!(TransitionKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn from_attrs_reads_known_names() {
        let attrs = [
            ("data-interval", "8000"),
            ("data-loop", "false"),
            ("data-start", "3"),
            ("data-transition", "crossfade-staged"),
            ("data-transition-duration", "400"),
            ("data-pause-on-hover", "no"),
            ("data-swipe", "off"),
            ("data-keyboard", "0"),
            ("data-paused", "yes"),
        ];
        let config = SlideshowConfig::from_attrs(5, attrs);
        assert_eq!(config.autoplay_interval_ms, 8000);
        assert!(!config.looping);
        assert_eq!(config.start_index, 3);
        assert_eq!(config.transition, TransitionKind::CrossfadeStaged);
        assert_eq!(config.transition_duration_ms, 400);
        assert!(!config.pause_on_hover);
        assert!(!config.swipe_enabled);
        assert!(!config.keyboard_enabled);
        assert!(config.start_paused);
    }

    #[test]
    fn from_attrs_ignores_unknown_and_malformed() {
        let attrs = [
            ("data-interval", "soon"),
            ("data-sparkle", "max"),
            ("data-transition", "wipe"),
        ];
        let config = SlideshowConfig::from_attrs(2, attrs);
        assert_eq!(config.autoplay_interval_ms, 5000, "malformed keeps default");
        assert_eq!(config.transition, TransitionKind::default());
    }

    #[test]
    fn normalize_clamps_start_index() {
        let mut config = SlideshowConfig::new(4);
        config.start_index = 9;
        assert_eq!(config.normalize().start_index, 4);

        let mut config = SlideshowConfig::new(4);
        config.start_index = 0;
        assert_eq!(config.normalize().start_index, 1);
    }

    #[test]
    fn zero_interval_disables_autoplay() {
        let mut config = SlideshowConfig::new(3);
        config.autoplay_interval_ms = 0;
        assert!(!config.autoplay_enabled());
    }
}
