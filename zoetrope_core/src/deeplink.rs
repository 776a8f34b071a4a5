// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! URL fragment codec for deep links.
//!
//! The deep-link layer is a thin external consumer of the engine: it
//! resolves an initial slide from the URL fragment, calls the public
//! navigation entry point, and rewrites the fragment on "slide changed".
//! Only the fragment *codec* lives in core, so the contract
//! (`#<identifier>-<1-based-index>`) is testable off-DOM.
//!
//! Identifiers may themselves contain dashes, so parsing splits at the
//! *last* dash.

use alloc::format;
use alloc::string::String;

/// Parses a `<identifier>-<index>` fragment.
///
/// A leading `#` is tolerated. Returns the identifier and the 1-based
/// index, or `None` when the shape doesn't match (no dash, empty
/// identifier, or a non-numeric / zero index).
#[must_use]
pub fn parse_fragment(fragment: &str) -> Option<(&str, u32)> {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    let (identifier, index) = fragment.rsplit_once('-')?;
    if identifier.is_empty() {
        return None;
    }
    let index: u32 = index.parse().ok()?;
    if index == 0 {
        return None;
    }
    Some((identifier, index))
}

/// Formats a fragment (without the leading `#`) for the given instance
/// identifier and 1-based index.
#[must_use]
pub fn format_fragment(identifier: &str, index: u32) -> String {
    format!("{identifier}-{index}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_fragment() {
        assert_eq!(parse_fragment("hero-3"), Some(("hero", 3)));
        assert_eq!(parse_fragment("#hero-3"), Some(("hero", 3)));
    }

    #[test]
    fn identifier_may_contain_dashes() {
        assert_eq!(
            parse_fragment("front-page-hero-12"),
            Some(("front-page-hero", 12))
        );
    }

    #[test]
    fn rejects_malformed_fragments() {
        assert_eq!(parse_fragment(""), None);
        assert_eq!(parse_fragment("hero"), None, "no dash");
        assert_eq!(parse_fragment("-3"), None, "empty identifier");
        assert_eq!(parse_fragment("hero-"), None, "empty index");
        assert_eq!(parse_fragment("hero-abc"), None, "non-numeric index");
        assert_eq!(parse_fragment("hero-0"), None, "indices are 1-based");
    }

    #[test]
    fn format_round_trips() {
        let fragment = format_fragment("front-page-hero", 4);
        assert_eq!(fragment, "front-page-hero-4");
        assert_eq!(parse_fragment(&fragment), Some(("front-page-hero", 4)));
    }
}
