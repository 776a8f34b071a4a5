// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Page-scoped instance registry.
//!
//! The orchestrator owns one [`Registry`] per page — never ambient global
//! state — mapping stable widget identifiers to instance handles for the
//! external control surface (`get-instance`, `pause-all`, …). Entries
//! preserve page order so bulk operations are deterministic; lookups are
//! linear scans, which is the right trade at per-page instance counts.
//!
//! The handle type is generic so the registry is testable without a
//! backend.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::error::SlideshowError;

/// Ordered identifier → handle map for one page.
#[derive(Debug)]
pub struct Registry<H> {
    entries: Vec<(String, H)>,
}

impl<H> Registry<H> {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns the number of registered instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns whether `identifier` is registered.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.iter().any(|(id, _)| id == identifier)
    }

    /// Registers a handle under `identifier`.
    ///
    /// Returns `false` (leaving the existing entry untouched) when the
    /// identifier is already registered — initialization is idempotent.
    pub fn insert(&mut self, identifier: &str, handle: H) -> bool {
        if self.contains(identifier) {
            return false;
        }
        self.entries.push((identifier.to_string(), handle));
        true
    }

    /// Removes and returns the handle registered under `identifier`.
    pub fn remove(&mut self, identifier: &str) -> Option<H> {
        let pos = self.entries.iter().position(|(id, _)| id == identifier)?;
        Some(self.entries.remove(pos).1)
    }

    /// Looks up a handle by identifier or `#identifier` selector.
    ///
    /// Returns [`SlideshowError::UnknownInstance`] for misses, so callers
    /// can hand the failure straight back to page code.
    pub fn resolve(&self, query: &str) -> Result<&H, SlideshowError> {
        let identifier = query.strip_prefix('#').unwrap_or(query);
        self.entries
            .iter()
            .find(|(id, _)| id == identifier)
            .map(|(_, handle)| handle)
            .ok_or_else(|| SlideshowError::UnknownInstance(identifier.to_string()))
    }

    /// Mutable variant of [`resolve`](Self::resolve).
    pub fn resolve_mut(&mut self, query: &str) -> Result<&mut H, SlideshowError> {
        let identifier = query.strip_prefix('#').unwrap_or(query);
        self.entries
            .iter_mut()
            .find(|(id, _)| id == identifier)
            .map(|(_, handle)| handle)
            .ok_or_else(|| SlideshowError::UnknownInstance(identifier.to_string()))
    }

    /// Iterates entries in registration (page) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &H)> {
        self.entries.iter().map(|(id, handle)| (id.as_str(), handle))
    }

    /// Mutable variant of [`iter`](Self::iter).
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut H)> {
        self.entries
            .iter_mut()
            .map(|(id, handle)| (id.as_str(), handle))
    }

    /// Removes and returns all entries, newest last.
    pub fn drain(&mut self) -> Vec<(String, H)> {
        core::mem::take(&mut self.entries)
    }
}

impl<H> Default for Registry<H> {
    fn default() -> Self {
        Self::new()
    }
}
