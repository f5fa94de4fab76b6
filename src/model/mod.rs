// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Domain models and core data structures.
//!
//! This module defines the central entities of the application, most
//! importantly the [`Track`] record shared by search results, the play
//! queue, favorites and playlists.

pub mod library;
pub mod queue;
pub(crate) mod search;

use serde::{Deserialize, Serialize};

/// A playable unit identified by its source URL.
///
/// The `source_url` is the stable identity of a track: membership tests and
/// deduplication compare it, never the title (titles are not unique). A
/// track is immutable once created and may be copied into any number of
/// collections, each of which owns its own copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub source_url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

impl Track {
    pub fn new(title: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source_url: source_url.into(),
            thumbnail_url: None,
        }
    }

    pub fn with_thumbnail(mut self, thumbnail_url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(thumbnail_url.into());
        self
    }

    /// A track without a source URL cannot be played or persisted; such
    /// records are dropped at every boundary rather than carried through
    /// later list operations.
    pub(crate) fn has_source(&self) -> bool {
        !self.source_url.is_empty()
    }
}
