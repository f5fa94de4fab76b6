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

//! Search and stream resolution abstractions and concrete implementations.
//!
//! A resolver turns a free-text query into a list of playable [`Track`]s,
//! and a track's source URL into a direct stream URL the audio engine can
//! open. Both calls block and are only ever made from background worker
//! threads, never from the control context.

pub mod invidious;

use crate::model::Track;

/// Interface implemented by concrete search/stream-resolution adapters.
///
/// Errors are descriptive strings suitable for showing to the user as a
/// transient message; callers do not retry.
pub trait StreamResolver: Send + Sync {
    /// Searches the provider, returning at most `limit` tracks.
    fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>, String>;

    /// Resolves a track's source URL to a directly playable stream URL.
    fn resolve_stream(&self, source_url: &str) -> Result<String, String>;
}
