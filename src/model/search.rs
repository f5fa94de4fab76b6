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

//! Search results state.
//!
//! Holds the most recently applied result list. Results always replace the
//! whole list, so a late-arriving response from an earlier query simply
//! wins last.

use crate::model::Track;

pub(crate) struct SearchResults {
    tracks: Vec<Track>,
    pub(crate) in_flight: bool,
}

impl SearchResults {
    pub(crate) fn new() -> Self {
        Self {
            tracks: Vec::new(),
            in_flight: false,
        }
    }

    pub(crate) fn set_tracks(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks.into_iter().filter(Track::has_source).collect();
        self.in_flight = false;
    }

    pub(crate) fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}
