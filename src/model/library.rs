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

//! Favorites and named playlists.
//!
//! Favorites are an ordered list, unique by source URL, toggled by a single
//! add-or-remove action. Playlists map a user-chosen name to an ordered
//! track list with no uniqueness constraint. Both collections persist on
//! every mutation.
//!
//! Favorite status of a track shown in any other list (search results, the
//! queue, a playlist) is a derived property: callers ask
//! [`Library::is_favorite`] at display time rather than storing a flag on
//! the entry.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::{model::Track, store::CollectionsStore};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LibraryError {
    #[error("playlist \"{0}\" already exists")]
    PlaylistExists(String),
    #[error("no playlist named \"{0}\"")]
    UnknownPlaylist(String),
    #[error("playlist name cannot be empty")]
    EmptyPlaylistName,
}

pub struct Library {
    favorites: Vec<Track>,
    playlists: BTreeMap<String, Vec<Track>>,
    store: CollectionsStore,
}

impl Library {
    pub(crate) fn load(store: CollectionsStore) -> Self {
        let favorites = store.load_favorites();
        let playlists = store.load_playlists();
        Self {
            favorites,
            playlists,
            store,
        }
    }

    pub fn favorites(&self) -> &[Track] {
        &self.favorites
    }

    pub fn is_favorite(&self, source_url: &str) -> bool {
        self.favorites.iter().any(|t| t.source_url == source_url)
    }

    /// Adds the track to favorites, or removes it if already present.
    /// Returns whether the track is a favorite afterwards.
    ///
    /// Adding appends; removing takes the entry out in place, leaving the
    /// order of the others untouched.
    pub(crate) fn toggle_favorite(&mut self, track: &Track) -> bool {
        if !track.has_source() {
            return false;
        }

        let now_favorite = match self
            .favorites
            .iter()
            .position(|t| t.source_url == track.source_url)
        {
            Some(index) => {
                self.favorites.remove(index);
                false
            }
            None => {
                self.favorites.push(track.clone());
                true
            }
        };

        self.persist_favorites();
        now_favorite
    }

    pub(crate) fn move_favorite(&mut self, from: usize, to: usize) {
        if from >= self.favorites.len() || from == to {
            return;
        }
        let track = self.favorites.remove(from);
        let to = to.min(self.favorites.len());
        self.favorites.insert(to, track);
        self.persist_favorites();
    }

    pub(crate) fn remove_favorite_at(&mut self, index: usize) -> Option<Track> {
        if index >= self.favorites.len() {
            return None;
        }
        let track = self.favorites.remove(index);
        self.persist_favorites();
        Some(track)
    }

    /// Replaces the favorites order wholesale after a drag-drop.
    pub(crate) fn set_favorites_order(&mut self, tracks: Vec<Track>) {
        self.favorites = tracks.into_iter().filter(Track::has_source).collect();
        self.persist_favorites();
    }

    pub fn playlist_names(&self) -> impl Iterator<Item = &str> {
        self.playlists.keys().map(String::as_str)
    }

    pub fn playlists(&self) -> impl Iterator<Item = (&str, &[Track])> {
        self.playlists
            .iter()
            .map(|(name, tracks)| (name.as_str(), tracks.as_slice()))
    }

    pub fn playlist(&self, name: &str) -> Option<&[Track]> {
        self.playlists.get(name).map(Vec::as_slice)
    }

    pub(crate) fn create_playlist(&mut self, name: &str) -> Result<(), LibraryError> {
        if name.is_empty() {
            return Err(LibraryError::EmptyPlaylistName);
        }
        if self.playlists.contains_key(name) {
            return Err(LibraryError::PlaylistExists(name.to_string()));
        }
        self.playlists.insert(name.to_string(), Vec::new());
        self.persist_playlists();
        Ok(())
    }

    /// Removes a playlist as a unit. Returns whether it existed.
    pub(crate) fn delete_playlist(&mut self, name: &str) -> bool {
        let existed = self.playlists.remove(name).is_some();
        if existed {
            self.persist_playlists();
        }
        existed
    }

    pub(crate) fn add_to_playlist(&mut self, name: &str, track: Track) -> Result<(), LibraryError> {
        if !track.has_source() {
            return Ok(());
        }
        let tracks = self
            .playlists
            .get_mut(name)
            .ok_or_else(|| LibraryError::UnknownPlaylist(name.to_string()))?;
        tracks.push(track);
        self.persist_playlists();
        Ok(())
    }

    pub(crate) fn remove_from_playlist(
        &mut self,
        name: &str,
        index: usize,
    ) -> Result<Option<Track>, LibraryError> {
        let tracks = self
            .playlists
            .get_mut(name)
            .ok_or_else(|| LibraryError::UnknownPlaylist(name.to_string()))?;
        if index >= tracks.len() {
            return Ok(None);
        }
        let track = tracks.remove(index);
        self.persist_playlists();
        Ok(Some(track))
    }

    pub(crate) fn set_playlist_order(
        &mut self,
        name: &str,
        order: Vec<Track>,
    ) -> Result<(), LibraryError> {
        let tracks = self
            .playlists
            .get_mut(name)
            .ok_or_else(|| LibraryError::UnknownPlaylist(name.to_string()))?;
        *tracks = order.into_iter().filter(Track::has_source).collect();
        self.persist_playlists();
        Ok(())
    }

    fn persist_favorites(&self) {
        self.store.save_favorites(&self.favorites);
    }

    fn persist_playlists(&self) {
        self.store.save_playlists(&self.playlists);
    }
}
