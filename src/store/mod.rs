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

//! Persistent collections store.
//!
//! This module persists the three user collections (favorites, the play
//! queue, and named playlists) as individual JSON documents in the
//! application data directory.
//!
//! The store is deliberately best-effort:
//!
//! * Each document is loaded once at startup. A missing or unparseable
//!   document yields an empty default; records without a source URL are
//!   dropped during load.
//! * Every save is a full-document overwrite. There is no transactional
//!   guarantee across the three documents.
//! * Write failures are logged and swallowed; the in-memory collections
//!   remain authoritative for the session.

use std::{
    collections::BTreeMap,
    fs,
    path::PathBuf,
};

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};

use crate::model::Track;

const DATA_DIR_NAME: &str = "vibetune";

const FAVORITES_FILE: &str = "favorites.json";
const QUEUE_FILE: &str = "queue.json";
const PLAYLISTS_FILE: &str = "playlists.json";

/// Handle on the on-disk collection documents.
#[derive(Debug, Clone)]
pub struct CollectionsStore {
    dir: PathBuf,
}

impl CollectionsStore {
    /// Opens the store in the platform data directory, or in `dir_override`
    /// when one is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if no data directory can be determined or the
    /// directory cannot be created. This is the only store failure that is
    /// surfaced; everything after construction is best-effort.
    pub fn open(dir_override: Option<&str>) -> Result<Self> {
        let dir = match dir_override {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .context("No data directory available on this platform")?
                .join(DATA_DIR_NAME),
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Opens the store rooted at an explicit directory.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn load_favorites(&self) -> Vec<Track> {
        prune_tracks(self.load_doc(FAVORITES_FILE))
    }

    pub fn load_queue(&self) -> Vec<Track> {
        prune_tracks(self.load_doc(QUEUE_FILE))
    }

    pub fn load_playlists(&self) -> BTreeMap<String, Vec<Track>> {
        let playlists: BTreeMap<String, Vec<Track>> = self.load_doc(PLAYLISTS_FILE);
        playlists
            .into_iter()
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, tracks)| (name, prune_tracks(tracks)))
            .collect()
    }

    pub fn save_favorites(&self, tracks: &[Track]) {
        self.save_doc(FAVORITES_FILE, &tracks);
    }

    pub fn save_queue(&self, tracks: &[Track]) {
        self.save_doc(QUEUE_FILE, &tracks);
    }

    pub fn save_playlists(&self, playlists: &BTreeMap<String, Vec<Track>>) {
        self.save_doc(PLAYLISTS_FILE, playlists);
    }

    fn load_doc<T: DeserializeOwned + Default>(&self, file: &str) -> T {
        let path = self.dir.join(file);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                log::debug!("Not loading {}: {}", path.display(), e);
                return T::default();
            }
        };
        match serde_json::from_str(&contents) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Ignoring unparseable document {}: {}", path.display(), e);
                T::default()
            }
        }
    }

    fn save_doc<T: Serialize>(&self, file: &str, value: &T) {
        let path = self.dir.join(file);
        let result = fs::create_dir_all(&self.dir)
            .map_err(anyhow::Error::from)
            .and_then(|()| serde_json::to_string(value).map_err(anyhow::Error::from))
            .and_then(|json| fs::write(&path, json).map_err(anyhow::Error::from));
        if let Err(e) = result {
            log::warn!("Failed to save {}: {}", path.display(), e);
        }
    }
}

fn prune_tracks(tracks: Vec<Track>) -> Vec<Track> {
    tracks.into_iter().filter(Track::has_source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, CollectionsStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CollectionsStore::at(dir.path());
        (dir, store)
    }

    fn track(n: u32) -> Track {
        Track::new(format!("Track {n}"), format!("https://example.com/watch?v={n}"))
    }

    #[test]
    fn missing_documents_load_as_empty_defaults() {
        let (_dir, store) = store();

        assert!(store.load_favorites().is_empty());
        assert!(store.load_queue().is_empty());
        assert!(store.load_playlists().is_empty());
    }

    #[test]
    fn corrupt_documents_load_as_empty_defaults() {
        let (dir, store) = store();
        fs::write(dir.path().join(FAVORITES_FILE), "{not json").unwrap();
        fs::write(dir.path().join(PLAYLISTS_FILE), "[1, 2, 3]").unwrap();

        assert!(store.load_favorites().is_empty());
        assert!(store.load_playlists().is_empty());
    }

    #[test]
    fn collections_round_trip_preserving_order_and_content() {
        let (_dir, store) = store();

        let favorites = vec![track(3), track(1), track(2)];
        let queue = vec![track(1), track(1), track(4)];
        let playlists: BTreeMap<String, Vec<Track>> = BTreeMap::from([
            ("Morning".to_string(), vec![track(5), track(6)]),
            ("Workout".to_string(), vec![track(6), track(6)]),
        ]);

        store.save_favorites(&favorites);
        store.save_queue(&queue);
        store.save_playlists(&playlists);

        assert_eq!(store.load_favorites(), favorites);
        assert_eq!(store.load_queue(), queue);
        assert_eq!(store.load_playlists(), playlists);
    }

    #[test]
    fn records_without_a_source_url_are_dropped_on_load() {
        let (dir, store) = store();
        let doc = r#"[
            {"title": "kept", "source_url": "https://example.com/watch?v=1"},
            {"title": "no source", "source_url": ""},
            {"title": "kept too", "source_url": "https://example.com/watch?v=2", "thumbnail_url": null}
        ]"#;
        fs::write(dir.path().join(QUEUE_FILE), doc).unwrap();

        let queue = store.load_queue();
        let titles: Vec<&str> = queue.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["kept", "kept too"]);
    }

    #[test]
    fn saving_overwrites_the_whole_document() {
        let (_dir, store) = store();

        store.save_queue(&[track(1), track(2)]);
        store.save_queue(&[track(9)]);

        assert_eq!(store.load_queue(), vec![track(9)]);
    }
}
