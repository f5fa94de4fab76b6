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

//! Play queue management.
//!
//! The queue is a user-editable FIFO of pending tracks that pre-empts
//! normal playlist advancement. The same track may appear any number of
//! times. Every mutation persists the whole queue document; the store
//! swallows write failures, so the in-memory queue always reflects what
//! the user did.

use crate::{model::Track, store::CollectionsStore};

pub struct PlayQueue {
    tracks: Vec<Track>,
    store: CollectionsStore,
}

impl PlayQueue {
    pub(crate) fn load(store: CollectionsStore) -> Self {
        let tracks = store.load_queue();
        Self { tracks, store }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Appends a track to the tail. Tracks without a source URL are
    /// silently ignored.
    pub(crate) fn enqueue(&mut self, track: Track) {
        if !track.has_source() {
            return;
        }
        self.tracks.push(track);
        self.persist();
    }

    /// Removes and returns the head of the queue.
    pub(crate) fn dequeue_front(&mut self) -> Option<Track> {
        if self.tracks.is_empty() {
            return None;
        }
        let track = self.tracks.remove(0);
        self.persist();
        Some(track)
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> Option<Track> {
        if index >= self.tracks.len() {
            return None;
        }
        let track = self.tracks.remove(index);
        self.persist();
        Some(track)
    }

    pub(crate) fn move_track(&mut self, from: usize, to: usize) {
        if from >= self.tracks.len() || from == to {
            return;
        }
        let track = self.tracks.remove(from);
        let to = to.min(self.tracks.len());
        self.tracks.insert(to, track);
        self.persist();
    }

    /// Replaces the queue order wholesale after a drag-drop, taking the
    /// widget's resulting order as the source of truth.
    pub(crate) fn set_order(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks.into_iter().filter(Track::has_source).collect();
        self.persist();
    }

    pub(crate) fn clear(&mut self) {
        self.tracks.clear();
        self.persist();
    }

    fn persist(&self) {
        self.store.save_queue(&self.tracks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue() -> (tempfile::TempDir, PlayQueue) {
        let dir = tempfile::tempdir().unwrap();
        let store = CollectionsStore::at(dir.path());
        (dir, PlayQueue::load(store))
    }

    fn track(n: u32) -> Track {
        Track::new(format!("Track {n}"), format!("https://example.com/watch?v={n}"))
    }

    #[test]
    fn dequeues_in_fifo_order() {
        let (_dir, mut queue) = queue();
        queue.enqueue(track(1));
        queue.enqueue(track(2));

        assert_eq!(queue.dequeue_front(), Some(track(1)));
        assert_eq!(queue.dequeue_front(), Some(track(2)));
        assert_eq!(queue.dequeue_front(), None);
    }

    #[test]
    fn enqueue_ignores_tracks_without_a_source_url() {
        let (_dir, mut queue) = queue();
        queue.enqueue(Track::new("broken", ""));

        assert!(queue.is_empty());
    }

    #[test]
    fn duplicates_are_allowed() {
        let (_dir, mut queue) = queue();
        queue.enqueue(track(1));
        queue.enqueue(track(1));

        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn moves_a_track_to_a_new_position() {
        let (_dir, mut queue) = queue();
        for n in 1..=4 {
            queue.enqueue(track(n));
        }

        queue.move_track(3, 0);
        assert_eq!(queue.tracks(), &[track(4), track(1), track(2), track(3)]);

        queue.move_track(0, 99);
        assert_eq!(queue.tracks(), &[track(1), track(2), track(3), track(4)]);
    }

    #[test]
    fn set_order_replaces_the_queue_wholesale() {
        let (_dir, mut queue) = queue();
        queue.enqueue(track(1));
        queue.enqueue(track(2));

        queue.set_order(vec![track(2), track(1), track(2)]);
        assert_eq!(queue.tracks(), &[track(2), track(1), track(2)]);
    }

    #[test]
    fn every_mutation_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let store = CollectionsStore::at(dir.path());

        let mut queue = PlayQueue::load(store.clone());
        queue.enqueue(track(1));
        queue.enqueue(track(2));
        queue.dequeue_front();

        assert_eq!(store.load_queue(), vec![track(2)]);

        queue.clear();
        assert!(store.load_queue().is_empty());
    }
}
