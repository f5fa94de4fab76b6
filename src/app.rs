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

//! Application state and the operation surface the shell drives.
//!
//! [`App`] owns every mutable collection (the playback context, the play
//! queue, favorites, playlists, search results and the artwork cache) and
//! is only ever touched from one thread, the control context. Background
//! workers deliver their results through the event channel; the shell calls
//! [`App::pump`] (or [`App::pump_wait`]) to apply them between its own
//! operation calls.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        mpsc::{self, Receiver, Sender},
    },
    time::Duration,
};

use anyhow::{Context, Result};

use crate::{
    actions::{
        commands::{AppCommand, spawn_command_worker},
        events::{AppEvent, apply_event},
    },
    config::AppConfig,
    model::{
        Track,
        library::{Library, LibraryError},
        queue::PlayQueue,
        search::SearchResults,
    },
    playback::{self, Playback},
    player::{AudioPlayer, PlayerState},
    resolver::{StreamResolver, invidious::InvidiousResolver},
    store::CollectionsStore,
    util::format::{format_progress, format_time},
};

const NOW_PLAYING_MAX_CHARS: usize = 60;

/// Application state.
pub struct App {
    pub(crate) config: AppConfig,

    event_tx: Sender<AppEvent>,
    event_rx: Receiver<AppEvent>,

    pub(crate) command_tx: Sender<AppCommand>,

    pub(crate) audio_player: AudioPlayer,

    pub(crate) playback: Playback,
    pub(crate) queue: PlayQueue,
    pub(crate) library: Library,
    pub(crate) search: SearchResults,

    pub(crate) artwork: HashMap<String, Vec<u8>>,
    pub(crate) selected_playlist: Option<String>,

    pub(crate) player_state: PlayerState,
    pub(crate) player_available: bool,
    pub(crate) notice: Option<String>,
}

impl App {
    /// Creates the application with its full production stack: the
    /// Invidious-backed resolver and an MPV-backed audio engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistent store directory cannot be set up
    /// or the engine worker cannot be spawned. An engine that spawns but
    /// cannot initialize its runtime library is not an error here; it
    /// reports itself through the event channel and playback degrades to
    /// no-ops.
    pub fn new(config: AppConfig) -> Result<Self> {
        let store = CollectionsStore::open(config.data_dir.as_deref())
            .context("Failed to open collections store")?;
        let resolver: Arc<dyn StreamResolver> =
            Arc::new(InvidiousResolver::new(&config.api_endpoint));

        let (event_tx, event_rx) = mpsc::channel();
        let audio_player =
            AudioPlayer::new(event_tx.clone()).context("Failed to start audio player")?;

        Self::assemble(config, store, resolver, audio_player, event_tx, event_rx)
    }

    /// Creates the application around externally supplied collaborators.
    ///
    /// This is the seam for shells that bring their own resolver or engine,
    /// and for scenario tests driving the orchestration with fakes.
    pub fn with_collaborators(
        config: AppConfig,
        store: CollectionsStore,
        resolver: Arc<dyn StreamResolver>,
        audio_player: AudioPlayer,
    ) -> Result<Self> {
        let (event_tx, event_rx) = mpsc::channel();
        Self::assemble(config, store, resolver, audio_player, event_tx, event_rx)
    }

    fn assemble(
        config: AppConfig,
        store: CollectionsStore,
        resolver: Arc<dyn StreamResolver>,
        audio_player: AudioPlayer,
        event_tx: Sender<AppEvent>,
        event_rx: Receiver<AppEvent>,
    ) -> Result<Self> {
        let (command_tx, command_rx) = mpsc::channel();
        spawn_command_worker(&config, resolver, command_rx, event_tx.clone());

        let queue = PlayQueue::load(store.clone());
        let library = Library::load(store);

        let playback = Playback::new(config.default_volume);
        audio_player.set_volume(playback.volume())?;

        Ok(Self {
            config,
            event_tx,
            event_rx,
            command_tx,
            audio_player,
            playback,
            queue,
            library,
            search: SearchResults::new(),
            artwork: HashMap::new(),
            selected_playlist: None,
            player_state: PlayerState::Stopped,
            player_available: true,
            notice: None,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    // --- Event plumbing ---

    /// A sender for delivering [`AppEvent`]s into this application's event
    /// channel, for shells that integrate their own event sources.
    pub fn event_sender(&self) -> Sender<AppEvent> {
        self.event_tx.clone()
    }

    /// Applies every event currently waiting on the channel. Call this on
    /// the control context, typically once per UI tick.
    pub fn pump(&mut self) -> Result<()> {
        while let Ok(event) = self.event_rx.try_recv() {
            apply_event(self, event)?;
        }
        Ok(())
    }

    /// Waits up to `timeout` for one event, applies it and then drains the
    /// rest of the channel. Returns whether anything was applied.
    pub fn pump_wait(&mut self, timeout: Duration) -> Result<bool> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => {
                apply_event(self, event)?;
                self.pump()?;
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    /// Takes the most recent transient user-facing message, if any.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    // --- Search ---

    /// Issues a provider search. The results replace the whole result list
    /// when they arrive; a search already in flight is not cancelled.
    pub fn search(&mut self, query: &str) -> Result<()> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }
        self.search.in_flight = true;
        self.command_tx.send(AppCommand::Search(query.to_string()))?;
        Ok(())
    }

    pub fn search_results(&self) -> &[Track] {
        self.search.tracks()
    }

    pub fn search_in_flight(&self) -> bool {
        self.search.in_flight
    }

    // --- Playback ---

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    /// The engine's own notion of its state, as last reported.
    pub fn player_state(&self) -> PlayerState {
        self.player_state
    }

    pub fn is_player_available(&self) -> bool {
        self.player_available
    }

    /// Starts playback from the current search results.
    pub fn play_search_result(&mut self, index: usize) -> Result<()> {
        let tracks = self.search.tracks().to_vec();
        playback::start_from_list(self, tracks, index)
    }

    /// Starts playback from the favorites list.
    pub fn play_favorite(&mut self, index: usize) -> Result<()> {
        let tracks = self.library.favorites().to_vec();
        playback::start_from_list(self, tracks, index)
    }

    /// Starts playback from a named playlist.
    pub fn play_playlist_entry(&mut self, name: &str, index: usize) -> Result<()> {
        let Some(tracks) = self.library.playlist(name).map(|tracks| tracks.to_vec()) else {
            return Ok(());
        };
        playback::start_from_list(self, tracks, index)
    }

    /// Removes the queue entry at `index` and plays it immediately. The
    /// playlist context is left untouched.
    pub fn play_queue_entry(&mut self, index: usize) -> Result<()> {
        match self.queue.remove_at(index) {
            Some(track) => playback::start_track(self, track),
            None => Ok(()),
        }
    }

    pub fn toggle_play_pause(&mut self) -> Result<()> {
        playback::toggle_play_pause(self)
    }

    /// Manual skip to the next track. The queue pre-empts the playlist.
    pub fn next(&mut self) -> Result<()> {
        playback::advance(self, false)
    }

    /// Manual skip to the previous track. Never consults the queue.
    pub fn previous(&mut self) -> Result<()> {
        playback::retreat(self)
    }

    /// Seeks to a fraction of the current track's total length.
    pub fn seek(&mut self, fraction: f64) -> Result<()> {
        playback::seek(self, fraction)
    }

    /// Sets the volume, 0-100. The value is re-applied on every subsequent
    /// track load.
    pub fn set_volume(&mut self, percent: i32) -> Result<()> {
        playback::set_volume(self, percent)
    }

    /// Flips shuffle mode, returning the new state.
    pub fn toggle_shuffle(&mut self) -> bool {
        self.playback.shuffle = !self.playback.shuffle;
        self.playback.shuffle
    }

    /// Flips repeat mode, returning the new state.
    pub fn toggle_repeat(&mut self) -> bool {
        self.playback.repeat = !self.playback.repeat;
        self.playback.repeat
    }

    /// A headline for the shell's status line: the current track title,
    /// truncated, or a placeholder.
    pub fn now_playing_line(&self) -> String {
        match self.playback.current() {
            Some(track) => track.title.chars().take(NOW_PLAYING_MAX_CHARS).collect(),
            None => "-".to_string(),
        }
    }

    /// An elapsed/total label for the shell's seek bar, e.g. `01:23 / 03:45`.
    pub fn progress_label(&self) -> String {
        match (self.playback.time(), self.playback.duration()) {
            (Some(time), Some(duration)) => format_progress(time, duration),
            (_, Some(duration)) => format!("00:00 / {}", format_time(duration.max(0.0) as u64)),
            _ => "00:00 / 00:00".to_string(),
        }
    }

    // --- Queue ---

    pub fn queue(&self) -> &PlayQueue {
        &self.queue
    }

    /// Appends a track to the play queue. Tracks without a source URL are
    /// silently ignored.
    pub fn enqueue(&mut self, track: Track) {
        self.queue.enqueue(track);
    }

    pub fn remove_queued(&mut self, index: usize) {
        self.queue.remove_at(index);
    }

    pub fn move_queued(&mut self, from: usize, to: usize) {
        self.queue.move_track(from, to);
    }

    /// Replaces the queue order wholesale after a drag-drop; the widget's
    /// resulting order is the source of truth.
    pub fn set_queue_order(&mut self, tracks: Vec<Track>) {
        self.queue.set_order(tracks);
    }

    /// Empties the queue. Entries already dequeued by an advance are
    /// unaffected.
    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }

    // --- Favorites ---

    pub fn favorites(&self) -> &[Track] {
        self.library.favorites()
    }

    /// Whether the given source URL is currently a favorite. Lists that
    /// display a favorite marker derive it through this at render time.
    pub fn is_favorite(&self, source_url: &str) -> bool {
        self.library.is_favorite(source_url)
    }

    /// Whether the currently playing track is a favorite.
    pub fn current_is_favorite(&self) -> bool {
        self.playback
            .current()
            .is_some_and(|track| self.library.is_favorite(&track.source_url))
    }

    /// Adds or removes a favorite, returning whether the track is a
    /// favorite afterwards.
    pub fn toggle_favorite(&mut self, track: &Track) -> bool {
        self.library.toggle_favorite(track)
    }

    /// Toggles favorite status of the currently playing track, if any.
    pub fn toggle_favorite_current(&mut self) -> Option<bool> {
        let track = self.playback.current().cloned()?;
        Some(self.library.toggle_favorite(&track))
    }

    pub fn move_favorite(&mut self, from: usize, to: usize) {
        self.library.move_favorite(from, to);
    }

    pub fn remove_favorite(&mut self, index: usize) {
        self.library.remove_favorite_at(index);
    }

    /// Replaces the favorites order wholesale after a drag-drop.
    pub fn set_favorites_order(&mut self, tracks: Vec<Track>) {
        self.library.set_favorites_order(tracks);
    }

    // --- Playlists ---

    pub fn playlist_names(&self) -> Vec<&str> {
        self.library.playlist_names().collect()
    }

    pub fn playlist(&self, name: &str) -> Option<&[Track]> {
        self.library.playlist(name)
    }

    pub fn create_playlist(&mut self, name: &str) -> Result<(), LibraryError> {
        self.library.create_playlist(name)
    }

    /// Deletes a playlist as a unit. If it was the displayed playlist, the
    /// display selection is cleared.
    pub fn delete_playlist(&mut self, name: &str) -> bool {
        let existed = self.library.delete_playlist(name);
        if existed && self.selected_playlist.as_deref() == Some(name) {
            self.selected_playlist = None;
        }
        existed
    }

    pub fn add_to_playlist(&mut self, name: &str, track: Track) -> Result<(), LibraryError> {
        self.library.add_to_playlist(name, track)
    }

    pub fn remove_from_playlist(
        &mut self,
        name: &str,
        index: usize,
    ) -> Result<Option<Track>, LibraryError> {
        self.library.remove_from_playlist(name, index)
    }

    pub fn set_playlist_order(
        &mut self,
        name: &str,
        tracks: Vec<Track>,
    ) -> Result<(), LibraryError> {
        self.library.set_playlist_order(name, tracks)
    }

    /// Selects which playlist the shell is displaying, or clears the
    /// selection. Unknown names clear it.
    pub fn select_playlist(&mut self, name: Option<&str>) {
        self.selected_playlist = name
            .filter(|name| self.library.playlist(name).is_some())
            .map(str::to_string);
    }

    pub fn selected_playlist(&self) -> Option<&str> {
        self.selected_playlist.as_deref()
    }

    // --- Artwork ---

    /// Requests a background fetch of a track's thumbnail. Already-cached
    /// artwork and tracks without a thumbnail are skipped.
    pub fn request_artwork(&mut self, track: &Track) -> Result<()> {
        let Some(thumbnail_url) = track.thumbnail_url.clone() else {
            return Ok(());
        };
        if self.artwork.contains_key(&track.source_url) {
            return Ok(());
        }
        self.command_tx.send(AppCommand::FetchArtwork {
            source_url: track.source_url.clone(),
            thumbnail_url,
        })?;
        Ok(())
    }

    /// Cached artwork bytes for a source URL, if a fetch has completed.
    pub fn artwork(&self, source_url: &str) -> Option<&[u8]> {
        self.artwork.get(source_url).map(Vec::as_slice)
    }

    /// Whether any visible list still contains the given source URL. A
    /// worker result for an entry that has vanished in the meantime is
    /// discarded instead of applied.
    pub(crate) fn artwork_target_exists(&self, source_url: &str) -> bool {
        let matches = |track: &Track| track.source_url == source_url;

        self.playback.current().is_some_and(matches)
            || self.search.tracks().iter().any(matches)
            || self.queue.tracks().iter().any(matches)
            || self.library.favorites().iter().any(matches)
            || self
                .library
                .playlists()
                .any(|(_, tracks)| tracks.iter().any(matches))
    }
}
