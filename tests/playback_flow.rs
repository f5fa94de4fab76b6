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

//! End-to-end tests for playback orchestration.
//!
//! These drive a real [`App`] with an injected fake resolver, a detached
//! player handle whose command stream the tests assert on, and a temporary
//! store directory. They cover queue pre-emption, sequential/repeat
//! advancement, end-of-list behaviour, resolution failure, stale result
//! discards and derived favorite markers.

use std::{
    sync::{Arc, mpsc::Receiver},
    time::{Duration, Instant},
};

use vibetune::{
    App, AppConfig, AppEvent, AudioPlayer, AudioPlayerCommand, CollectionsStore, PlaybackPhase,
    StreamResolver, Track,
};

// ===== Test setup =====

struct FakeResolver {
    results: Vec<Track>,
    fail_search: bool,
    failing_streams: Vec<String>,
}

impl FakeResolver {
    fn with_results(results: Vec<Track>) -> Self {
        Self {
            results,
            fail_search: false,
            failing_streams: Vec::new(),
        }
    }

    fn empty() -> Self {
        Self::with_results(Vec::new())
    }
}

impl StreamResolver for FakeResolver {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>, String> {
        if self.fail_search {
            return Err(format!("No results for \"{query}\""));
        }
        Ok(self.results.iter().take(limit).cloned().collect())
    }

    fn resolve_stream(&self, source_url: &str) -> Result<String, String> {
        if self.failing_streams.iter().any(|url| url == source_url) {
            return Err(format!("No playable stream for {source_url}"));
        }
        Ok(stream_url_for(source_url))
    }
}

fn stream_url_for(source_url: &str) -> String {
    format!("{source_url}#stream")
}

fn track(n: u32) -> Track {
    Track::new(format!("Track {n}"), format!("https://example.com/watch?v={n}"))
}

fn test_app(resolver: FakeResolver) -> (App, Receiver<AudioPlayerCommand>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = CollectionsStore::at(dir.path());
    let (player, player_rx) = AudioPlayer::detached();
    let app = App::with_collaborators(AppConfig::default(), store, Arc::new(resolver), player)
        .unwrap();
    (app, player_rx, dir)
}

fn wait_for(app: &mut App, what: &str, pred: impl Fn(&App) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !pred(app) {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        app.pump_wait(Duration::from_millis(50)).unwrap();
    }
}

fn wait_playing(app: &mut App, expected: &Track) {
    wait_for(app, "track to start playing", |app| {
        app.playback().phase() == PlaybackPhase::Playing
            && app.playback().current() == Some(expected)
    });
}

/// Simulates the engine's natural end-of-stream notification.
fn finish_track(app: &App) {
    app.event_sender().send(AppEvent::TrackFinished).unwrap();
}

fn drain(player_rx: &Receiver<AudioPlayerCommand>) -> Vec<AudioPlayerCommand> {
    player_rx.try_iter().collect()
}

fn seeded_playlist(app: &mut App, name: &str, tracks: &[Track]) {
    app.create_playlist(name).unwrap();
    for track in tracks {
        app.add_to_playlist(name, track.clone()).unwrap();
    }
}

// ===== Sequential advancement =====

#[test]
fn playlist_plays_through_and_stops_at_the_end() {
    let (mut app, player_rx, _dir) = test_app(FakeResolver::empty());
    let tracks = [track(1), track(2), track(3)];
    seeded_playlist(&mut app, "Drive", &tracks);

    app.play_playlist_entry("Drive", 0).unwrap();
    wait_playing(&mut app, &tracks[0]);
    drain(&player_rx);

    finish_track(&app);
    wait_playing(&mut app, &tracks[1]);

    finish_track(&app);
    wait_playing(&mut app, &tracks[2]);

    finish_track(&app);
    wait_for(&mut app, "playback to park at the end", |app| {
        app.playback().phase() == PlaybackPhase::StoppedAtEnd
    });

    // Nothing further was sent to the engine after the last track loaded.
    let commands = drain(&player_rx);
    let loads = commands
        .iter()
        .filter(|c| matches!(c, AudioPlayerCommand::Load(_)))
        .count();
    assert_eq!(loads, 2, "only tracks 2 and 3 load after the first drain");
}

#[test]
fn repeat_wraps_back_to_the_first_track() {
    let (mut app, _player_rx, _dir) = test_app(FakeResolver::empty());
    let tracks = [track(1), track(2), track(3)];
    seeded_playlist(&mut app, "Loop", &tracks);
    app.toggle_repeat();

    app.play_playlist_entry("Loop", 2).unwrap();
    wait_playing(&mut app, &tracks[2]);

    finish_track(&app);
    wait_playing(&mut app, &tracks[0]);
    assert_eq!(app.playback().position(), Some(0));
}

#[test]
fn manual_skip_at_the_end_stays_on_the_current_track() {
    let (mut app, _player_rx, _dir) = test_app(FakeResolver::empty());
    let tracks = [track(1), track(2)];
    seeded_playlist(&mut app, "Short", &tracks);

    app.play_playlist_entry("Short", 1).unwrap();
    wait_playing(&mut app, &tracks[1]);

    app.next().unwrap();
    app.pump().unwrap();

    assert_eq!(app.playback().phase(), PlaybackPhase::Playing);
    assert_eq!(app.playback().current(), Some(&tracks[1]));
}

#[test]
fn previous_steps_back_through_the_list() {
    let (mut app, _player_rx, _dir) = test_app(FakeResolver::empty());
    let tracks = [track(1), track(2)];
    seeded_playlist(&mut app, "Back", &tracks);

    app.play_playlist_entry("Back", 1).unwrap();
    wait_playing(&mut app, &tracks[1]);

    app.previous().unwrap();
    wait_playing(&mut app, &tracks[0]);

    // At the first entry there is nowhere further back to go.
    app.previous().unwrap();
    app.pump().unwrap();
    assert_eq!(app.playback().current(), Some(&tracks[0]));
}

// ===== Queue pre-emption =====

#[test]
fn queue_preempts_the_playlist_without_touching_its_position() {
    let (mut app, _player_rx, _dir) = test_app(FakeResolver::empty());
    let tracks = [track(1), track(2), track(3)];
    seeded_playlist(&mut app, "Mid", &tracks);

    app.play_playlist_entry("Mid", 1).unwrap();
    wait_playing(&mut app, &tracks[1]);

    let queued = track(9);
    app.enqueue(queued.clone());

    let snapshot_before = app.playback().tracks().to_vec();
    let position_before = app.playback().position();

    app.next().unwrap();
    wait_playing(&mut app, &queued);

    assert!(app.queue().is_empty());
    assert_eq!(app.playback().tracks(), snapshot_before.as_slice());
    assert_eq!(app.playback().position(), position_before);

    // With the queue drained, advancement falls back to the playlist from
    // the unchanged prior position.
    app.next().unwrap();
    wait_playing(&mut app, &tracks[2]);
}

#[test]
fn play_now_removes_exactly_that_queue_entry() {
    let (mut app, _player_rx, _dir) = test_app(FakeResolver::empty());
    app.enqueue(track(1));
    app.enqueue(track(2));
    app.enqueue(track(3));

    app.play_queue_entry(1).unwrap();
    wait_playing(&mut app, &track(2));

    assert_eq!(app.queue().tracks(), &[track(1), track(3)]);
}

// ===== Engine command stream =====

#[test]
fn loading_a_track_reapplies_the_cached_volume() {
    let (mut app, player_rx, _dir) = test_app(FakeResolver::empty());
    seeded_playlist(&mut app, "One", &[track(1)]);
    drain(&player_rx);

    app.set_volume(35).unwrap();
    app.play_playlist_entry("One", 0).unwrap();
    wait_playing(&mut app, &track(1));

    let commands = drain(&player_rx);
    let expected_stream = stream_url_for(&track(1).source_url);
    assert_eq!(
        commands,
        vec![
            AudioPlayerCommand::SetVolume(35),
            AudioPlayerCommand::Load(expected_stream),
            AudioPlayerCommand::SetVolume(35),
        ]
    );
}

#[test]
fn seek_requires_a_known_duration() {
    let (mut app, player_rx, _dir) = test_app(FakeResolver::empty());
    seeded_playlist(&mut app, "Seek", &[track(1)]);

    app.play_playlist_entry("Seek", 0).unwrap();
    wait_playing(&mut app, &track(1));
    drain(&player_rx);

    // No duration reported yet: seeking is a no-op.
    app.seek(0.5).unwrap();
    assert!(drain(&player_rx).is_empty());

    app.event_sender()
        .send(AppEvent::DurationChanged(200.0))
        .unwrap();
    app.pump().unwrap();

    app.seek(0.25).unwrap();
    assert_eq!(drain(&player_rx), vec![AudioPlayerCommand::SetTime(50.0)]);
}

#[test]
fn toggle_play_pause_is_a_no_op_while_idle_or_loading() {
    let (mut app, player_rx, _dir) = test_app(FakeResolver::empty());
    drain(&player_rx);

    app.toggle_play_pause().unwrap();
    assert_eq!(app.playback().phase(), PlaybackPhase::Idle);
    assert!(drain(&player_rx).is_empty());
}

// ===== Failure handling =====

#[test]
fn a_failed_resolution_reports_a_notice_and_goes_idle() {
    let failing = track(1);
    let resolver = FakeResolver {
        results: Vec::new(),
        fail_search: false,
        failing_streams: vec![failing.source_url.clone()],
    };
    let (mut app, player_rx, _dir) = test_app(resolver);
    seeded_playlist(&mut app, "Broken", &[failing.clone()]);
    drain(&player_rx);

    app.play_playlist_entry("Broken", 0).unwrap();
    wait_for(&mut app, "resolution failure", |app| {
        app.playback().phase() == PlaybackPhase::Idle
    });

    assert!(app.playback().current().is_none());
    let notice = app.take_notice().expect("a transient message is recorded");
    assert!(notice.contains(&failing.source_url));

    // The engine never saw the track.
    assert!(
        !drain(&player_rx)
            .iter()
            .any(|c| matches!(c, AudioPlayerCommand::Load(_)))
    );
}

#[test]
fn stale_stream_resolutions_are_discarded() {
    let (mut app, player_rx, _dir) = test_app(FakeResolver::empty());
    seeded_playlist(&mut app, "Fresh", &[track(1)]);

    app.play_playlist_entry("Fresh", 0).unwrap();
    wait_playing(&mut app, &track(1));
    drain(&player_rx);

    app.event_sender()
        .send(AppEvent::StreamResolved {
            source_url: "https://example.com/watch?v=stale".to_string(),
            stream_url: "https://example.com/stale#stream".to_string(),
        })
        .unwrap();
    app.pump().unwrap();

    assert_eq!(app.playback().current(), Some(&track(1)));
    assert!(drain(&player_rx).is_empty());
}

// ===== Search and derived favorite markers =====

#[test]
fn search_results_replace_the_list_and_derive_favorite_markers() {
    let hits = vec![track(1), track(2), track(3)];
    let (mut app, _player_rx, _dir) = test_app(FakeResolver::with_results(hits.clone()));

    app.search("anything").unwrap();
    assert!(app.search_in_flight());
    wait_for(&mut app, "search results", |app| !app.search_results().is_empty());

    assert_eq!(app.search_results(), hits.as_slice());
    assert!(!app.search_in_flight());

    // Toggling a favorite does not reorder or rewrite the displayed search
    // results; the marker is derived through membership at read time.
    let toggled = hits[1].clone();
    assert!(app.toggle_favorite(&toggled));
    assert_eq!(app.search_results(), hits.as_slice());
    assert!(app.is_favorite(&toggled.source_url));

    assert!(!app.toggle_favorite(&toggled));
    assert_eq!(app.search_results(), hits.as_slice());
    assert!(!app.is_favorite(&toggled.source_url));
}

#[test]
fn a_failed_search_reports_a_notice() {
    let resolver = FakeResolver {
        results: Vec::new(),
        fail_search: true,
        failing_streams: Vec::new(),
    };
    let (mut app, _player_rx, _dir) = test_app(resolver);

    app.search("nothing").unwrap();
    wait_for(&mut app, "search failure", |app| !app.search_in_flight());

    assert!(app.take_notice().unwrap().contains("nothing"));
}

#[test]
fn the_current_track_favorite_marker_tracks_toggles() {
    let (mut app, _player_rx, _dir) = test_app(FakeResolver::empty());
    seeded_playlist(&mut app, "Fav", &[track(1)]);

    app.play_playlist_entry("Fav", 0).unwrap();
    wait_playing(&mut app, &track(1));
    assert!(!app.current_is_favorite());

    assert_eq!(app.toggle_favorite_current(), Some(true));
    assert!(app.current_is_favorite());

    assert_eq!(app.toggle_favorite_current(), Some(false));
    assert!(!app.current_is_favorite());
}

// ===== Artwork staleness =====

#[test]
fn artwork_is_kept_for_visible_entries_and_dropped_for_vanished_ones() {
    let (mut app, _player_rx, _dir) = test_app(FakeResolver::empty());
    let kept = track(1);
    app.enqueue(kept.clone());

    app.event_sender()
        .send(AppEvent::ArtworkReady {
            source_url: kept.source_url.clone(),
            bytes: vec![1, 2, 3],
        })
        .unwrap();
    app.event_sender()
        .send(AppEvent::ArtworkReady {
            source_url: "https://example.com/watch?v=gone".to_string(),
            bytes: vec![9, 9, 9],
        })
        .unwrap();
    app.pump().unwrap();

    assert_eq!(app.artwork(&kept.source_url), Some(&[1u8, 2, 3][..]));
    assert!(app.artwork("https://example.com/watch?v=gone").is_none());
}

// ===== Engine unavailability =====

#[test]
fn an_unavailable_engine_warns_once() {
    let (mut app, _player_rx, _dir) = test_app(FakeResolver::empty());

    for _ in 0..3 {
        app.event_sender()
            .send(AppEvent::PlayerUnavailable("libmpv missing".to_string()))
            .unwrap();
    }
    app.pump().unwrap();

    assert!(!app.is_player_available());
    assert!(app.take_notice().unwrap().contains("libmpv missing"));
    // Repeated reports do not re-raise the notice.
    assert!(app.take_notice().is_none());
}
