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

//! Application event distribution and orchestration.
//!
//! This module defines the events through which everything asynchronous,
//! whether a background worker result or an audio engine notification,
//! re-enters the single-threaded control context.
//!
//! # Architecture
//!
//! 1. **Capture**: workers and the engine send [`AppEvent`]s through an
//!    mpsc channel; they never mutate application state directly.
//! 2. **Process**: [`apply_event`] runs on the control context (via
//!    [`App::pump`](crate::app::App::pump)) and applies each event to the
//!    [`App`] state, discarding results whose target no longer exists.
//! 3. **Present**: the embedding shell re-reads the state it displays after
//!    pumping; derived properties such as favorite markers are computed at
//!    read time.

use anyhow::Result;

use crate::{app::App, model::Track, playback, player::PlayerState};

/// Events applied to the application state on the control context.
///
/// Results that target a particular track carry its source URL so staleness
/// can be detected; a raw reference into a list would not survive the list
/// being replaced in the meantime.
#[derive(Debug)]
pub enum AppEvent {
    SearchResultsReady(Vec<Track>),
    SearchFailed(String),

    StreamResolved {
        source_url: String,
        stream_url: String,
    },
    StreamResolveFailed {
        source_url: String,
        message: String,
    },

    ArtworkReady {
        source_url: String,
        bytes: Vec<u8>,
    },

    PlayerStateChanged(PlayerState),
    DurationChanged(f64),
    TimeChanged(f64),
    VolumeChanged(i32),
    TrackFinished,
    PlayerUnavailable(String),

    Error(String),
}

/// Applies a single event to the application state.
pub(crate) fn apply_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::SearchResultsReady(tracks) => {
            app.search.set_tracks(tracks);
            for track in app.search.tracks().to_vec() {
                app.request_artwork(&track)?;
            }
        }
        AppEvent::SearchFailed(message) => {
            app.search.in_flight = false;
            app.notice = Some(message);
        }

        AppEvent::StreamResolved {
            source_url,
            stream_url,
        } => playback::on_stream_resolved(app, &source_url, &stream_url)?,
        AppEvent::StreamResolveFailed {
            source_url,
            message,
        } => playback::on_resolve_failed(app, &source_url, &message)?,

        AppEvent::ArtworkReady { source_url, bytes } => {
            if app.artwork_target_exists(&source_url) {
                app.artwork.insert(source_url, bytes);
            } else {
                log::debug!("Discarding artwork for vanished entry {source_url}");
            }
        }

        AppEvent::PlayerStateChanged(state) => app.player_state = state,
        AppEvent::DurationChanged(duration) => app.playback.duration = Some(duration),
        AppEvent::TimeChanged(seconds) => app.playback.time = Some(seconds),
        AppEvent::VolumeChanged(volume) => app.playback.volume = volume.clamp(0, 100),

        // The engine's end-of-stream notification, marshaled here so the
        // advance only ever runs on the control context.
        AppEvent::TrackFinished => playback::on_track_finished(app)?,

        AppEvent::PlayerUnavailable(message) => {
            if app.player_available {
                app.player_available = false;
                log::warn!("Audio engine unavailable: {message}");
                app.notice = Some(format!("Playback disabled: {message}"));
            }
        }

        AppEvent::Error(message) => log::warn!("Background worker error: {message}"),
    }

    Ok(())
}
