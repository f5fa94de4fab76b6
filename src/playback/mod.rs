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

//! Playback orchestration and state.
//!
//! This module owns the playback context (what is currently loaded, from
//! which ordered list, at which position, under which shuffle/repeat mode)
//! and the rules for what plays next.
//!
//! # Architecture
//!
//! Deciding the next track goes through two layers, in order:
//!
//! 1. The play queue. A non-empty queue pre-empts everything: the head is
//!    dequeued and played without consulting the advancement policy and
//!    without touching the list snapshot or position.
//! 2. The [`policy`] functions, applied to the context's list snapshot.
//!
//! Starting a track is asynchronous: the context enters [`PlaybackPhase::Loading`]
//! and a stream-resolution command is posted to the background worker. The
//! resolved URL comes back through the event channel and is applied on the
//! control context, where stale results (for a track that is no longer
//! current) are discarded. All of these functions run only on the control
//! context; nothing here is called from worker threads.

pub mod policy;

use anyhow::Result;

use crate::{
    actions::commands::AppCommand,
    app::App,
    model::Track,
    playback::policy::Advance,
};

/// Playback controller states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    /// Nothing loaded.
    Idle,
    /// Stream resolution in flight for the current track.
    Loading,
    Playing,
    Paused,
    /// The list ran out and repeat is off; nothing further plays until the
    /// user starts something.
    StoppedAtEnd,
}

/// The in-memory record of what is playing and where it came from.
///
/// The track list is a wholesale snapshot of whichever source list playback
/// was last started from (search results, favorites, or a playlist); it is
/// replaced entirely on the next start-from-list, never incrementally
/// synced. A `position` of `None` corresponds to "nothing from the list has
/// played yet".
pub struct Playback {
    pub(crate) phase: PlaybackPhase,
    pub(crate) current: Option<Track>,
    pub(crate) tracks: Vec<Track>,
    pub(crate) position: Option<usize>,
    pub(crate) shuffle: bool,
    pub(crate) repeat: bool,
    pub(crate) volume: i32,
    pub(crate) duration: Option<f64>,
    pub(crate) time: Option<f64>,
}

impl Playback {
    pub(crate) fn new(volume: i32) -> Self {
        Self {
            phase: PlaybackPhase::Idle,
            current: None,
            tracks: Vec::new(),
            position: None,
            shuffle: false,
            repeat: false,
            volume: volume.clamp(0, 100),
            duration: None,
            time: None,
        }
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn current(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    pub fn volume(&self) -> i32 {
        self.volume
    }

    /// Engine-reported total length of the current stream, in seconds.
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Engine-reported position in the current stream, in seconds.
    pub fn time(&self) -> Option<f64> {
        self.time
    }
}

/// Starts playback of `tracks[index]`, replacing the context's list
/// snapshot wholesale.
pub(crate) fn start_from_list(app: &mut App, tracks: Vec<Track>, index: usize) -> Result<()> {
    let Some(track) = tracks.get(index).cloned() else {
        return Ok(());
    };
    app.playback.tracks = tracks;
    app.playback.position = Some(index);
    begin_loading(app, track)
}

/// Starts playback of a single track without touching the list snapshot or
/// position, used for queue pre-emption and direct "play now" actions.
pub(crate) fn start_track(app: &mut App, track: Track) -> Result<()> {
    if !track.has_source() {
        return Ok(());
    }
    begin_loading(app, track)
}

fn begin_loading(app: &mut App, track: Track) -> Result<()> {
    app.playback.phase = PlaybackPhase::Loading;
    app.playback.duration = None;
    app.playback.time = None;
    app.playback.current = Some(track.clone());

    app.request_artwork(&track)?;
    app.command_tx.send(AppCommand::ResolveStream(track))?;
    Ok(())
}

/// Moves to the next track.
///
/// The queue is consulted first and pre-empts the advancement policy
/// entirely. When the policy decides there is nothing further to play, an
/// automatic advance (natural end of track) parks the controller at
/// [`PlaybackPhase::StoppedAtEnd`]; a manual one leaves everything
/// unchanged.
pub(crate) fn advance(app: &mut App, auto: bool) -> Result<()> {
    if let Some(track) = app.queue.dequeue_front() {
        return start_track(app, track);
    }

    let decision = policy::next_index(
        app.playback.tracks.len(),
        app.playback.position,
        app.playback.shuffle,
        app.playback.repeat,
        &mut rand::rng(),
    );

    match decision {
        Advance::Index(index) => {
            let track = app.playback.tracks[index].clone();
            app.playback.position = Some(index);
            begin_loading(app, track)
        }
        Advance::Stop => {
            if auto {
                app.playback.phase = PlaybackPhase::StoppedAtEnd;
            }
            Ok(())
        }
    }
}

/// Moves to the previous track. Never consults the queue and never parks
/// the controller; stepping back from the first entry stays put.
pub(crate) fn retreat(app: &mut App) -> Result<()> {
    let decision = policy::prev_index(
        app.playback.tracks.len(),
        app.playback.position,
        app.playback.shuffle,
        &mut rand::rng(),
    );

    match decision {
        Advance::Index(index) => {
            let track = app.playback.tracks[index].clone();
            app.playback.position = Some(index);
            begin_loading(app, track)
        }
        Advance::Stop => Ok(()),
    }
}

/// Flips between playing and paused. No-op in any other phase.
pub(crate) fn toggle_play_pause(app: &mut App) -> Result<()> {
    match app.playback.phase {
        PlaybackPhase::Playing => {
            app.audio_player.toggle_pause()?;
            app.playback.phase = PlaybackPhase::Paused;
        }
        PlaybackPhase::Paused => {
            app.audio_player.toggle_pause()?;
            app.playback.phase = PlaybackPhase::Playing;
        }
        _ => {}
    }
    Ok(())
}

/// Jumps to a fractional position in the current stream. No-op unless a
/// track with a known total length is loaded.
pub(crate) fn seek(app: &mut App, fraction: f64) -> Result<()> {
    if !matches!(
        app.playback.phase,
        PlaybackPhase::Playing | PlaybackPhase::Paused
    ) {
        return Ok(());
    }
    let Some(duration) = app.playback.duration else {
        return Ok(());
    };

    let fraction = fraction.clamp(0.0, 1.0);
    app.audio_player.set_time(fraction * duration)
}

/// Sets the volume, caching it for re-application on every subsequent load.
pub(crate) fn set_volume(app: &mut App, percent: i32) -> Result<()> {
    let percent = percent.clamp(0, 100);
    app.playback.volume = percent;
    app.audio_player.set_volume(percent)
}

/// Applies a resolved stream URL delivered by a background worker.
///
/// The result is tagged with the source URL it was resolved for; anything
/// that no longer matches the in-flight track is stale and dropped.
pub(crate) fn on_stream_resolved(
    app: &mut App,
    source_url: &str,
    stream_url: &str,
) -> Result<()> {
    let is_current = app.playback.phase == PlaybackPhase::Loading
        && app
            .playback
            .current
            .as_ref()
            .is_some_and(|track| track.source_url == source_url);
    if !is_current {
        log::debug!("Discarding stale stream resolution for {source_url}");
        return Ok(());
    }

    app.playback.phase = PlaybackPhase::Playing;
    app.audio_player.load(stream_url)?;
    app.audio_player.set_volume(app.playback.volume)?;
    Ok(())
}

/// Applies a failed stream resolution: stop the engine, back to idle,
/// record the notice, no retry.
pub(crate) fn on_resolve_failed(app: &mut App, source_url: &str, message: &str) -> Result<()> {
    let is_current = app
        .playback
        .current
        .as_ref()
        .is_some_and(|track| track.source_url == source_url);
    if !is_current {
        log::debug!("Discarding stale stream resolution failure for {source_url}");
        return Ok(());
    }

    app.playback.phase = PlaybackPhase::Idle;
    app.playback.current = None;
    app.notice = Some(message.to_string());
    app.audio_player.stop()
}

/// The end-of-stream notification, already marshaled onto the control
/// context by the event channel.
pub(crate) fn on_track_finished(app: &mut App) -> Result<()> {
    advance(app, true)
}
