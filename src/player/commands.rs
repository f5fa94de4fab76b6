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

//! MPV-backed audio playback engine and event processing.
//!
//! This module provides the core audio playback logic, leveraging `libmpv`
//! for stream decoding and playback control. It manages a background worker
//! thread that bridges the gap between the application's command-based
//! interface and the low-level MPV property observation system.
//!
//! # Architecture
//!
//! The engine operates using a dual-channel communication pattern:
//! 1. **Command Channel**: Receives [`AudioPlayerCommand`]s to control
//!    playback (load, pause, seek, volume).
//! 2. **Event Channel**: Broadcasts [`AppEvent`]s to notify the control
//!    context of state changes, such as track progress, duration, and the
//!    end of the current stream.
//!
//! End-of-stream in particular must never call back into application state
//! from this thread; it is delivered as an event and applied on the control
//! context.

use anyhow::{Context, Result};
use mpv::Format;
use std::{
    sync::mpsc::{self, Receiver, Sender},
    thread,
};

use crate::{
    actions::events::AppEvent,
    player::{AudioPlayer, PlayerState},
};

#[derive(Debug, Clone, PartialEq)]
pub enum AudioPlayerCommand {
    Load(String),
    TogglePause,
    Stop,
    SetVolume(i32),
    SetTime(f64),
}

/// Spawns the audio worker thread to process playback commands.
///
/// This function takes ownership of the command receiver and the event
/// sender, moving them into a dedicated background thread.
///
/// If the MPV context cannot be constructed, a single
/// [`AppEvent::PlayerUnavailable`] is broadcast and the worker keeps
/// draining commands so that playback operations elsewhere degrade to
/// no-ops instead of errors.
pub(crate) fn spawn_player_worker(
    command_rx: Receiver<AudioPlayerCommand>,
    event_tx: Sender<AppEvent>,
) {
    let error_tx = event_tx.clone();

    thread::spawn(move || {
        let handler = match build_handler() {
            Ok(handler) => handler,
            Err(e) => {
                let _ = event_tx.send(AppEvent::PlayerUnavailable(format!("{e:#}")));
                while command_rx.recv().is_ok() {}
                return;
            }
        };

        if let Err(e) = audio_player_worker(handler, command_rx, event_tx) {
            let _ = error_tx.send(AppEvent::Error(format!("MPV worker failure: {:?}", e)));
        }
    });
}

/// Builds an MPV context configured for audio-only playback.
fn build_handler() -> Result<mpv::MpvHandler> {
    let mut builder = mpv::MpvHandlerBuilder::new().context("Failed to create MPV builder")?;
    builder
        .set_option("vo", "null")
        .context("Failed to set no video output")?;
    builder.build().context("Failed to build MPV handler")
}

/// The primary execution loop for the audio player backend.
///
/// This function owns the `libmpv` context and alternates between handling
/// incoming commands and polling engine events.
fn audio_player_worker(
    mut handler: mpv::MpvHandler,
    command_rx: Receiver<AudioPlayerCommand>,
    event_tx: Sender<AppEvent>,
) -> Result<()> {
    handler
        .observe_property::<f64>("duration", 0)
        .context("Failed to observe duration")?;
    handler
        .observe_property::<bool>("pause", 0)
        .context("Failed to observe pause")?;
    handler
        .observe_property::<f64>("time-pos", 0)
        .context("Failed to observe time-pos")?;
    handler
        .observe_property::<f64>("volume", 0)
        .context("Failed to observe volume")?;
    handler
        .observe_property::<f64>("idle-active", 0)
        .context("Failed to observe idle-active")?;

    let mut is_paused = false;
    let mut is_idle = true;

    let mut player_state = PlayerState::Stopped;

    loop {
        process_commands(&mut handler, &command_rx)?;
        process_mpv_events(
            &mut handler,
            &mut is_paused,
            &mut is_idle,
            &mut player_state,
            &event_tx,
        )?;
    }
}

/// Drains and executes all pending commands from the application channel.
fn process_commands(
    handler: &mut mpv::MpvHandler,
    command_rx: &mpsc::Receiver<AudioPlayerCommand>,
) -> Result<()> {
    while let Ok(command) = command_rx.try_recv() {
        match command {
            AudioPlayerCommand::Load(stream_url) => {
                handler
                    .command(&["loadfile", &stream_url, "replace"])
                    .context(format!("Failed to load stream: {}", &stream_url))?;
                handler.set_property("pause", false)?;
            }
            AudioPlayerCommand::TogglePause => {
                handler.command(&["cycle", "pause"])?;
            }
            AudioPlayerCommand::Stop => {
                handler.command(&["stop"])?;
            }
            AudioPlayerCommand::SetVolume(percent) => {
                handler.set_property("volume", f64::from(percent.clamp(0, 100)))?;
            }
            AudioPlayerCommand::SetTime(seconds) => {
                handler.set_property("time-pos", seconds)?;
            }
        }
    }

    Ok(())
}

/// Polls for MPV events and synchronizes the application state.
///
/// This function waits for up to 50ms for an event from the MPV context.
/// If an event occurs, it updates internal flags and broadcasts any
/// necessary [`AppEvent`]s to the control context.
fn process_mpv_events(
    handler: &mut mpv::MpvHandler,
    is_paused: &mut bool,
    is_idle: &mut bool,
    current_state: &mut PlayerState,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<()> {
    if let Some(mpv_event) = handler.wait_event(0.05) {
        let app_event = match mpv_event {
            mpv::Event::PropertyChange { name, change, .. } => match (name, change) {
                ("duration", Format::Double(duration)) => {
                    Some(AppEvent::DurationChanged(duration))
                }
                ("pause", Format::Flag(pause)) => {
                    *is_paused = pause;
                    None
                }
                ("time-pos", Format::Double(seconds)) if seconds >= 0.0 => {
                    Some(AppEvent::TimeChanged(seconds))
                }
                ("volume", Format::Double(volume)) => {
                    Some(AppEvent::VolumeChanged(volume.round() as i32))
                }
                ("idle-active", Format::Flag(idle_active)) => {
                    *is_idle = idle_active;
                    None
                }
                _ => None,
            },
            mpv::Event::EndFile(result) => {
                if let Ok(reason) = result {
                    match reason {
                        mpv::EndFileReason::MPV_END_FILE_REASON_EOF => {
                            Some(AppEvent::TrackFinished)
                        }
                        _ => None,
                    }
                } else {
                    None
                }
            }
            _ => None,
        };

        let new_player_state = AudioPlayer::player_state(*is_paused, *is_idle);

        if new_player_state != *current_state {
            *current_state = new_player_state;
            event_tx
                .send(AppEvent::PlayerStateChanged(new_player_state))
                .context("Failed to send player state event")?;
        }

        if let Some(event) = app_event {
            event_tx.send(event).context("Failed to send event")?;
        }
    }

    Ok(())
}
