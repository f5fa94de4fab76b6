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

//! Audio playback control and state management.
//!
//! This module provides the high-level [`AudioPlayer`] interface used to
//! control music playback. It manages a background worker thread that
//! interfaces with the underlying audio library (MPV), ensuring that heavy
//! audio operations never block the control context.
//!
//! If the MPV context cannot be constructed at all (for example because the
//! runtime library is missing), the worker reports that once and then
//! drains every subsequent command as a no-op.

mod commands;

use std::sync::mpsc::{self, Receiver, Sender};

use anyhow::Result;

use crate::actions::events::AppEvent;

pub use commands::AudioPlayerCommand;

/// Represents the current playback status of the audio engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayerState {
    Playing,
    Paused,
    Stopped,
}

/// A handle to the audio playback engine.
///
/// This struct acts as a command proxy; it does not perform audio processing
/// itself but instead sends instructions to a background worker thread.
pub struct AudioPlayer {
    /// Channel for sending commands to the background worker thread.
    command_tx: mpsc::Sender<AudioPlayerCommand>,
}

impl AudioPlayer {
    /// Spawns the audio worker thread and returns a new player handle.
    ///
    /// # Arguments
    ///
    /// * `event_tx` - A channel to send application-level events (like
    ///   progress updates or end-of-stream notifications) back to the main
    ///   event loop.
    pub fn new(event_tx: Sender<AppEvent>) -> Result<Self> {
        let (command_tx, command_rx) = mpsc::channel::<AudioPlayerCommand>();

        commands::spawn_player_worker(command_rx, event_tx);

        Ok(Self { command_tx })
    }

    /// Creates a player handle with no engine behind it, returning the
    /// receiving end of the command channel.
    ///
    /// This is the seam used by embedders that provide their own engine and
    /// by scenario tests that assert on the command stream.
    pub fn detached() -> (Self, Receiver<AudioPlayerCommand>) {
        let (command_tx, command_rx) = mpsc::channel::<AudioPlayerCommand>();
        (Self { command_tx }, command_rx)
    }

    // Maps internal audio backend flags to a simplified [`PlayerState`].
    fn player_state(is_paused: bool, is_idle: bool) -> PlayerState {
        if is_idle {
            PlayerState::Stopped
        } else if is_paused {
            PlayerState::Paused
        } else {
            PlayerState::Playing
        }
    }

    /// Instructs the worker to load and start playing a stream URL.
    pub(crate) fn load(&self, stream_url: &str) -> Result<()> {
        self.command_tx
            .send(AudioPlayerCommand::Load(stream_url.to_string()))?;
        Ok(())
    }

    /// Toggles the playback state between paused and playing.
    pub(crate) fn toggle_pause(&self) -> Result<()> {
        self.command_tx.send(AudioPlayerCommand::TogglePause)?;
        Ok(())
    }

    /// Stop playback.
    pub(crate) fn stop(&self) -> Result<()> {
        self.command_tx.send(AudioPlayerCommand::Stop)?;
        Ok(())
    }

    /// Sets the playback volume as a percentage, 0-100.
    pub(crate) fn set_volume(&self, percent: i32) -> Result<()> {
        self.command_tx
            .send(AudioPlayerCommand::SetVolume(percent))?;
        Ok(())
    }

    /// Jumps to an absolute position in the current stream.
    pub(crate) fn set_time(&self, seconds: f64) -> Result<()> {
        self.command_tx.send(AudioPlayerCommand::SetTime(seconds))?;
        Ok(())
    }
}
