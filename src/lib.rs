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

//! # Streaming Music Player Core.
//!
//! The engine behind a desktop music-streaming client: provider search,
//! stream playback through MPV, and a user library of favorites, a play
//! queue and named playlists, persisted as JSON documents.
//!
//! This crate contains no UI. A GUI shell embeds [`App`], calls its
//! operations from its main thread, and re-reads the state it renders.
//!
//! ## Architecture
//!
//! The application follows a strict single-threaded mutation model:
//!
//! * The **control context**, whichever thread owns the [`App`], is the
//!   only place application state changes.
//! * **Background workers** handle the blocking calls (provider search,
//!   stream resolution, artwork fetches) and the audio engine, each
//!   delivering results back over an `std::sync::mpsc` channel.
//! * [`App::pump`] applies pending results on the control context,
//!   discarding any whose target has since disappeared.
//!
//! What plays next is decided by the play queue first (it pre-empts the
//! playlist) and the shuffle/repeat policy second; see the
//! [`playback`] module.

pub mod actions;
pub mod app;
pub mod config;
pub mod model;
pub mod playback;
pub mod player;
pub mod resolver;
pub mod store;
pub mod util;

pub use crate::{
    actions::events::AppEvent,
    app::App,
    config::{AppConfig, load_config, save_config},
    model::{
        Track,
        library::{Library, LibraryError},
        queue::PlayQueue,
    },
    playback::{Playback, PlaybackPhase, policy::Advance},
    player::{AudioPlayer, AudioPlayerCommand, PlayerState},
    resolver::{StreamResolver, invidious::InvidiousResolver},
    store::CollectionsStore,
};
