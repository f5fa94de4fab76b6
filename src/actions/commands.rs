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

//! Asynchronous application command processing.
//!
//! This module implements the command pattern used to offload blocking work
//! (provider searches, stream resolution, and artwork fetches) from the
//! control context. Each command is executed on its own fire-and-forget
//! worker thread which runs to completion exactly once and delivers its
//! result back to the application via an [`AppEvent`].
//!
//! Workers never touch shared state. Issuing a new search while one is in
//! flight does not cancel the old one; late results are delivered anyway
//! and the control context decides what still applies.

use std::{
    io::Read,
    sync::{
        Arc,
        mpsc::{Receiver, Sender},
    },
    thread,
    time::Duration,
};

use crate::{
    actions::events::AppEvent,
    config::AppConfig,
    model::Track,
    resolver::StreamResolver,
};

/// Artwork responses larger than this are truncated rather than buffered
/// without bound.
const MAX_ARTWORK_BYTES: u64 = 2 * 1024 * 1024;

#[derive(Debug)]
pub(crate) enum AppCommand {
    Search(String),
    ResolveStream(Track),
    FetchArtwork {
        source_url: String,
        thumbnail_url: String,
    },
}

/// Spawns the background dispatcher that processes application commands.
///
/// The dispatcher itself only routes: every individual command runs on its
/// own short-lived thread so that a slow search cannot delay a stream
/// resolution.
///
/// # Arguments
///
/// * `config` - The application configuration.
/// * `resolver` - The search/stream-resolution adapter, shared across workers.
/// * `command_rx` - The receiving end of the command channel.
/// * `event_tx` - The sending end of the channel for broadcasting results.
pub(crate) fn spawn_command_worker(
    config: &AppConfig,
    resolver: Arc<dyn StreamResolver>,
    command_rx: Receiver<AppCommand>,
    event_tx: Sender<AppEvent>,
) {
    let search_limit = config.search_limit;
    let artwork_client = ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(5))
        .timeout_read(Duration::from_secs(10))
        .build();

    thread::spawn(move || {
        while let Ok(command) = command_rx.recv() {
            dispatch_command(
                command,
                search_limit,
                &resolver,
                &artwork_client,
                &event_tx,
            );
        }
    });
}

fn dispatch_command(
    command: AppCommand,
    search_limit: usize,
    resolver: &Arc<dyn StreamResolver>,
    artwork_client: &ureq::Agent,
    event_tx: &Sender<AppEvent>,
) {
    match command {
        AppCommand::Search(query) => {
            let resolver = Arc::clone(resolver);
            let event_tx = event_tx.clone();
            thread::spawn(move || {
                let event = match resolver.search(&query, search_limit) {
                    Ok(tracks) => AppEvent::SearchResultsReady(tracks),
                    Err(message) => AppEvent::SearchFailed(message),
                };
                let _ = event_tx.send(event);
            });
        }
        AppCommand::ResolveStream(track) => {
            let resolver = Arc::clone(resolver);
            let event_tx = event_tx.clone();
            thread::spawn(move || {
                let event = match resolver.resolve_stream(&track.source_url) {
                    Ok(stream_url) => AppEvent::StreamResolved {
                        source_url: track.source_url,
                        stream_url,
                    },
                    Err(message) => AppEvent::StreamResolveFailed {
                        source_url: track.source_url,
                        message,
                    },
                };
                let _ = event_tx.send(event);
            });
        }
        AppCommand::FetchArtwork {
            source_url,
            thumbnail_url,
        } => {
            let client = artwork_client.clone();
            let event_tx = event_tx.clone();
            thread::spawn(move || {
                match fetch_artwork(&client, &thumbnail_url) {
                    Ok(bytes) => {
                        let _ = event_tx.send(AppEvent::ArtworkReady { source_url, bytes });
                    }
                    // Artwork is cosmetic; a failed fetch just leaves the
                    // placeholder in place.
                    Err(e) => log::debug!("Artwork fetch failed for {thumbnail_url}: {e}"),
                }
            });
        }
    }
}

fn fetch_artwork(client: &ureq::Agent, thumbnail_url: &str) -> Result<Vec<u8>, String> {
    let response = client
        .get(thumbnail_url)
        .call()
        .map_err(|e| e.to_string())?;

    let mut bytes = Vec::new();
    response
        .into_reader()
        .take(MAX_ARTWORK_BYTES)
        .read_to_end(&mut bytes)
        .map_err(|e| e.to_string())?;
    Ok(bytes)
}
