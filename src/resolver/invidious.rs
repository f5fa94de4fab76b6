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

//! Invidious-compatible resolver adapter implementation.

use std::time::Duration;

use serde_json::Value;

use crate::{model::Track, resolver::StreamResolver};

const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";
const VIDEO_ID_LEN: usize = 11;

/// Invidious adapter backed by `ureq`.
pub struct InvidiousResolver {
    http_client: ureq::Agent,
    endpoint: String,
}

impl InvidiousResolver {
    /// Creates a new resolver against an Invidious-compatible API instance.
    pub fn new(endpoint: &str) -> Self {
        let http_client = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(Duration::from_secs(15))
            .timeout_write(Duration::from_secs(15))
            .build();
        Self {
            http_client,
            endpoint: endpoint.trim().trim_end_matches('/').to_string(),
        }
    }

    fn request_json(&self, url: &str, what: &str) -> Result<Value, String> {
        let response = self
            .http_client
            .get(url)
            .call()
            .map_err(|err| format!("Request failed ({what}): {err}"))?;
        response
            .into_json()
            .map_err(|err| format!("Response parse failed ({what}): {err}"))
    }

    /// Normalizes a search result reference to a canonical watch URL.
    ///
    /// The provider sometimes hands back a bare 11-character video id
    /// rather than a full URL.
    fn canonical_watch_url(reference: &str) -> String {
        if reference.len() == VIDEO_ID_LEN && !reference.contains('.') {
            format!("{WATCH_URL_PREFIX}{reference}")
        } else {
            reference.to_string()
        }
    }

    /// Extracts the video id from a watch URL, a short URL, or a bare id.
    fn video_id(source_url: &str) -> Option<String> {
        if source_url.len() == VIDEO_ID_LEN && !source_url.contains('.') {
            return Some(source_url.to_string());
        }

        if let Some((_, query)) = source_url.split_once('?') {
            for pair in query.split('&') {
                if let Some(id) = pair.strip_prefix("v=") {
                    if !id.is_empty() {
                        return Some(id.to_string());
                    }
                }
            }
        }

        if source_url.contains("youtu.be/") {
            let tail = source_url.rsplit('/').next()?;
            let id = tail.split('?').next()?;
            if !id.is_empty() {
                return Some(id.to_string());
            }
        }

        None
    }

    fn parse_hit(entry: &Value) -> Option<Track> {
        let reference = entry.get("videoId")?.as_str()?;
        if reference.is_empty() {
            return None;
        }

        let title = entry
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("Unknown Title")
            .to_string();

        let mut track = Track::new(title, Self::canonical_watch_url(reference));
        if let Some(thumbnail) = Self::pick_thumbnail(entry.get("videoThumbnails")) {
            track = track.with_thumbnail(thumbnail);
        }
        Some(track)
    }

    /// Prefers the provider's "medium" rendition, falling back to whatever
    /// is listed first.
    fn pick_thumbnail(thumbnails: Option<&Value>) -> Option<String> {
        let thumbnails = thumbnails?.as_array()?;
        let preferred = thumbnails.iter().find(|thumb| {
            thumb.get("quality").and_then(Value::as_str) == Some("medium")
        });
        preferred
            .or_else(|| thumbnails.first())
            .and_then(|thumb| thumb.get("url"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Picks a playable stream URL from the video payload.
    ///
    /// Audio-only adaptive formats are preferred, highest bitrate first;
    /// muxed format streams are the fallback when the provider offers no
    /// usable adaptive format.
    fn pick_stream_url(payload: &Value) -> Option<String> {
        let audio = payload
            .get("adaptiveFormats")
            .and_then(Value::as_array)
            .map(|formats| {
                let mut audio: Vec<&Value> = formats
                    .iter()
                    .filter(|format| {
                        format
                            .get("type")
                            .and_then(Value::as_str)
                            .is_some_and(|mime| mime.starts_with("audio/"))
                    })
                    .collect();
                audio.sort_by_key(|format| std::cmp::Reverse(Self::bitrate(format)));
                audio
            })
            .unwrap_or_default();

        for format in audio {
            if let Some(url) = format.get("url").and_then(Value::as_str) {
                if !url.is_empty() {
                    return Some(url.to_string());
                }
            }
        }

        payload
            .get("formatStreams")
            .and_then(Value::as_array)
            .and_then(|streams| streams.first())
            .and_then(|stream| stream.get("url"))
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    }

    // The provider reports bitrate as a decimal string.
    fn bitrate(format: &Value) -> u64 {
        match format.get("bitrate") {
            Some(Value::String(s)) => s.parse().unwrap_or(0),
            Some(value) => value.as_u64().unwrap_or(0),
            None => 0,
        }
    }
}

impl StreamResolver for InvidiousResolver {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>, String> {
        let url = format!(
            "{}/api/v1/search?q={}&type=video",
            self.endpoint,
            urlencoding::encode(query)
        );
        let payload = self.request_json(&url, "search")?;

        let entries = payload
            .as_array()
            .ok_or_else(|| "Unexpected search response shape".to_string())?;
        let tracks: Vec<Track> = entries
            .iter()
            .filter_map(Self::parse_hit)
            .take(limit)
            .collect();

        if tracks.is_empty() {
            return Err(format!("No results for \"{query}\""));
        }
        Ok(tracks)
    }

    fn resolve_stream(&self, source_url: &str) -> Result<String, String> {
        let video_id = Self::video_id(source_url)
            .ok_or_else(|| format!("Unrecognized track reference: {source_url}"))?;
        let url = format!("{}/api/v1/videos/{}", self.endpoint, video_id);
        let payload = self.request_json(&url, "stream resolution")?;

        Self::pick_stream_url(&payload)
            .ok_or_else(|| format!("No playable stream for {source_url}"))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn bare_video_ids_are_normalized_to_watch_urls() {
        assert_eq!(
            InvidiousResolver::canonical_watch_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
        assert_eq!(
            InvidiousResolver::canonical_watch_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn video_ids_are_extracted_from_the_usual_shapes() {
        for reference in [
            "dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?list=x&v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?t=10",
        ] {
            assert_eq!(
                InvidiousResolver::video_id(reference).as_deref(),
                Some("dQw4w9WgXcQ"),
                "failed for {reference}"
            );
        }

        assert_eq!(InvidiousResolver::video_id("https://example.com/nope"), None);
    }

    #[test]
    fn search_hits_parse_title_url_and_thumbnail() {
        let entry = json!({
            "videoId": "dQw4w9WgXcQ",
            "title": "A Song",
            "videoThumbnails": [
                {"quality": "maxres", "url": "https://img.example/max.jpg"},
                {"quality": "medium", "url": "https://img.example/medium.jpg"}
            ]
        });

        let track = InvidiousResolver::parse_hit(&entry).unwrap();
        assert_eq!(track.title, "A Song");
        assert_eq!(track.source_url, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(track.thumbnail_url.as_deref(), Some("https://img.example/medium.jpg"));
    }

    #[test]
    fn hits_without_a_video_id_are_skipped() {
        assert!(InvidiousResolver::parse_hit(&json!({"title": "broken"})).is_none());
        assert!(InvidiousResolver::parse_hit(&json!({"videoId": "", "title": "empty"})).is_none());
    }

    #[test]
    fn prefers_the_highest_bitrate_audio_format() {
        let payload = json!({
            "adaptiveFormats": [
                {"type": "video/mp4; codecs=\"avc1\"", "bitrate": "999999", "url": "https://s.example/video"},
                {"type": "audio/webm; codecs=\"opus\"", "bitrate": "98765", "url": "https://s.example/opus"},
                {"type": "audio/mp4; codecs=\"mp4a\"", "bitrate": "43210", "url": "https://s.example/aac"}
            ],
            "formatStreams": [
                {"type": "video/mp4", "url": "https://s.example/muxed"}
            ]
        });

        assert_eq!(
            InvidiousResolver::pick_stream_url(&payload).as_deref(),
            Some("https://s.example/opus")
        );
    }

    #[test]
    fn falls_back_to_muxed_streams_when_no_audio_format_is_usable() {
        let payload = json!({
            "adaptiveFormats": [
                {"type": "audio/webm; codecs=\"opus\"", "bitrate": "98765", "url": ""}
            ],
            "formatStreams": [
                {"type": "video/mp4", "url": "https://s.example/muxed"}
            ]
        });

        assert_eq!(
            InvidiousResolver::pick_stream_url(&payload).as_deref(),
            Some("https://s.example/muxed")
        );

        assert_eq!(InvidiousResolver::pick_stream_url(&json!({})), None);
    }
}
