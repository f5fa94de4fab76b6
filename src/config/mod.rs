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

//! Application configuration.
//!
//! This module manages the application configuration file.

use serde::{Deserialize, Serialize};

const CONFIG_NAME: &str = "vibetune";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub version: u32,
    /// Base URL of the Invidious-compatible API instance used for search
    /// and stream resolution.
    pub api_endpoint: String,
    /// Maximum number of search results requested per query.
    pub search_limit: usize,
    /// Volume applied at startup, 0-100.
    pub default_volume: i32,
    /// Overrides the platform data directory for the collection documents.
    pub data_dir: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            api_endpoint: "https://yewtu.be".to_string(),
            search_limit: 5,
            default_volume: 80,
            data_dir: None,
        }
    }
}

pub fn load_config() -> AppConfig {
    confy::load(CONFIG_NAME, None).unwrap_or_default()
}

pub fn save_config(cfg: &AppConfig) -> Result<(), confy::ConfyError> {
    confy::store(CONFIG_NAME, None, cfg)
}
