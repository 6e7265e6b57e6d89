// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Application configuration management.
//!
//! Configuration is persisted as TOML through `confy`. Every field has a serde
//! default so older or hand-edited files keep loading.

use std::time::Duration;

use airspace_client::{FeedConfig, SchedulerConfig, TrackerConfig, UnknownPositionPolicy};
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "airspace-live";
const CONFIG_NAME: &str = "config";

/// Default flight API base URL
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

/// Shortest refresh interval accepted, in seconds
pub const MIN_REFRESH_INTERVAL_SECS: u64 = 1;

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Configuration schema version for migrations
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// Flight API base URL (the feed is read from `<base>/flights`)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Seconds between flight refreshes
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Seconds before a flight request is abandoned
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Keep a flight on the globe at its last position when the feed stops
    /// reporting one, instead of removing it
    #[serde(default)]
    pub retain_unknown_positions: bool,

    /// Flight list panel expanded state
    #[serde(default = "default_true")]
    pub flight_list_expanded: bool,

    /// Globe view center latitude
    #[serde(default = "default_globe_center_lat")]
    pub globe_center_lat: f64,

    /// Globe view center longitude
    #[serde(default)]
    pub globe_center_lon: f64,
}

fn default_config_version() -> u32 {
    1
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_refresh_interval_secs() -> u64 {
    5
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_globe_center_lat() -> f64 {
    20.0
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            api_base_url: default_api_base_url(),
            refresh_interval_secs: default_refresh_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            retain_unknown_positions: false,
            flight_list_expanded: true,
            globe_center_lat: default_globe_center_lat(),
            globe_center_lon: 0.0,
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating it with defaults if missing
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load(APP_NAME, CONFIG_NAME)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, CONFIG_NAME, self)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(MIN_REFRESH_INTERVAL_SECS))
    }

    pub fn unknown_position_policy(&self) -> UnknownPositionPolicy {
        if self.retain_unknown_positions {
            UnknownPositionPolicy::Retain
        } else {
            UnknownPositionPolicy::Remove
        }
    }

    /// Library configuration for the feed, registry, and scheduler
    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            feed: FeedConfig {
                base_url: self.api_base_url.clone(),
                request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
            },
            scheduler: SchedulerConfig {
                interval: self.refresh_interval(),
            },
            unknown_position: self.unknown_position_policy(),
        }
    }
}
