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

//! REST client for the flight tracker API.
//!
//! Endpoints:
//! ```text
//! GET <base>/flights               -> [FlightRecord]
//! GET <base>/flights/{id}          -> FlightRecord
//! GET <base>/flights/search?q=...  -> [FlightRecord]
//! ```

use std::time::Duration;

use log::debug;
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;

use super::{FeedError, FlightRecord, FlightSource};

/// Configuration for the HTTP flight feed.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// API base URL, e.g. `http://localhost:8080/api`.
    pub base_url: String,
    /// Per-request timeout. An expired timeout is a network error.
    pub request_timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Flight source backed by the REST API.
#[derive(Debug, Clone)]
pub struct HttpFlightFeed {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpFlightFeed {
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| FeedError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(FeedError::InvalidUrl(config.base_url.clone()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(FeedError::Network)?;

        Ok(Self { client, base_url })
    }

    /// The API base URL requests are built from.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch a single flight by identifier.
    pub async fn fetch_by_id(&self, flight_id: &str) -> Result<FlightRecord, FeedError> {
        let url = self.endpoint(&["flights", flight_id])?;
        self.get_json(self.client.get(url)).await
    }

    /// Search flights by free text (flight number, callsign, airport).
    pub async fn search(&self, query: &str) -> Result<Vec<FlightRecord>, FeedError> {
        let url = self.endpoint(&["flights", "search"])?;
        self.get_json(self.client.get(url).query(&[("q", query)]))
            .await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, FeedError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| FeedError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, FeedError> {
        let response = request.send().await.map_err(FeedError::Network)?;

        let status = response.status();
        if !status.is_success() {
            debug!("Flight API answered {} for {}", status, response.url());
            return Err(FeedError::Response {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.bytes().await.map_err(FeedError::Network)?;
        serde_json::from_slice(&body).map_err(FeedError::Decode)
    }
}

impl FlightSource for HttpFlightFeed {
    async fn fetch_all(&self) -> Result<Vec<FlightRecord>, FeedError> {
        let url = self.endpoint(&["flights"])?;
        let flights: Vec<FlightRecord> = self.get_json(self.client.get(url)).await?;
        debug!("Fetched {} flights", flights.len());
        Ok(flights)
    }
}
