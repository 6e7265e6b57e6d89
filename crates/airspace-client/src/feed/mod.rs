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

//! Flight feed layer.
//!
//! Defines the flight record wire format, the error taxonomy of a fetch, and
//! the [`FlightSource`] trait the scheduler polls. [`HttpFlightFeed`] is the
//! implementation backed by the flight tracker REST API.

mod http;

pub use http::{FeedConfig, HttpFlightFeed};

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scene::{EntityState, Position};

/// Errors that can occur while fetching flights.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The request could not complete (connection refused, timeout, reset).
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("failed to fetch flights: {status} {reason}")]
    Response { status: u16, reason: String },

    /// The body was not a valid flight payload.
    #[error("invalid flight data: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("invalid feed URL: {0}")]
    InvalidUrl(String),
}

/// Lifecycle status reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightStatus {
    Scheduled,
    Boarding,
    Departed,
    InFlight,
    Landing,
    Landed,
    Arrived,
    Delayed,
    Cancelled,
    Diverted,
    /// Missing or unrecognized status.
    #[default]
    #[serde(other)]
    Unknown,
}

impl FlightStatus {
    /// Human readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Boarding => "Boarding",
            Self::Departed => "Departed",
            Self::InFlight => "In Flight",
            Self::Landing => "Landing",
            Self::Landed => "Landed",
            Self::Arrived => "Arrived",
            Self::Delayed => "Delayed",
            Self::Cancelled => "Cancelled",
            Self::Diverted => "Diverted",
            Self::Unknown => "Unknown",
        }
    }

    /// Whether the aircraft is expected to be in the air.
    #[must_use]
    pub fn is_airborne(self) -> bool {
        matches!(self, Self::Departed | Self::InFlight | Self::Landing | Self::Diverted)
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the flight feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightRecord {
    /// Unique identifier, stable across polls.
    pub flight_id: String,
    pub flight_number: Option<String>,
    pub callsign: Option<String>,

    pub departure_airport_icao: Option<String>,
    pub destination_airport_icao: Option<String>,
    pub departure_airport_name: Option<String>,
    pub destination_airport_name: Option<String>,

    pub scheduled_departure_time: Option<String>,
    pub actual_departure_time: Option<String>,
    pub scheduled_arrival_time: Option<String>,
    pub estimated_arrival_time: Option<String>,

    /// Latitude in degrees, `None` when the position is unknown.
    pub latitude: Option<f64>,
    /// Longitude in degrees, `None` when the position is unknown.
    pub longitude: Option<f64>,
    /// Altitude in meters.
    pub altitude: Option<f64>,
    /// Ground speed in km/h.
    pub speed: Option<f64>,

    #[serde(default)]
    pub status: FlightStatus,

    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_updated: Option<DateTime<Utc>>,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl FlightRecord {
    /// Minimal record with only an identifier, used by tests and callers
    /// building records by hand.
    #[must_use]
    pub fn new(flight_id: impl Into<String>) -> Self {
        Self {
            flight_id: flight_id.into(),
            flight_number: None,
            callsign: None,
            departure_airport_icao: None,
            destination_airport_icao: None,
            departure_airport_name: None,
            destination_airport_name: None,
            scheduled_departure_time: None,
            actual_departure_time: None,
            scheduled_arrival_time: None,
            estimated_arrival_time: None,
            latitude: None,
            longitude: None,
            altitude: None,
            speed: None,
            status: FlightStatus::Unknown,
            last_updated: None,
        }
    }

    /// Set latitude/longitude (degrees) and altitude (meters).
    #[must_use]
    pub fn at(mut self, latitude: f64, longitude: f64, altitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self.altitude = Some(altitude);
        self
    }

    /// Flight number, falling back to the callsign and then the identifier.
    #[must_use]
    pub fn display_name(&self) -> &str {
        non_empty(self.flight_number.as_ref())
            .or_else(|| non_empty(self.callsign.as_ref()))
            .unwrap_or(&self.flight_id)
    }

    /// Origin airport name, falling back to its ICAO code.
    #[must_use]
    pub fn origin(&self) -> &str {
        non_empty(self.departure_airport_name.as_ref())
            .or_else(|| non_empty(self.departure_airport_icao.as_ref()))
            .unwrap_or("?")
    }

    /// Destination airport name, falling back to its ICAO code.
    #[must_use]
    pub fn destination(&self) -> &str {
        non_empty(self.destination_airport_name.as_ref())
            .or_else(|| non_empty(self.destination_airport_icao.as_ref()))
            .unwrap_or("?")
    }

    /// Current position, or `None` when latitude or longitude is missing.
    ///
    /// Zero is a real coordinate here; only absent or non-finite values
    /// count as unknown.
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Some(Position::new(lon, lat, self.altitude.unwrap_or(0.0)))
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn has_position(&self) -> bool {
        self.position().is_some()
    }

    /// Multi-line description shown when the entity is inspected.
    #[must_use]
    pub fn description(&self) -> String {
        let mut text = format!(
            "{}\nFrom: {}\nTo: {}\nAltitude: {:.0} m\nSpeed: {:.0} km/h\nStatus: {}",
            self.display_name(),
            self.origin(),
            self.destination(),
            self.altitude.unwrap_or(0.0),
            self.speed.unwrap_or(0.0),
            self.status,
        );
        if let Some(departure) = non_empty(self.actual_departure_time.as_ref())
            .or_else(|| non_empty(self.scheduled_departure_time.as_ref()))
        {
            text.push_str("\nDeparture: ");
            text.push_str(departure);
        }
        if let Some(arrival) = non_empty(self.estimated_arrival_time.as_ref())
            .or_else(|| non_empty(self.scheduled_arrival_time.as_ref()))
        {
            text.push_str("\nArrival: ");
            text.push_str(arrival);
        }
        text
    }

    /// Full renderer state for this flight, if its position is known.
    #[must_use]
    pub fn entity_state(&self) -> Option<EntityState> {
        Some(EntityState {
            position: self.position()?,
            label: self.display_name().to_string(),
            description: self.description(),
        })
    }
}

/// Source of the complete current flight set.
///
/// Implementations report failures upward and never retry on their own;
/// the scheduler's next tick is the retry.
pub trait FlightSource: Send + Sync + 'static {
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<FlightRecord>, FeedError>> + Send;
}

impl<S: FlightSource> FlightSource for Arc<S> {
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<FlightRecord>, FeedError>> + Send {
        (**self).fetch_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_record() {
        let json = r#"{
            "flightId": "abc123",
            "flightNumber": "UA100",
            "callsign": "UAL100",
            "departureAirportIcao": "KSFO",
            "destinationAirportIcao": "KJFK",
            "departureAirportName": "San Francisco Intl",
            "destinationAirportName": null,
            "latitude": 37.6,
            "longitude": -122.4,
            "altitude": 10500.4,
            "speed": 820.0,
            "status": "IN_FLIGHT",
            "lastUpdated": 1735000000000
        }"#;
        let record: FlightRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.flight_id, "abc123");
        assert_eq!(record.status, FlightStatus::InFlight);
        assert_eq!(record.display_name(), "UA100");
        assert_eq!(record.origin(), "San Francisco Intl");
        assert_eq!(record.destination(), "KJFK");
        assert_eq!(record.last_updated.unwrap().timestamp(), 1_735_000_000);

        let position = record.position().unwrap();
        assert_eq!(position.longitude, -122.4);
        assert_eq!(position.latitude, 37.6);
    }

    #[test]
    fn test_unknown_status_and_missing_fields() {
        let record: FlightRecord =
            serde_json::from_str(r#"{"flightId": "x", "status": "TELEPORTED"}"#).unwrap();
        assert_eq!(record.status, FlightStatus::Unknown);
        assert!(record.position().is_none());
        assert!(record.last_updated.is_none());

        let record: FlightRecord = serde_json::from_str(r#"{"flightId": "y"}"#).unwrap();
        assert_eq!(record.status, FlightStatus::Unknown);
    }

    #[test]
    fn test_zero_coordinates_are_a_position() {
        let record = FlightRecord::new("eq").at(0.0, 0.0, 0.0);
        assert!(record.has_position());
    }

    #[test]
    fn test_partial_position_is_unknown() {
        let mut record = FlightRecord::new("half");
        record.latitude = Some(10.0);
        assert!(record.position().is_none());

        record.longitude = Some(f64::NAN);
        assert!(record.position().is_none());
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut record = FlightRecord::new("id-1");
        assert_eq!(record.display_name(), "id-1");
        record.callsign = Some("DAL9".to_string());
        assert_eq!(record.display_name(), "DAL9");
        record.flight_number = Some("  ".to_string());
        assert_eq!(record.display_name(), "DAL9");
        record.flight_number = Some("DL9".to_string());
        assert_eq!(record.display_name(), "DL9");
    }

    #[test]
    fn test_description_contents() {
        let mut record = FlightRecord::new("a").at(10.0, 20.0, 10_000.6);
        record.flight_number = Some("AF1".to_string());
        record.departure_airport_icao = Some("LFPG".to_string());
        record.destination_airport_name = Some("Kennedy".to_string());
        record.speed = Some(799.6);
        record.status = FlightStatus::Delayed;
        record.scheduled_departure_time = Some("2025-01-01T10:00:00Z".to_string());

        let description = record.description();
        assert!(description.starts_with("AF1\n"));
        assert!(description.contains("From: LFPG"));
        assert!(description.contains("To: Kennedy"));
        assert!(description.contains("Altitude: 10001 m"));
        assert!(description.contains("Speed: 800 km/h"));
        assert!(description.contains("Status: Delayed"));
        assert!(description.contains("Departure: 2025-01-01T10:00:00Z"));
        assert!(!description.contains("Arrival:"));
    }

    #[test]
    fn test_entity_state_requires_position() {
        assert!(FlightRecord::new("a").entity_state().is_none());
        let state = FlightRecord::new("a").at(1.0, 2.0, 3.0).entity_state().unwrap();
        assert_eq!(state.label, "a");
        assert_eq!(state.position, Position::new(2.0, 1.0, 3.0));
    }
}
