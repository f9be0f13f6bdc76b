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

//! OpenSky Network state vector source.
//!
//! Queries the `/states/all` REST endpoint for the bounding box around the
//! observer. State vectors arrive as positional JSON arrays:
//!
//! ```text
//! [icao24, callsign, origin_country, time_position, last_contact,
//!  longitude, latitude, baro_altitude, on_ground, velocity, true_track, ...]
//! ```

use std::time::Duration;

use alert_engine::{AircraftStateReport, BoundingBox, SourceError, StateSource};
use log::debug;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

/// Default OpenSky REST API root.
pub const DEFAULT_OPENSKY_API_URL: &str = "https://opensky-network.org/api";

/// Default HTTP timeout for a single state query.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

// Positions within a state vector array
const ICAO24: usize = 0;
const CALLSIGN: usize = 1;
const ORIGIN_COUNTRY: usize = 2;
const LAST_CONTACT: usize = 4;
const LONGITUDE: usize = 5;
const LATITUDE: usize = 6;
const BARO_ALTITUDE: usize = 7;
const ON_GROUND: usize = 8;
const VELOCITY: usize = 9;
const TRUE_TRACK: usize = 10;

/// Response body of `/states/all`. `states` is null when the area is empty.
#[derive(Debug, Deserialize)]
struct StatesResponse {
    states: Option<Vec<Vec<Value>>>,
}

/// HTTP basic credentials for the OpenSky API.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// OpenSky client using direct HTTP requests.
#[derive(Debug)]
pub struct OpenSkyClient {
    /// Reusable HTTP client with connection pooling.
    http: reqwest::Client,
    /// API root, without trailing slash.
    api_url: String,
    /// Anonymous access when absent.
    credentials: Option<Credentials>,
}

impl OpenSkyClient {
    pub fn new(
        api_url: &str,
        credentials: Option<Credentials>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn states_url(&self) -> String {
        format!("{}/states/all", self.api_url)
    }
}

impl StateSource for OpenSkyClient {
    async fn fetch(&self, bbox: &BoundingBox) -> Result<Vec<AircraftStateReport>, SourceError> {
        let mut request = self.http.get(self.states_url()).query(&[
            ("lamin", bbox.min_lat),
            ("lomin", bbox.min_lon),
            ("lamax", bbox.max_lat),
            ("lomax", bbox.max_lon),
        ]);
        if let Some(creds) = &self.credentials {
            request = request.basic_auth(&creds.username, Some(&creds.password));
        }

        let response = request
            .send()
            .await
            .map_err(|e| SourceError::Upstream(e.to_string()))?;

        check_status(response.status())?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::Upstream(e.to_string()))?;

        parse_states(&bytes)
    }
}

/// Map an HTTP status to the source error taxonomy.
fn check_status(status: StatusCode) -> Result<(), SourceError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        Err(SourceError::RateLimited)
    } else if status.is_success() {
        Ok(())
    } else {
        Err(SourceError::Upstream(format!("HTTP error: {status}")))
    }
}

/// Decode a `/states/all` body, skipping rows that do not match the layout.
fn parse_states(body: &[u8]) -> Result<Vec<AircraftStateReport>, SourceError> {
    let response: StatesResponse =
        serde_json::from_slice(body).map_err(|e| SourceError::Decode(e.to_string()))?;

    let rows = response.states.unwrap_or_default();
    let total = rows.len();
    let reports: Vec<_> = rows.iter().filter_map(|row| parse_state(row)).collect();

    if reports.len() < total {
        debug!("Skipped {} malformed state vectors", total - reports.len());
    }

    Ok(reports)
}

fn parse_state(row: &[Value]) -> Option<AircraftStateReport> {
    let field = |index: usize| row.get(index).filter(|v| !v.is_null());

    let icao24 = field(ICAO24)?.as_str()?.trim().to_string();
    let callsign = field(CALLSIGN)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map_or_else(|| icao24.clone(), str::to_string);

    Some(AircraftStateReport {
        callsign,
        origin_country: field(ORIGIN_COUNTRY)?.as_str()?.to_string(),
        latitude: field(LATITUDE).and_then(Value::as_f64),
        longitude: field(LONGITUDE).and_then(Value::as_f64),
        baro_altitude: field(BARO_ALTITUDE).and_then(Value::as_f64),
        velocity: field(VELOCITY).and_then(Value::as_f64),
        heading: field(TRUE_TRACK).and_then(Value::as_f64),
        on_ground: field(ON_GROUND).and_then(Value::as_bool).unwrap_or(false),
        last_contact: field(LAST_CONTACT)?.as_i64()?,
        icao24,
    })
}
