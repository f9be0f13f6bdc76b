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

//! Aircraft state reports as delivered by a data source for a single poll.

/// A single aircraft's reported identity, position and motion at a point in time.
///
/// Reports are produced fresh by the data source on every poll and are never
/// carried over between polls.
#[derive(Debug, Clone, PartialEq)]
pub struct AircraftStateReport {
    /// ICAO 24-bit address (hex string).
    pub icao24: String,
    /// Aircraft callsign.
    pub callsign: String,
    /// Country inferred from the ICAO address allocation.
    pub origin_country: String,
    /// Latitude in degrees (absent when the aircraft has no position fix).
    pub latitude: Option<f64>,
    /// Longitude in degrees (absent when the aircraft has no position fix).
    pub longitude: Option<f64>,
    /// Barometric altitude in meters.
    pub baro_altitude: Option<f64>,
    /// Ground speed in meters per second.
    pub velocity: Option<f64>,
    /// True track in degrees (0-360, north = 0).
    pub heading: Option<f64>,
    /// Whether the aircraft reported a surface position.
    pub on_ground: bool,
    /// Unix timestamp (seconds) of the last message received from the aircraft.
    pub last_contact: i64,
}

impl AircraftStateReport {
    /// Position as `(lat, lon)` when both coordinates are present.
    #[must_use]
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_report(
    callsign: &str,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> AircraftStateReport {
    AircraftStateReport {
        icao24: "a1b2c3".to_string(),
        callsign: callsign.to_string(),
        origin_country: "United States".to_string(),
        latitude,
        longitude,
        baro_altitude: Some(1219.2),
        velocity: Some(77.3),
        heading: Some(243.5),
        on_ground: false,
        last_contact: 1_700_000_000,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_requires_both_coordinates() {
        assert_eq!(
            sample_report("UAL123", Some(41.0), Some(-81.0)).position(),
            Some((41.0, -81.0))
        );
        assert!(sample_report("UAL123", None, Some(-81.0)).position().is_none());
        assert!(sample_report("UAL123", Some(41.0), None).position().is_none());
    }
}
