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

//! Great-circle distance and the geographic query cell around the observer.

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate distance between two lat/lon points using Haversine formula (in kilometers).
#[must_use]
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Fixed observer position, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl ObserverLocation {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Distance in kilometers from the observer to the given point.
    #[must_use]
    pub fn distance_to(&self, lat: f64, lon: f64) -> f64 {
        distance_km(self.latitude, self.longitude, lat, lon)
    }
}

/// Rectangular lat/lon region used to query the upstream feed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Square box extending `range_deg` degrees in every direction from the observer.
    #[must_use]
    pub fn around(observer: ObserverLocation, range_deg: f64) -> Self {
        Self {
            min_lat: observer.latitude - range_deg,
            max_lat: observer.latitude + range_deg,
            min_lon: observer.longitude - range_deg,
            max_lon: observer.longitude + range_deg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_lax_to_jfk() {
        // LAX to JFK is approximately 3,983 km
        let distance = distance_km(33.9425, -118.4081, 40.6413, -73.7781);
        assert!((distance - 3983.0).abs() < 15.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let pairs = [
            ((41.4995, -81.69541), (41.41, -81.85)),
            ((-33.9461, 151.1772), (51.4700, -0.4543)),
            ((0.0, 179.9), (0.0, -179.9)),
        ];
        for ((lat1, lon1), (lat2, lon2)) in pairs {
            let forward = distance_km(lat1, lon1, lat2, lon2);
            let backward = distance_km(lat2, lon2, lat1, lon1);
            assert!((forward - backward).abs() < 1e-9);
            assert!(forward >= 0.0);
        }
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        assert!(distance_km(41.4995, -81.69541, 41.4995, -81.69541).abs() < f64::EPSILON);
        assert!(distance_km(-90.0, 0.0, -90.0, 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounding_box_around_observer() {
        let bbox = BoundingBox::around(ObserverLocation::new(41.5, -81.7), 1.0);
        assert!((bbox.min_lat - 40.5).abs() < 1e-9);
        assert!((bbox.max_lat - 42.5).abs() < 1e-9);
        assert!((bbox.min_lon - (-82.7)).abs() < 1e-9);
        assert!((bbox.max_lon - (-80.7)).abs() < 1e-9);
    }
}
