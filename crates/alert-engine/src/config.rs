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

//! Engine settings, loaded once at startup and read-only afterwards.

use std::time::Duration;

use thiserror::Error;

use crate::geo::ObserverLocation;

pub const DEFAULT_LATITUDE: f64 = 41.4995;
pub const DEFAULT_LONGITUDE: f64 = -81.69541;
pub const DEFAULT_ALERT_DISTANCE_KM: f64 = 3.0;
pub const DEFAULT_RANGE_DEG: f64 = 1.0;
pub const DEFAULT_API_CALL_INTERVAL_SECS: u64 = 10;
pub const ALERT_API_CALL_INTERVAL_SECS: u64 = 5;
/// Cooldown after the upstream rate-limits us (1 hour).
pub const DEFAULT_CHILL_SECS: u64 = 3600;

fn is_positive(value: f64) -> bool {
    !value.is_nan() && value > 0.0
}

/// Errors found while validating settings.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("latitude {0} is outside [-90, 90]")]
    InvalidLatitude(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    InvalidLongitude(f64),

    #[error("{field} must be a positive number, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),
}

/// Wait durations used between poll cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTimings {
    /// Wait after a cycle with no alerts.
    pub default_interval: Duration,
    /// Wait after a cycle that raised at least one alert.
    pub alert_interval: Duration,
    /// Wait after the upstream signals rate limiting.
    pub chill: Duration,
}

impl Default for PollTimings {
    fn default() -> Self {
        Self {
            default_interval: Duration::from_secs(DEFAULT_API_CALL_INTERVAL_SECS),
            alert_interval: Duration::from_secs(ALERT_API_CALL_INTERVAL_SECS),
            chill: Duration::from_secs(DEFAULT_CHILL_SECS),
        }
    }
}

/// Configuration for the alerting engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertConfig {
    /// Fixed observer location.
    pub observer: ObserverLocation,
    /// Alert when an aircraft is closer than this, in kilometers.
    pub alert_distance_km: f64,
    /// Half-width of the query box, in degrees.
    pub range_deg: f64,
    pub timings: PollTimings,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            observer: ObserverLocation::new(DEFAULT_LATITUDE, DEFAULT_LONGITUDE),
            alert_distance_km: DEFAULT_ALERT_DISTANCE_KM,
            range_deg: DEFAULT_RANGE_DEG,
            timings: PollTimings::default(),
        }
    }
}

impl AlertConfig {
    /// Check that every setting is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ObserverLocation {
            latitude,
            longitude,
        } = self.observer;

        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ConfigError::InvalidLatitude(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ConfigError::InvalidLongitude(longitude));
        }
        if !is_positive(self.alert_distance_km) {
            return Err(ConfigError::NotPositive {
                field: "alert distance",
                value: self.alert_distance_km,
            });
        }
        if !is_positive(self.range_deg) {
            return Err(ConfigError::NotPositive {
                field: "range",
                value: self.range_deg,
            });
        }

        let timings = &self.timings;
        for (name, value) in [
            ("default interval", timings.default_interval),
            ("alert interval", timings.alert_interval),
            ("chill", timings.chill),
        ] {
            if value.is_zero() {
                return Err(ConfigError::ZeroInterval(name));
            }
        }

        Ok(())
    }
}
