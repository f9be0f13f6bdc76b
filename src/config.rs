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
//! This module handles persistent configuration storage using TOML format.
//! It holds the observer location, alert thresholds, polling cadence and the
//! OpenSky account used for queries. Credentials from the environment take
//! precedence over the file.

use std::time::Duration;

use alert_engine::config::{
    ALERT_API_CALL_INTERVAL_SECS, DEFAULT_ALERT_DISTANCE_KM, DEFAULT_API_CALL_INTERVAL_SECS,
    DEFAULT_CHILL_SECS, DEFAULT_LATITUDE, DEFAULT_LONGITUDE, DEFAULT_RANGE_DEG,
};
use alert_engine::{AlertConfig, ObserverLocation, PollTimings};
use serde::{Deserialize, Serialize};

use crate::opensky::{Credentials, DEFAULT_HTTP_TIMEOUT, DEFAULT_OPENSKY_API_URL};

const APP_NAME: &str = "proximity-alert";
const CONFIG_NAME: &str = "config";

pub const USERNAME_ENV: &str = "OPENSKY_USERNAME";
pub const PASSWORD_ENV: &str = "OPENSKY_PASSWORD";

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Configuration schema version for migrations
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// Observer latitude in degrees
    #[serde(default = "default_latitude")]
    pub latitude: f64,

    /// Observer longitude in degrees
    #[serde(default = "default_longitude")]
    pub longitude: f64,

    /// Alert when an aircraft is closer than this (kilometers)
    #[serde(default = "default_alert_distance_km")]
    pub alert_distance_km: f64,

    /// Half-width of the queried box (degrees)
    #[serde(default = "default_range_deg")]
    pub range_deg: f64,

    /// Seconds between polls when nothing is nearby
    #[serde(default = "default_interval_secs")]
    pub default_interval_secs: u64,

    /// Seconds between polls after an alert
    #[serde(default = "default_alert_interval_secs")]
    pub alert_interval_secs: u64,

    /// Seconds to back off after the API rate-limits us
    #[serde(default = "default_chill_secs")]
    pub chill_secs: u64,

    /// OpenSky REST API root
    #[serde(default = "default_api_url")]
    pub opensky_api_url: String,

    /// HTTP timeout per query (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// OpenSky username (optional, env var takes precedence)
    #[serde(default)]
    pub opensky_username: Option<String>,

    /// OpenSky password (optional, env var takes precedence)
    #[serde(default)]
    pub opensky_password: Option<String>,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    1
}

fn default_latitude() -> f64 {
    DEFAULT_LATITUDE
}

fn default_longitude() -> f64 {
    DEFAULT_LONGITUDE
}

fn default_alert_distance_km() -> f64 {
    DEFAULT_ALERT_DISTANCE_KM
}

fn default_range_deg() -> f64 {
    DEFAULT_RANGE_DEG
}

fn default_interval_secs() -> u64 {
    DEFAULT_API_CALL_INTERVAL_SECS
}

fn default_alert_interval_secs() -> u64 {
    ALERT_API_CALL_INTERVAL_SECS
}

fn default_chill_secs() -> u64 {
    DEFAULT_CHILL_SECS
}

fn default_api_url() -> String {
    DEFAULT_OPENSKY_API_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT.as_secs()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
            alert_distance_km: DEFAULT_ALERT_DISTANCE_KM,
            range_deg: DEFAULT_RANGE_DEG,
            default_interval_secs: DEFAULT_API_CALL_INTERVAL_SECS,
            alert_interval_secs: ALERT_API_CALL_INTERVAL_SECS,
            chill_secs: DEFAULT_CHILL_SECS,
            opensky_api_url: default_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
            opensky_username: None,
            opensky_password: None,
        }
    }
}

/// Prefer a non-empty environment value, then a non-empty config value.
fn resolve_value(env_value: Option<String>, config_value: Option<&str>) -> Option<String> {
    env_value
        .filter(|v| !v.is_empty())
        .or_else(|| config_value.map(ToString::to_string).filter(|v| !v.is_empty()))
}

impl AppConfig {
    /// Load configuration from disk, creating it with defaults on first run
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load(APP_NAME, CONFIG_NAME)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    /// Engine settings derived from this configuration
    #[must_use]
    pub fn alert_config(&self) -> AlertConfig {
        AlertConfig {
            observer: ObserverLocation::new(self.latitude, self.longitude),
            alert_distance_km: self.alert_distance_km,
            range_deg: self.range_deg,
            timings: PollTimings {
                default_interval: Duration::from_secs(self.default_interval_secs),
                alert_interval: Duration::from_secs(self.alert_interval_secs),
                chill: Duration::from_secs(self.chill_secs),
            },
        }
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Resolve OpenSky credentials from the environment or config file.
    ///
    /// Returns `None` (anonymous access) unless both username and password
    /// are available.
    #[must_use]
    pub fn resolve_credentials(&self) -> Option<Credentials> {
        self.credentials_from(
            std::env::var(USERNAME_ENV).ok(),
            std::env::var(PASSWORD_ENV).ok(),
        )
    }

    fn credentials_from(
        &self,
        env_username: Option<String>,
        env_password: Option<String>,
    ) -> Option<Credentials> {
        let username = resolve_value(env_username, self.opensky_username.as_deref())?;
        let password = resolve_value(env_password, self.opensky_password.as_deref())?;
        Some(Credentials { username, password })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.alert_config().validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"latitude": 51.47, "longitude": -0.4543, "chill_secs": 600}"#)
                .unwrap();
        let alert = config.alert_config();
        assert!((alert.observer.latitude - 51.47).abs() < f64::EPSILON);
        assert_eq!(alert.timings.chill, Duration::from_secs(600));
        assert_eq!(alert.timings.default_interval, Duration::from_secs(10));
        assert!((alert.alert_distance_km - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_env_credentials_take_precedence() {
        let config = AppConfig {
            opensky_username: Some("file_user".to_string()),
            opensky_password: Some("file_pass".to_string()),
            ..Default::default()
        };

        let creds = config
            .credentials_from(Some("env_user".to_string()), None)
            .unwrap();
        assert_eq!(creds.username, "env_user");
        assert_eq!(creds.password, "file_pass");
    }

    #[test]
    fn test_credentials_require_both_parts() {
        let config = AppConfig {
            opensky_username: Some("file_user".to_string()),
            opensky_password: Some(String::new()),
            ..Default::default()
        };
        assert!(config.credentials_from(None, None).is_none());
        assert!(AppConfig::default().credentials_from(Some(String::new()), None).is_none());
    }
}
