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

//! Alert construction, rendering and delivery.
//!
//! An [`AlertEvent`] is built from a state report at the moment proximity is
//! detected. The [`AlertEmitter`] renders it into a single line and writes it
//! to an [`AlertSink`]. Delivery is best-effort: a failing sink is logged and
//! the alert is dropped.

use std::fmt;
use std::io::{self, Write};
use std::sync::Mutex;

use chrono::DateTime;
use log::warn;

use crate::report::AircraftStateReport;

/// Marker rendered for any value the aircraft did not report.
pub const UNKNOWN: &str = "Unknown";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a Unix timestamp (seconds) as a UTC `YYYY-MM-DD HH:MM:SS` string.
#[must_use]
pub fn format_utc_timestamp(epoch_secs: i64) -> String {
    DateTime::from_timestamp(epoch_secs, 0).map_or_else(
        || UNKNOWN.to_string(),
        |dt| dt.format(TIMESTAMP_FORMAT).to_string(),
    )
}

fn render_optional(value: Option<f64>) -> String {
    value.map_or_else(|| UNKNOWN.to_string(), |v| v.to_string())
}

/// A proximity alert for one aircraft in one poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub report: AircraftStateReport,
    /// Distance from the observer in kilometers.
    pub distance_km: f64,
    /// Heading as rendered in the message ("Unknown" when absent).
    pub heading: String,
    /// Last contact as a UTC calendar string.
    pub last_contact_utc: String,
}

impl AlertEvent {
    #[must_use]
    pub fn new(report: AircraftStateReport, distance_km: f64) -> Self {
        let heading = render_optional(report.heading);
        let last_contact_utc = format_utc_timestamp(report.last_contact);
        Self {
            report,
            distance_km,
            heading,
            last_contact_utc,
        }
    }
}

impl fmt::Display for AlertEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Alert: Aircraft {} is within proximity. \
             Origin Country: {}, \
             Altitude: {} meters, \
             Velocity: {} m/s, \
             Heading: {} degrees, \
             On Ground: {}, \
             Last Contact: {} UTC, \
             Distance: {:.2} km",
            self.report.callsign,
            self.report.origin_country,
            render_optional(self.report.baro_altitude),
            render_optional(self.report.velocity),
            self.heading,
            if self.report.on_ground { "Yes" } else { "No" },
            self.last_contact_utc,
            self.distance_km,
        )
    }
}

/// Destination for rendered alert lines.
pub trait AlertSink {
    /// Write one alert line.
    fn write_line(&self, line: &str) -> io::Result<()>;
}

/// Writes alerts to standard output, each followed by a blank line.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl AlertSink for ConsoleSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{line}")?;
        writeln!(out)?;
        out.flush()
    }
}

/// Keeps every delivered line in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<String>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines written so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl AlertSink for RecordingSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        self.lines
            .lock()
            .map_err(|e| io::Error::other(e.to_string()))?
            .push(line.to_string());
        Ok(())
    }
}

impl<S: AlertSink + ?Sized> AlertSink for &S {
    fn write_line(&self, line: &str) -> io::Result<()> {
        (**self).write_line(line)
    }
}

/// Renders alert events and hands them to a sink.
#[derive(Debug)]
pub struct AlertEmitter<K> {
    sink: K,
}

impl<K: AlertSink> AlertEmitter<K> {
    #[must_use]
    pub fn new(sink: K) -> Self {
        Self { sink }
    }

    #[must_use]
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Deliver an alert. Sink failures are logged and the alert is dropped.
    pub fn emit(&self, event: &AlertEvent) {
        let message = event.to_string();
        if let Err(e) = self.sink.write_line(&message) {
            warn!(
                "Dropped alert for {}: sink unavailable: {}",
                event.report.callsign, e
            );
        }
    }
}
