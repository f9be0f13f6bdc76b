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

//! Proximity alerting engine for polled aircraft state reports.
//!
//! The engine repeatedly samples aircraft around a fixed observer and raises
//! an alert for every aircraft closer than a configured distance. It is split
//! into layers that can be used independently:
//!
//! - **Geo**: haversine distance and the bounding box queried around the observer
//! - **Proximity**: evaluates one batch of [`AircraftStateReport`]s
//! - **Alert**: renders [`AlertEvent`]s and delivers them to an [`AlertSink`]
//! - **Source**: the [`StateSource`] trait implemented by upstream providers
//! - **Scheduler**: the poll loop with adaptive cadence and rate-limit cooldown
//!
//! # Quick Start
//!
//! ```no_run
//! use alert_engine::{
//!     AircraftStateReport, AlertConfig, AlertEmitter, BoundingBox, ConsoleSink, Scheduler,
//!     SourceError, StateSource,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! struct EmptySky;
//!
//! impl StateSource for EmptySky {
//!     async fn fetch(&self, _bbox: &BoundingBox) -> Result<Vec<AircraftStateReport>, SourceError> {
//!         Ok(Vec::new())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let scheduler = Scheduler::new(EmptySky, AlertEmitter::new(ConsoleSink), AlertConfig::default());
//!     scheduler.run(&CancellationToken::new()).await;
//! }
//! ```
//!
//! # Evaluating a Single Batch
//!
//! ```
//! use alert_engine::{evaluate, AircraftStateReport, AlertEmitter, ObserverLocation, RecordingSink};
//!
//! let observer = ObserverLocation::new(41.4995, -81.69541);
//! let emitter = AlertEmitter::new(RecordingSink::new());
//! let report = AircraftStateReport {
//!     icao24: "a1b2c3".to_string(),
//!     callsign: "UAL123".to_string(),
//!     origin_country: "United States".to_string(),
//!     latitude: Some(41.50),
//!     longitude: Some(-81.70),
//!     baro_altitude: Some(450.0),
//!     velocity: Some(70.0),
//!     heading: None,
//!     on_ground: false,
//!     last_contact: 1_700_000_000,
//! };
//!
//! assert!(evaluate(observer, 3.0, &[report], &emitter));
//! assert!(emitter.sink().lines()[0].contains("Heading: Unknown degrees"));
//! ```

pub mod alert;
pub mod config;
pub mod geo;
pub mod proximity;
pub mod report;
pub mod scheduler;
pub mod source;

pub use alert::{format_utc_timestamp, AlertEmitter, AlertEvent, AlertSink, ConsoleSink, RecordingSink};
pub use config::{AlertConfig, ConfigError, PollTimings};
pub use geo::{distance_km, BoundingBox, ObserverLocation};
pub use proximity::evaluate;
pub use report::AircraftStateReport;
pub use scheduler::{Cadence, CycleOutcome, Scheduler};
pub use source::{SourceError, StateSource};
