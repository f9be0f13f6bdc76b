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

//! Proximity evaluation over one batch of state reports.

use log::debug;

use crate::alert::{AlertEmitter, AlertEvent, AlertSink};
use crate::geo::ObserverLocation;
use crate::report::AircraftStateReport;

/// Emit an alert for every report closer than `threshold_km` to the observer.
///
/// Reports are visited in input order. Reports without a position fix are
/// skipped. Returns `true` if at least one alert fired.
pub fn evaluate<K: AlertSink>(
    observer: ObserverLocation,
    threshold_km: f64,
    reports: &[AircraftStateReport],
    emitter: &AlertEmitter<K>,
) -> bool {
    let mut alert_triggered = false;

    for report in reports {
        let Some((lat, lon)) = report.position() else {
            continue;
        };

        let distance = observer.distance_to(lat, lon);
        if distance < threshold_km {
            debug!("{} is {:.2} km from observer", report.callsign, distance);
            emitter.emit(&AlertEvent::new(report.clone(), distance));
            alert_triggered = true;
        }
    }

    alert_triggered
}
