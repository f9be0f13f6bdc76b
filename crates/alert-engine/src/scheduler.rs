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

//! Poll loop with adaptive cadence and rate-limit cooldown.
//!
//! Each cycle fetches the state reports around the observer, evaluates them
//! and yields a [`CycleOutcome`]. The outcome alone decides how long to wait
//! before the next cycle:
//!
//! - a cycle that raised an alert polls again after the short alert interval,
//! - any other completed cycle (including empty or failed fetches) uses the
//!   default interval,
//! - a rate-limited fetch enters a cooldown for the chill duration.
//!
//! The loop only stops when its [`CancellationToken`] is cancelled.

use std::time::Duration;

use chrono::Utc;
use log::{debug, error, info, warn};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::alert::{AlertEmitter, AlertSink};
use crate::config::{AlertConfig, PollTimings};
use crate::geo::BoundingBox;
use crate::proximity::evaluate;
use crate::source::{SourceError, StateSource};

/// Which polling interval is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// No alert in the last cycle.
    Normal,
    /// At least one alert in the last cycle.
    Alerted,
}

/// Result of a single poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Reports were evaluated (possibly none).
    Polled(Cadence),
    /// The upstream rate-limited the request; nothing was evaluated.
    Cooldown,
}

impl CycleOutcome {
    /// How long to wait before the next cycle.
    #[must_use]
    pub fn wait(self, timings: &PollTimings) -> Duration {
        match self {
            Self::Polled(Cadence::Normal) => timings.default_interval,
            Self::Polled(Cadence::Alerted) => timings.alert_interval,
            Self::Cooldown => timings.chill,
        }
    }
}

/// Drives fetch, evaluate, emit and wait for one observer.
#[derive(Debug)]
pub struct Scheduler<S, K> {
    source: S,
    emitter: AlertEmitter<K>,
    config: AlertConfig,
}

impl<S: StateSource, K: AlertSink> Scheduler<S, K> {
    #[must_use]
    pub fn new(source: S, emitter: AlertEmitter<K>, config: AlertConfig) -> Self {
        Self {
            source,
            emitter,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    #[must_use]
    pub fn emitter(&self) -> &AlertEmitter<K> {
        &self.emitter
    }

    /// Run a single poll cycle without waiting afterwards.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let bbox = BoundingBox::around(self.config.observer, self.config.range_deg);

        let reports = match self.source.fetch(&bbox).await {
            Ok(reports) => {
                if reports.is_empty() {
                    info!("No aircraft data available in the specified area");
                } else {
                    debug!("Retrieved {} aircraft states", reports.len());
                }
                reports
            }
            Err(SourceError::RateLimited) => {
                warn!(
                    "Rate limit exceeded, cooling down for {} seconds",
                    self.config.timings.chill.as_secs()
                );
                return CycleOutcome::Cooldown;
            }
            Err(e) => {
                error!("Failed to fetch aircraft states: {}", e);
                Vec::new()
            }
        };

        let alert_triggered = evaluate(
            self.config.observer,
            self.config.alert_distance_km,
            &reports,
            &self.emitter,
        );

        if alert_triggered {
            CycleOutcome::Polled(Cadence::Alerted)
        } else {
            CycleOutcome::Polled(Cadence::Normal)
        }
    }

    /// Poll until `cancel_token` is cancelled.
    pub async fn run(&self, cancel_token: &CancellationToken) {
        self.run_for(cancel_token, None).await;
    }

    /// Poll until cancelled or until `max_cycles` cycles (each followed by its
    /// wait) have completed. Returns the number of completed cycles.
    pub async fn run_for(&self, cancel_token: &CancellationToken, max_cycles: Option<u64>) -> u64 {
        let mut completed: u64 = 0;

        info!(
            "Watching {:.4}, {:.4} for aircraft within {} km",
            self.config.observer.latitude,
            self.config.observer.longitude,
            self.config.alert_distance_km
        );

        loop {
            if cancel_token.is_cancelled() {
                info!("Polling cancelled");
                return completed;
            }
            if max_cycles.is_some_and(|max| completed >= max) {
                return completed;
            }

            let outcome = self.run_cycle().await;
            let wait = outcome.wait(&self.config.timings);
            debug!("{:?}, next poll in {} seconds", outcome, wait.as_secs());

            tokio::select! {
                () = sleep(wait) => {}
                () = cancel_token.cancelled() => {
                    info!("Polling cancelled during wait");
                    return completed;
                }
            }

            completed += 1;
            if outcome == CycleOutcome::Cooldown {
                info!("Cooldown finished, resuming polling");
            }
            debug!("time check {}", Utc::now().format("%Y-%m-%d %H:%M:%S"));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use tokio::time::Instant;

    use super::*;
    use crate::alert::RecordingSink;
    use crate::report::{sample_report, AircraftStateReport};

    /// Mock source replaying scripted results, then empty batches.
    struct MockSource {
        results: Mutex<VecDeque<Result<Vec<AircraftStateReport>, SourceError>>>,
        calls: AtomicUsize,
        last_bbox: Mutex<Option<BoundingBox>>,
    }

    impl MockSource {
        fn new(results: Vec<Result<Vec<AircraftStateReport>, SourceError>>) -> Self {
            Self {
                results: Mutex::new(results.into()),
                calls: AtomicUsize::new(0),
                last_bbox: Mutex::new(None),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl StateSource for MockSource {
        async fn fetch(&self, bbox: &BoundingBox) -> Result<Vec<AircraftStateReport>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_bbox.lock().unwrap() = Some(*bbox);
            self.results.lock().unwrap().pop_front().unwrap_or(Ok(Vec::new()))
        }
    }

    fn overhead() -> AircraftStateReport {
        sample_report("UAL123", Some(41.4995), Some(-81.69541))
    }

    fn scheduler(
        results: Vec<Result<Vec<AircraftStateReport>, SourceError>>,
    ) -> Scheduler<MockSource, RecordingSink> {
        Scheduler::new(
            MockSource::new(results),
            AlertEmitter::new(RecordingSink::new()),
            AlertConfig::default(),
        )
    }

    #[test]
    fn test_outcome_wait_durations() {
        let timings = PollTimings::default();
        assert_eq!(CycleOutcome::Polled(Cadence::Alerted).wait(&timings), timings.alert_interval);
        assert_eq!(CycleOutcome::Polled(Cadence::Normal).wait(&timings), timings.default_interval);
        assert_eq!(CycleOutcome::Cooldown.wait(&timings), timings.chill);
    }

    #[tokio::test]
    async fn test_alert_cycle_selects_alerted_cadence() {
        let scheduler = scheduler(vec![Ok(vec![overhead()])]);
        assert_eq!(scheduler.run_cycle().await, CycleOutcome::Polled(Cadence::Alerted));
        assert_eq!(scheduler.emitter().sink().lines().len(), 1);
    }

    #[tokio::test]
    async fn test_quiet_cycle_selects_normal_cadence() {
        let far = sample_report("FAR", Some(45.0), Some(-81.69541));
        let scheduler = scheduler(vec![Ok(vec![far])]);
        assert_eq!(scheduler.run_cycle().await, CycleOutcome::Polled(Cadence::Normal));
        assert!(scheduler.emitter().sink().lines().is_empty());
    }

    #[tokio::test]
    async fn test_empty_fetch_is_not_an_error() {
        let scheduler = scheduler(vec![Ok(Vec::new())]);
        assert_eq!(scheduler.run_cycle().await, CycleOutcome::Polled(Cadence::Normal));
    }

    #[tokio::test]
    async fn test_upstream_error_treated_as_empty_cycle() {
        let scheduler = scheduler(vec![Err(SourceError::Upstream("503".to_string()))]);
        assert_eq!(scheduler.run_cycle().await, CycleOutcome::Polled(Cadence::Normal));
        assert!(scheduler.emitter().sink().lines().is_empty());
    }

    #[tokio::test]
    async fn test_rate_limit_enters_cooldown_without_evaluating() {
        let scheduler = scheduler(vec![Err(SourceError::RateLimited)]);
        assert_eq!(scheduler.run_cycle().await, CycleOutcome::Cooldown);
        assert!(scheduler.emitter().sink().lines().is_empty());
    }

    #[tokio::test]
    async fn test_cycle_queries_box_around_observer() {
        let scheduler = scheduler(Vec::new());
        scheduler.run_cycle().await;

        let bbox = scheduler.source.last_bbox.lock().unwrap().take().unwrap();
        let config = AlertConfig::default();
        assert_eq!(bbox, BoundingBox::around(config.observer, config.range_deg));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_sleeps_exactly_chill() {
        let scheduler = scheduler(vec![Err(SourceError::RateLimited)]);
        let token = CancellationToken::new();

        let start = Instant::now();
        assert_eq!(scheduler.run_for(&token, Some(1)).await, 1);
        assert_eq!(start.elapsed(), Duration::from_secs(3600));
        assert_eq!(scheduler.source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cadence_follows_preceding_cycle() {
        // alert -> 5s, quiet -> 10s, alert -> 5s, error -> 10s
        let scheduler = scheduler(vec![
            Ok(vec![overhead()]),
            Ok(Vec::new()),
            Ok(vec![overhead()]),
            Err(SourceError::Decode("bad json".to_string())),
        ]);
        let token = CancellationToken::new();

        let start = Instant::now();
        assert_eq!(scheduler.run_for(&token, Some(4)).await, 4);
        assert_eq!(start.elapsed(), Duration::from_secs(30));
        assert_eq!(scheduler.emitter().sink().lines().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_resumes_after_cooldown() {
        let scheduler = scheduler(vec![Err(SourceError::RateLimited), Ok(vec![overhead()])]);
        let token = CancellationToken::new();

        let start = Instant::now();
        assert_eq!(scheduler.run_for(&token, Some(2)).await, 2);
        assert_eq!(start.elapsed(), Duration::from_secs(3600 + 5));
        assert_eq!(scheduler.source.calls(), 2);
        assert_eq!(scheduler.emitter().sink().lines().len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_does_not_poll() {
        let scheduler = scheduler(Vec::new());
        let token = CancellationToken::new();
        token.cancel();

        assert_eq!(scheduler.run_for(&token, None).await, 0);
        assert_eq!(scheduler.source.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_wait() {
        let scheduler = scheduler(vec![Err(SourceError::RateLimited)]);
        let token = CancellationToken::new();

        let canceller = token.clone();
        let cancel_after = async move {
            sleep(Duration::from_secs(60)).await;
            canceller.cancel();
        };

        let start = Instant::now();
        tokio::join!(scheduler.run(&token), cancel_after);
        assert!(start.elapsed() < Duration::from_secs(3600));
        assert_eq!(scheduler.source.calls(), 1);
    }
}
