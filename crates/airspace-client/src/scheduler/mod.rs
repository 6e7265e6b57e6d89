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

//! Periodic fetch-and-reconcile scheduling.
//!
//! A [`RefreshScheduler`] runs one background task that fetches the flight
//! set immediately on [`start`](RefreshScheduler::start) and then on every
//! interval tick, reconciling each successful result into the registry.
//!
//! Cycles are single-flight: ticks or manual refresh requests that arrive
//! while a fetch is outstanding are skipped, never queued or overlapped.
//! A failed fetch leaves the registry and scene untouched and raises the
//! error in [`FeedStatus`] until the next success.
//!
//! [`stop`](RefreshScheduler::stop) cancels the timer and the in-flight fetch.
//! A generation counter checked under the registry lock guarantees that no
//! result is applied once `stop` has returned.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::feed::{FeedError, FlightRecord, FlightSource};
use crate::registry::EntityRegistry;
use crate::scene::SceneRenderer;

/// Configuration for the refresh scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between refresh cycles.
    pub interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
        }
    }
}

/// Snapshot of the feed for the presentation layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedStatus {
    /// Flight set from the last successful fetch.
    pub flights: Vec<FlightRecord>,
    /// When the last successful cycle completed.
    pub last_update: Option<DateTime<Utc>>,
    /// Error from the most recent cycle, cleared on the next success.
    pub error: Option<String>,
    /// Completed cycles, successful or not.
    pub cycles: u64,
    pub consecutive_failures: u32,
    /// Entities in the scene after the last successful cycle.
    pub tracked_entities: usize,
    /// Renderer calls that failed during the last successful cycle.
    pub render_failures: usize,
    /// Ticks and refresh requests dropped because a cycle was in flight.
    pub skipped_ticks: u64,
}

impl FeedStatus {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.error.is_none()
    }
}

struct Shared<S, R> {
    source: S,
    registry: Mutex<EntityRegistry<R>>,
    status_tx: watch::Sender<FeedStatus>,
    generation: AtomicU64,
}

impl<S, R: SceneRenderer> Shared<S, R> {
    fn lock_registry(&self) -> MutexGuard<'_, EntityRegistry<R>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_skipped_tick(&self) {
        warn!("Refresh skipped: previous cycle still in flight");
        self.status_tx.send_modify(|status| status.skipped_ticks += 1);
    }

    /// Apply the outcome of a fetch, unless its cycle has been cancelled.
    fn apply(
        &self,
        generation: u64,
        cancel_token: &CancellationToken,
        result: Result<Vec<FlightRecord>, FeedError>,
    ) {
        let mut registry = self.lock_registry();
        if cancel_token.is_cancelled() || self.generation.load(Ordering::SeqCst) != generation {
            debug!("Discarding result of a cancelled refresh cycle");
            return;
        }

        match result {
            Ok(flights) => {
                let report = registry.reconcile(&flights);
                if report.has_changes() {
                    debug!(
                        "Reconciled {} flights: {} created, {} updated, {} removed",
                        flights.len(),
                        report.created,
                        report.updated,
                        report.removed
                    );
                }
                for failure in &report.failures {
                    warn!("Render {} failed for flight {}: {}", failure.op, failure.id, failure.error);
                }

                let tracked = registry.len();
                self.status_tx.send_modify(|status| {
                    status.flights = flights;
                    status.last_update = Some(Utc::now());
                    status.error = None;
                    status.cycles += 1;
                    status.consecutive_failures = 0;
                    status.tracked_entities = tracked;
                    status.render_failures = report.failures.len();
                });
            }
            Err(err) => {
                warn!("Flight refresh failed: {err}");
                self.status_tx.send_modify(|status| {
                    status.error = Some(format!("Failed to fetch flight data: {err}"));
                    status.cycles += 1;
                    status.consecutive_failures += 1;
                });
            }
        }
    }
}

struct Running {
    cancel_token: CancellationToken,
    refresh_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

/// Drives fetch-and-reconcile cycles on a fixed interval.
pub struct RefreshScheduler<S, R> {
    shared: Arc<Shared<S, R>>,
    config: SchedulerConfig,
    running: Option<Running>,
}

impl<S, R> std::fmt::Debug for RefreshScheduler<S, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshScheduler")
            .field("config", &self.config)
            .field("running", &self.running.is_some())
            .finish_non_exhaustive()
    }
}

impl<S, R> RefreshScheduler<S, R>
where
    S: FlightSource,
    R: SceneRenderer + Send + 'static,
{
    /// Create a stopped scheduler feeding `registry` from `source`.
    #[must_use]
    pub fn new(source: S, registry: EntityRegistry<R>, config: SchedulerConfig) -> Self {
        let (status_tx, _) = watch::channel(FeedStatus::default());
        Self {
            shared: Arc::new(Shared {
                source,
                registry: Mutex::new(registry),
                status_tx,
                generation: AtomicU64::new(0),
            }),
            config,
            running: None,
        }
    }

    /// Start refreshing: one cycle now, then one per interval.
    ///
    /// Must be called from within a tokio runtime. Does nothing if already
    /// running.
    pub fn start(&mut self) {
        if self.running.is_some() {
            warn!("Refresh scheduler already running");
            return;
        }

        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel_token = CancellationToken::new();
        let (refresh_tx, refresh_rx) = mpsc::channel(1);

        info!(
            "Starting flight refresh every {:.1}s",
            self.config.interval.as_secs_f64()
        );

        let task = tokio::spawn(refresh_loop(
            Arc::clone(&self.shared),
            self.config.interval,
            generation,
            cancel_token.clone(),
            refresh_rx,
        ));

        self.running = Some(Running {
            cancel_token,
            refresh_tx,
            task,
        });
    }

    /// Stop refreshing. Idempotent.
    ///
    /// No cycle starts afterwards and an in-flight fetch is never applied.
    /// Scene entities are left in place for the scene's owner to release.
    pub fn stop(&mut self) {
        drop(self.halt());
    }

    /// Stop refreshing and wait for the background task to exit.
    pub async fn shutdown(&mut self) {
        if let Some(task) = self.halt() {
            if let Err(e) = task.await {
                warn!("Refresh task ended abnormally: {e}");
            }
        }
    }

    fn halt(&mut self) -> Option<JoinHandle<()>> {
        let running = self.running.take()?;
        running.cancel_token.cancel();
        {
            // Results are applied under this lock, so after the bump any
            // straggling cycle sees a stale generation.
            let _registry = self.shared.lock_registry();
            self.shared.generation.fetch_add(1, Ordering::SeqCst);
        }
        info!("Flight refresh stopped");
        Some(running.task)
    }

    /// Request an immediate cycle.
    ///
    /// Returns `false` when the scheduler is stopped or a request is already
    /// pending. A request that lands while a cycle is in flight is skipped.
    pub fn refresh_now(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| running.refresh_tx.try_send(()).is_ok())
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Watch the presentation snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FeedStatus> {
        self.shared.status_tx.subscribe()
    }

    /// Current presentation snapshot.
    #[must_use]
    pub fn status(&self) -> FeedStatus {
        self.shared.status_tx.borrow().clone()
    }

    /// Inspect the registry between cycles.
    pub fn with_registry<T>(&self, f: impl FnOnce(&EntityRegistry<R>) -> T) -> T {
        f(&self.shared.lock_registry())
    }
}

impl<S, R> Drop for RefreshScheduler<S, R> {
    fn drop(&mut self) {
        if let Some(running) = &self.running {
            running.cancel_token.cancel();
        }
    }
}

async fn refresh_loop<S, R>(
    shared: Arc<Shared<S, R>>,
    interval: Duration,
    generation: u64,
    cancel_token: CancellationToken,
    mut refresh_rx: mpsc::Receiver<()>,
) where
    S: FlightSource,
    R: SceneRenderer + Send + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            () = cancel_token.cancelled() => break,
            _ = ticker.tick() => {}
            Some(()) = refresh_rx.recv() => debug!("Manual refresh requested"),
        }

        let fetch = shared.source.fetch_all();
        tokio::pin!(fetch);

        let result = loop {
            tokio::select! {
                biased;
                () = cancel_token.cancelled() => {
                    debug!("Refresh cancelled with a fetch in flight, discarding it");
                    return;
                }
                result = &mut fetch => break result,
                _ = ticker.tick() => shared.record_skipped_tick(),
                Some(()) = refresh_rx.recv() => shared.record_skipped_tick(),
            }
        };

        shared.apply(generation, &cancel_token, result);
    }

    debug!("Refresh loop exited");
}
