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

//! Live flight feed client with scene entity reconciliation.
//!
//! This library keeps a set of rendered flight entities consistent with a
//! periodically polled flight feed. Its layers can be used independently or
//! composed together:
//!
//! - **Feed layer**: flight records and the REST client ([`HttpFlightFeed`])
//! - **Scene layer**: the renderer contract ([`SceneRenderer`]) and an
//!   in-memory scene
//! - **Registry layer**: identifier → entity reconciliation ([`EntityRegistry`])
//! - **Scheduler layer**: single-flight periodic refresh ([`RefreshScheduler`])
//!
//! # Quick Start
//!
//! ```no_run
//! use airspace_client::{spawn_tracker, SharedScene, TrackerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scene = SharedScene::new();
//!     let mut scheduler = spawn_tracker(&TrackerConfig::default(), scene.clone())?;
//!
//!     let mut status = scheduler.subscribe();
//!     while status.changed().await.is_ok() {
//!         let snapshot = status.borrow_and_update().clone();
//!         println!("{} flights, {} on the globe", snapshot.flights.len(), scene.len());
//!     }
//!
//!     scheduler.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Registry Only
//!
//! ```
//! use airspace_client::{EntityCollection, EntityRegistry, FlightRecord, UnknownPositionPolicy};
//!
//! let mut registry = EntityRegistry::new(EntityCollection::new(), UnknownPositionPolicy::Remove);
//! let report = registry.reconcile(&[FlightRecord::new("A").at(10.0, 20.0, 9000.0)]);
//! assert_eq!(report.created, 1);
//!
//! let report = registry.reconcile(&[]);
//! assert_eq!(report.removed, 1);
//! assert!(registry.renderer().is_empty());
//! ```

pub mod feed;
pub mod registry;
pub mod scene;
pub mod scheduler;

pub use feed::{FeedConfig, FeedError, FlightRecord, FlightSource, FlightStatus, HttpFlightFeed};
pub use registry::{
    EntityRegistry, ReconcileReport, RegistryEvent, RenderFailure, RenderOp, TrackedEntity,
    UnknownPositionPolicy,
};
pub use scene::{
    EntityCollection, EntityHandle, EntityState, Position, RenderError, SceneEntity,
    SceneRenderer, SharedScene,
};
pub use scheduler::{FeedStatus, RefreshScheduler, SchedulerConfig};

/// Configuration for the full stack: feed, registry, and scheduler.
#[derive(Debug, Clone, Default)]
pub struct TrackerConfig {
    /// Flight API connection settings.
    pub feed: FeedConfig,
    /// Refresh interval.
    pub scheduler: SchedulerConfig,
    /// Handling of tracked flights that lose their position.
    pub unknown_position: UnknownPositionPolicy,
}

/// Wire an HTTP feed, a registry over `renderer`, and a started scheduler.
///
/// Must be called from within a tokio runtime. The caller keeps ownership of
/// the scene's lifecycle; stopping the scheduler never clears it.
pub fn spawn_tracker<R>(
    config: &TrackerConfig,
    renderer: R,
) -> Result<RefreshScheduler<HttpFlightFeed, R>, FeedError>
where
    R: SceneRenderer + Send + 'static,
{
    let feed = HttpFlightFeed::new(&config.feed)?;
    let registry = EntityRegistry::new(renderer, config.unknown_position);
    let mut scheduler = RefreshScheduler::new(feed, registry, config.scheduler.clone());
    scheduler.start();
    Ok(scheduler)
}
