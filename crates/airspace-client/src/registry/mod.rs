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

//! Entity registry and reconciliation.
//!
//! The registry maps flight identifiers to the scene entities drawn for them.
//! Each poll hands [`EntityRegistry::reconcile`] the complete current flight
//! set, and the registry converges the scene onto it:
//!
//! - entities whose flight disappeared are removed first,
//! - flights seen for the first time (with a known position) are created,
//! - flights already on screen are updated in place, never recreated.
//!
//! A failing renderer call only affects its own entity. The rest of the
//! cycle proceeds and the failure is returned in the [`ReconcileReport`].

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;

use log::{debug, error, warn};
use tokio::sync::broadcast;

use crate::feed::FlightRecord;
use crate::scene::{EntityHandle, EntityState, RenderError, SceneRenderer};

/// What to do with a tracked flight that arrives without a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownPositionPolicy {
    /// Treat the flight as temporarily absent and remove its entity.
    #[default]
    Remove,
    /// Leave the entity untouched at its last known position.
    Retain,
}

/// A flight currently materialized in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedEntity {
    pub id: String,
    pub handle: EntityHandle,
    /// State last written to the renderer.
    pub applied: EntityState,
}

/// Renderer capability that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOp {
    Create,
    Update,
    Remove,
}

impl fmt::Display for RenderOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Remove => "remove",
        })
    }
}

/// A single entity whose renderer call failed during a cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFailure {
    pub id: String,
    pub op: RenderOp,
    pub error: RenderError,
}

/// Outcome of one reconciliation cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    pub created: usize,
    pub updated: usize,
    /// Tracked flights whose state had not changed.
    pub unchanged: usize,
    pub removed: usize,
    /// Untracked flights skipped because their position is unknown.
    pub skipped_unknown: usize,
    /// Tracked flights left in place without a position (`Retain` policy).
    pub retained: usize,
    pub failures: Vec<RenderFailure>,
}

impl ReconcileReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Whether the cycle wrote anything to the renderer.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.created + self.updated + self.removed > 0
    }
}

/// Events emitted when entities are materialized, moved, or dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    EntityCreated(String),
    EntityUpdated(String),
    EntityRemoved(String),
}

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Identifier → entity map kept consistent with a [`SceneRenderer`].
pub struct EntityRegistry<R> {
    renderer: R,
    entities: HashMap<String, TrackedEntity>,
    policy: UnknownPositionPolicy,
    event_tx: broadcast::Sender<RegistryEvent>,
}

impl<R> fmt::Debug for EntityRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("entity_count", &self.entities.len())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl<R: SceneRenderer> EntityRegistry<R> {
    /// Create an empty registry driving `renderer`.
    #[must_use]
    pub fn new(renderer: R, policy: UnknownPositionPolicy) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            renderer,
            entities: HashMap::new(),
            policy,
            event_tx,
        }
    }

    /// Converge the scene onto `flights`, the complete current flight set.
    pub fn reconcile(&mut self, flights: &[FlightRecord]) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let flights = latest_per_id(flights);

        let keep: HashSet<&str> = flights
            .iter()
            .copied()
            .filter(|flight| {
                flight.has_position()
                    || (self.policy == UnknownPositionPolicy::Retain
                        && self.entities.contains_key(&flight.flight_id))
            })
            .map(|flight| flight.flight_id.as_str())
            .collect();

        // Removals complete before any create so one cycle never holds an
        // outgoing and an incoming entity at the same time.
        let mut stale: Vec<String> = self
            .entities
            .keys()
            .filter(|id| !keep.contains(id.as_str()))
            .cloned()
            .collect();
        stale.sort_unstable();

        for id in stale {
            self.remove(&id, &mut report);
        }

        for flight in flights {
            let Some(state) = flight.entity_state() else {
                let tracked = self.entities.contains_key(&flight.flight_id);
                if !tracked {
                    report.skipped_unknown += 1;
                } else if self.policy == UnknownPositionPolicy::Retain {
                    report.retained += 1;
                }
                continue;
            };

            if self.entities.contains_key(&flight.flight_id) {
                self.update(&flight.flight_id, state, &mut report);
            } else {
                self.create(&flight.flight_id, state, &mut report);
            }
        }

        report
    }

    fn remove(&mut self, id: &str, report: &mut ReconcileReport) {
        let Some(handle) = self.entities.get(id).map(|entity| entity.handle) else {
            return;
        };

        match self.renderer.remove_entity(handle) {
            Ok(()) => {
                self.entities.remove(id);
                report.removed += 1;
                debug!("Removed entity for flight {id}");
                let _ = self.event_tx.send(RegistryEvent::EntityRemoved(id.to_string()));
            }
            Err(err @ RenderError::UnknownHandle(_)) => {
                // The scene no longer holds it; stop tracking so the two agree.
                error!("Scene lost entity for flight {id}: {err}");
                self.entities.remove(id);
                report.failures.push(RenderFailure {
                    id: id.to_string(),
                    op: RenderOp::Remove,
                    error: err,
                });
                let _ = self.event_tx.send(RegistryEvent::EntityRemoved(id.to_string()));
            }
            Err(err) => {
                warn!("Failed to remove entity for flight {id}, will retry: {err}");
                report.failures.push(RenderFailure {
                    id: id.to_string(),
                    op: RenderOp::Remove,
                    error: err,
                });
            }
        }
    }

    fn create(&mut self, id: &str, state: EntityState, report: &mut ReconcileReport) {
        match self.renderer.create_entity(id, &state) {
            Ok(handle) => {
                debug!("Created entity {handle} for flight {id} at {}", state.position);
                self.entities.insert(
                    id.to_string(),
                    TrackedEntity {
                        id: id.to_string(),
                        handle,
                        applied: state,
                    },
                );
                report.created += 1;
                let _ = self.event_tx.send(RegistryEvent::EntityCreated(id.to_string()));
            }
            Err(err) => {
                warn!("Failed to create entity for flight {id}: {err}");
                report.failures.push(RenderFailure {
                    id: id.to_string(),
                    op: RenderOp::Create,
                    error: err,
                });
            }
        }
    }

    fn update(&mut self, id: &str, state: EntityState, report: &mut ReconcileReport) {
        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };
        if entity.applied == state {
            report.unchanged += 1;
            return;
        }

        match self.renderer.update_entity(entity.handle, &state) {
            Ok(()) => {
                entity.applied = state;
                report.updated += 1;
                let _ = self.event_tx.send(RegistryEvent::EntityUpdated(id.to_string()));
            }
            Err(err) => {
                warn!("Failed to update entity for flight {id}: {err}");
                report.failures.push(RenderFailure {
                    id: id.to_string(),
                    op: RenderOp::Update,
                    error: err,
                });
            }
        }
    }

    /// Number of tracked entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&TrackedEntity> {
        self.entities.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    /// Tracked identifiers in sorted order.
    #[must_use]
    pub fn tracked_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entities.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    #[must_use]
    pub fn policy(&self) -> UnknownPositionPolicy {
        self.policy
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Subscribe to entity lifecycle events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.event_tx.subscribe()
    }

    /// Give the renderer back to its owner for teardown.
    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }
}

/// One record per identifier, the last one in feed order, keeping the
/// position of each identifier's first appearance.
fn latest_per_id(flights: &[FlightRecord]) -> Vec<&FlightRecord> {
    let mut slots: HashMap<&str, usize> = HashMap::with_capacity(flights.len());
    let mut latest: Vec<&FlightRecord> = Vec::with_capacity(flights.len());
    for flight in flights {
        match slots.entry(flight.flight_id.as_str()) {
            Entry::Occupied(slot) => latest[*slot.get()] = flight,
            Entry::Vacant(slot) => {
                slot.insert(latest.len());
                latest.push(flight);
            }
        }
    }
    latest
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::scene::{EntityCollection, Position};

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Call {
        Create(String),
        Update(EntityHandle),
        Remove(EntityHandle),
    }

    /// Scene that records every call and can be told to fail some of them.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingScene {
        pub scene: EntityCollection,
        pub calls: Vec<Call>,
        pub fail_ids: HashSet<String>,
        pub fail_removals: bool,
        pub peak_len: usize,
    }

    impl RecordingScene {
        pub(crate) fn creates(&self) -> usize {
            self.calls.iter().filter(|c| matches!(c, Call::Create(_))).count()
        }

        pub(crate) fn updates(&self) -> usize {
            self.calls.iter().filter(|c| matches!(c, Call::Update(_))).count()
        }

        pub(crate) fn removes(&self) -> usize {
            self.calls.iter().filter(|c| matches!(c, Call::Remove(_))).count()
        }

        fn id_of(&self, handle: EntityHandle) -> Option<String> {
            self.scene.get(handle).map(|entity| entity.id.clone())
        }
    }

    impl SceneRenderer for RecordingScene {
        fn create_entity(&mut self, id: &str, state: &EntityState) -> Result<EntityHandle, RenderError> {
            self.calls.push(Call::Create(id.to_string()));
            if self.fail_ids.contains(id) {
                return Err(RenderError::Backend(format!("refused {id}")));
            }
            let handle = self.scene.create_entity(id, state)?;
            self.peak_len = self.peak_len.max(self.scene.len());
            Ok(handle)
        }

        fn update_entity(&mut self, handle: EntityHandle, state: &EntityState) -> Result<(), RenderError> {
            self.calls.push(Call::Update(handle));
            if self.id_of(handle).is_some_and(|id| self.fail_ids.contains(&id)) {
                return Err(RenderError::Backend("refused update".to_string()));
            }
            self.scene.update_entity(handle, state)
        }

        fn remove_entity(&mut self, handle: EntityHandle) -> Result<(), RenderError> {
            self.calls.push(Call::Remove(handle));
            if self.fail_removals && self.scene.get(handle).is_some() {
                return Err(RenderError::Backend("refused removal".to_string()));
            }
            self.scene.remove_entity(handle)
        }
    }

    pub(crate) fn flight(id: &str, lat: f64, lon: f64) -> FlightRecord {
        let mut record = FlightRecord::new(id).at(lat, lon, 10_000.0);
        record.flight_number = Some(format!("{id}100"));
        record
    }

    fn registry() -> EntityRegistry<RecordingScene> {
        EntityRegistry::new(RecordingScene::default(), UnknownPositionPolicy::Remove)
    }

    #[test]
    fn test_first_poll_creates_entities() {
        let mut registry = registry();
        let report = registry.reconcile(&[flight("A", 10.0, 20.0), flight("B", 11.0, 21.0)]);

        assert_eq!(report.created, 2);
        assert!(report.is_clean());
        assert_eq!(registry.tracked_ids(), vec!["A", "B"]);
        assert_eq!(registry.renderer().scene.len(), 2);

        let (_, entity) = registry.renderer().scene.find("A").unwrap();
        assert_eq!(entity.state.label, "A100");
        assert_eq!(entity.state.position, Position::new(20.0, 10.0, 10_000.0));
    }

    #[test]
    fn test_identical_poll_makes_no_calls() {
        let mut registry = registry();
        let flights = [flight("A", 10.0, 20.0), flight("B", 11.0, 21.0)];
        registry.reconcile(&flights);
        let calls_before = registry.renderer().calls.len();

        let report = registry.reconcile(&flights);
        assert_eq!(report.unchanged, 2);
        assert!(!report.has_changes());
        assert_eq!(registry.renderer().calls.len(), calls_before);
    }

    #[test]
    fn test_moved_flight_updates_in_place() {
        let mut registry = registry();
        registry.reconcile(&[flight("A", 10.0, 20.0)]);
        let handle = registry.get("A").unwrap().handle;

        let report = registry.reconcile(&[flight("A", 10.5, 20.5)]);
        assert_eq!(report.updated, 1);
        assert_eq!(report.created, 0);
        assert_eq!(report.removed, 0);
        assert_eq!(registry.get("A").unwrap().handle, handle);
        assert_eq!(registry.renderer().calls.last(), Some(&Call::Update(handle)));
        assert_eq!(
            registry.renderer().scene.get(handle).unwrap().state.position.latitude,
            10.5
        );
    }

    #[test]
    fn test_label_change_is_an_update() {
        let mut registry = registry();
        registry.reconcile(&[flight("A", 10.0, 20.0)]);

        let mut renamed = flight("A", 10.0, 20.0);
        renamed.flight_number = Some("ZZ9".to_string());
        let report = registry.reconcile(&[renamed]);
        assert_eq!(report.updated, 1);
        assert_eq!(registry.get("A").unwrap().applied.label, "ZZ9");
    }

    #[test]
    fn test_disappear_then_reappear_recreates() {
        let mut registry = registry();
        registry.reconcile(&[flight("A", 10.0, 20.0)]);
        registry.reconcile(&[]);
        assert!(registry.is_empty());
        registry.reconcile(&[flight("A", 10.0, 20.0)]);

        let calls = &registry.renderer().calls;
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], Call::Create("A".to_string()));
        assert!(matches!(calls[1], Call::Remove(_)));
        assert_eq!(calls[2], Call::Create("A".to_string()));
        assert_eq!(registry.renderer().updates(), 0);
    }

    #[test]
    fn test_unknown_position_never_created() {
        let mut registry = registry();
        let report = registry.reconcile(&[FlightRecord::new("ghost")]);
        assert_eq!(report.skipped_unknown, 1);
        assert_eq!(registry.renderer().creates(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_lost_position_removes_under_remove_policy() {
        let mut registry = registry();
        registry.reconcile(&[flight("A", 10.0, 20.0)]);

        let report = registry.reconcile(&[FlightRecord::new("A")]);
        assert_eq!(report.removed, 1);
        assert!(registry.is_empty());
        assert!(registry.renderer().scene.is_empty());
    }

    #[test]
    fn test_lost_position_retained_under_retain_policy() {
        let mut registry =
            EntityRegistry::new(RecordingScene::default(), UnknownPositionPolicy::Retain);
        registry.reconcile(&[flight("A", 10.0, 20.0)]);
        let calls_before = registry.renderer().calls.len();

        let report = registry.reconcile(&[FlightRecord::new("A")]);
        assert_eq!(report.retained, 1);
        assert_eq!(report.removed, 0);
        assert_eq!(registry.renderer().calls.len(), calls_before);
        assert_eq!(registry.get("A").unwrap().applied.position.latitude, 10.0);

        // Absent altogether is still a removal.
        let report = registry.reconcile(&[]);
        assert_eq!(report.removed, 1);
    }

    #[test]
    fn test_convergence_over_sequence() {
        let polls: Vec<Vec<FlightRecord>> = vec![
            vec![flight("A", 1.0, 1.0), flight("B", 2.0, 2.0)],
            vec![flight("B", 2.1, 2.1), flight("C", 3.0, 3.0), FlightRecord::new("D")],
            vec![flight("D", 4.0, 4.0), FlightRecord::new("C")],
            vec![],
            vec![flight("A", 1.0, 1.0), flight("E", 5.0, 5.0)],
        ];

        let mut registry = registry();
        for poll in &polls {
            registry.reconcile(poll);
            let mut expected: Vec<String> = poll
                .iter()
                .filter(|f| f.has_position())
                .map(|f| f.flight_id.clone())
                .collect();
            expected.sort_unstable();
            assert_eq!(registry.tracked_ids(), expected);
            assert_eq!(registry.renderer().scene.len(), expected.len());
        }
    }

    #[test]
    fn test_removals_precede_creations() {
        let mut registry = registry();
        registry.reconcile(&[flight("A", 1.0, 1.0), flight("B", 2.0, 2.0), flight("C", 3.0, 3.0)]);
        registry.renderer.peak_len = 0;
        registry.renderer.calls.clear();

        // A and B leave, D and E arrive, C stays.
        registry.reconcile(&[flight("D", 4.0, 4.0), flight("C", 3.0, 3.0), flight("E", 5.0, 5.0)]);

        let calls = &registry.renderer().calls;
        let last_remove = calls.iter().rposition(|c| matches!(c, Call::Remove(_))).unwrap();
        let first_create = calls.iter().position(|c| matches!(c, Call::Create(_))).unwrap();
        assert!(last_remove < first_create);
        // previous count 3, minus 2 removed, plus 2 arrivals
        assert!(registry.renderer().peak_len <= 3);
    }

    #[test]
    fn test_create_failure_is_isolated() {
        let mut scene = RecordingScene::default();
        scene.fail_ids.insert("B".to_string());
        let mut registry = EntityRegistry::new(scene, UnknownPositionPolicy::Remove);

        let report = registry.reconcile(&[
            flight("A", 1.0, 1.0),
            flight("B", 2.0, 2.0),
            flight("C", 3.0, 3.0),
        ]);
        assert_eq!(report.created, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].id, "B");
        assert_eq!(report.failures[0].op, RenderOp::Create);
        assert_eq!(registry.tracked_ids(), vec!["A", "C"]);

        // Retried on the next poll once the renderer accepts it.
        registry.renderer.fail_ids.clear();
        let report = registry.reconcile(&[
            flight("A", 1.0, 1.0),
            flight("B", 2.0, 2.0),
            flight("C", 3.0, 3.0),
        ]);
        assert_eq!(report.created, 1);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_invalid_coordinates_reported_not_tracked() {
        let mut registry =
            EntityRegistry::new(EntityCollection::new(), UnknownPositionPolicy::Remove);
        let report = registry.reconcile(&[flight("bad", 95.0, 20.0), flight("ok", 10.0, 20.0)]);
        assert_eq!(report.created, 1);
        assert!(matches!(
            report.failures[0].error,
            RenderError::InvalidPosition { .. }
        ));
        assert_eq!(registry.tracked_ids(), vec!["ok"]);
        assert_eq!(registry.renderer().len(), 1);
    }

    #[test]
    fn test_update_failure_keeps_previous_state() {
        let mut registry = registry();
        registry.reconcile(&[flight("A", 1.0, 1.0)]);
        registry.renderer.fail_ids.insert("A".to_string());

        let report = registry.reconcile(&[flight("A", 2.0, 2.0)]);
        assert_eq!(report.failures[0].op, RenderOp::Update);
        assert_eq!(registry.get("A").unwrap().applied.position.latitude, 1.0);

        // Next poll retries because the applied state still differs.
        registry.renderer.fail_ids.clear();
        let report = registry.reconcile(&[flight("A", 2.0, 2.0)]);
        assert_eq!(report.updated, 1);
    }

    #[test]
    fn test_failed_removal_stays_tracked() {
        let mut registry = registry();
        registry.reconcile(&[flight("A", 1.0, 1.0)]);
        registry.renderer.fail_removals = true;

        let report = registry.reconcile(&[]);
        assert_eq!(report.removed, 0);
        assert_eq!(report.failures[0].op, RenderOp::Remove);
        assert!(registry.contains("A"));
        assert_eq!(registry.renderer().scene.len(), 1);

        registry.renderer.fail_removals = false;
        registry.reconcile(&[]);
        assert!(registry.is_empty());
        assert!(registry.renderer().scene.is_empty());
    }

    #[test]
    fn test_lost_handle_is_surfaced_and_untracked() {
        let mut registry = registry();
        registry.reconcile(&[flight("A", 1.0, 1.0)]);
        let handle = registry.get("A").unwrap().handle;
        // Something outside the registry dropped the entity.
        registry.renderer.scene.remove_entity(handle).unwrap();

        let report = registry.reconcile(&[]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].error, RenderError::UnknownHandle(handle));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_events_are_broadcast() {
        let mut registry = registry();
        let mut events = registry.subscribe();

        registry.reconcile(&[flight("A", 1.0, 1.0)]);
        registry.reconcile(&[flight("A", 1.5, 1.0)]);
        registry.reconcile(&[]);

        assert_eq!(events.try_recv().unwrap(), RegistryEvent::EntityCreated("A".to_string()));
        assert_eq!(events.try_recv().unwrap(), RegistryEvent::EntityUpdated("A".to_string()));
        assert_eq!(events.try_recv().unwrap(), RegistryEvent::EntityRemoved("A".to_string()));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_duplicate_ids_last_record_wins() {
        let mut registry = registry();
        let poll = [flight("A", 10.0, 20.0), flight("B", 5.0, 5.0), flight("A", 11.0, 21.0)];

        let report = registry.reconcile(&poll);
        assert_eq!(report.created, 2);
        assert_eq!(report.updated, 0);
        assert_eq!(registry.renderer().calls.len(), 2);
        assert_eq!(registry.get("A").unwrap().applied.position.latitude, 11.0);

        let calls_before = registry.renderer().calls.len();
        let report = registry.reconcile(&poll);
        assert_eq!(report.updated, 0);
        assert_eq!(report.unchanged, 2);
        assert_eq!(registry.renderer().calls.len(), calls_before);
    }

    #[test]
    fn test_failed_removal_of_lost_position_is_not_retained() {
        let mut registry = registry();
        registry.reconcile(&[flight("A", 1.0, 1.0)]);
        registry.renderer.fail_removals = true;

        let report = registry.reconcile(&[FlightRecord::new("A")]);
        assert_eq!(report.failures[0].op, RenderOp::Remove);
        assert!(registry.contains("A"));
        assert_eq!(report.retained, 0);
        assert_eq!(report.skipped_unknown, 0);
    }

    #[test]
    fn test_into_renderer_keeps_scene_objects() {
        let mut registry = registry();
        registry.reconcile(&[flight("A", 1.0, 1.0)]);
        let scene = registry.into_renderer();
        assert_eq!(scene.scene.len(), 1);
    }
}
