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

//! Scene renderer contract.
//!
//! The registry never talks to a rendering engine directly. It drives any
//! type implementing [`SceneRenderer`], which owns the visual objects and
//! hands back opaque [`EntityHandle`]s for later updates and removal.
//!
//! [`EntityCollection`] is an in-memory scene with the same validation a
//! globe engine applies (coordinate ranges, unique entity ids). [`SharedScene`]
//! wraps it for a render loop that reads the scene from another thread.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;

/// Geographic position of a scene entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    /// Longitude in degrees (-180 to 180).
    pub longitude: f64,
    /// Latitude in degrees (-90 to 90).
    pub latitude: f64,
    /// Altitude above the ellipsoid in meters.
    pub altitude: f64,
}

impl Position {
    #[must_use]
    pub fn new(longitude: f64, latitude: f64, altitude: f64) -> Self {
        Self {
            longitude,
            latitude,
            altitude,
        }
    }

    /// Whether the coordinates are finite and inside their ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.longitude.is_finite()
            && self.latitude.is_finite()
            && self.altitude.is_finite()
            && (-180.0..=180.0).contains(&self.longitude)
            && (-90.0..=90.0).contains(&self.latitude)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.4}°, {:.4}°, {:.0} m)",
            self.longitude, self.latitude, self.altitude
        )
    }
}

/// Everything the renderer needs to draw one labeled point.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityState {
    pub position: Position,
    pub label: String,
    pub description: String,
}

/// Opaque reference to a renderer-owned visual object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle(u64);

impl EntityHandle {
    #[must_use]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors returned by a scene renderer capability call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("invalid position for entity '{id}': {position}")]
    InvalidPosition { id: String, position: Position },

    #[error("an entity with id '{0}' already exists")]
    DuplicateId(String),

    #[error("no scene entity for handle {0}")]
    UnknownHandle(EntityHandle),

    #[error("renderer failure: {0}")]
    Backend(String),
}

/// Capability set for creating, updating, and removing positioned entities.
///
/// Implementations own the visual objects. Callers keep the returned handles
/// and must not assume anything about their values.
pub trait SceneRenderer {
    /// Materialize a new entity and return its handle.
    fn create_entity(&mut self, id: &str, state: &EntityState) -> Result<EntityHandle, RenderError>;

    /// Move and relabel an existing entity in place.
    fn update_entity(&mut self, handle: EntityHandle, state: &EntityState) -> Result<(), RenderError>;

    /// Destroy an entity.
    fn remove_entity(&mut self, handle: EntityHandle) -> Result<(), RenderError>;
}

impl<R: SceneRenderer + ?Sized> SceneRenderer for Box<R> {
    fn create_entity(&mut self, id: &str, state: &EntityState) -> Result<EntityHandle, RenderError> {
        (**self).create_entity(id, state)
    }

    fn update_entity(&mut self, handle: EntityHandle, state: &EntityState) -> Result<(), RenderError> {
        (**self).update_entity(handle, state)
    }

    fn remove_entity(&mut self, handle: EntityHandle) -> Result<(), RenderError> {
        (**self).remove_entity(handle)
    }
}

/// A visual object held by an [`EntityCollection`].
#[derive(Debug, Clone, PartialEq)]
pub struct SceneEntity {
    pub id: String,
    pub state: EntityState,
}

/// In-memory scene of labeled point entities.
#[derive(Debug, Default)]
pub struct EntityCollection {
    entities: HashMap<EntityHandle, SceneEntity>,
    ids: HashMap<String, EntityHandle>,
    next_handle: u64,
}

impl EntityCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    #[must_use]
    pub fn get(&self, handle: EntityHandle) -> Option<&SceneEntity> {
        self.entities.get(&handle)
    }

    /// Look up an entity by the id it was created with.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<(EntityHandle, &SceneEntity)> {
        let handle = *self.ids.get(id)?;
        self.entities.get(&handle).map(|entity| (handle, entity))
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityHandle, &SceneEntity)> {
        self.entities.iter().map(|(handle, entity)| (*handle, entity))
    }

    /// Drop every entity, returning how many were released.
    pub fn clear(&mut self) -> usize {
        let released = self.entities.len();
        self.entities.clear();
        self.ids.clear();
        released
    }
}

impl SceneRenderer for EntityCollection {
    fn create_entity(&mut self, id: &str, state: &EntityState) -> Result<EntityHandle, RenderError> {
        if !state.position.is_valid() {
            return Err(RenderError::InvalidPosition {
                id: id.to_string(),
                position: state.position,
            });
        }
        if self.ids.contains_key(id) {
            return Err(RenderError::DuplicateId(id.to_string()));
        }

        self.next_handle += 1;
        let handle = EntityHandle(self.next_handle);
        self.ids.insert(id.to_string(), handle);
        self.entities.insert(
            handle,
            SceneEntity {
                id: id.to_string(),
                state: state.clone(),
            },
        );
        Ok(handle)
    }

    fn update_entity(&mut self, handle: EntityHandle, state: &EntityState) -> Result<(), RenderError> {
        let entity = self
            .entities
            .get_mut(&handle)
            .ok_or(RenderError::UnknownHandle(handle))?;
        if !state.position.is_valid() {
            return Err(RenderError::InvalidPosition {
                id: entity.id.clone(),
                position: state.position,
            });
        }
        entity.state = state.clone();
        Ok(())
    }

    fn remove_entity(&mut self, handle: EntityHandle) -> Result<(), RenderError> {
        let entity = self
            .entities
            .remove(&handle)
            .ok_or(RenderError::UnknownHandle(handle))?;
        self.ids.remove(&entity.id);
        Ok(())
    }
}

/// An [`EntityCollection`] shared between the reconciliation task and a
/// render loop on another thread.
///
/// Cloning is cheap and every clone refers to the same scene.
#[derive(Debug, Clone, Default)]
pub struct SharedScene {
    inner: Arc<RwLock<EntityCollection>>,
}

impl SharedScene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against a read view of the scene.
    pub fn with<T>(&self, f: impl FnOnce(&EntityCollection) -> T) -> T {
        let scene = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&scene)
    }

    /// Copy the current entities out of the scene.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(EntityHandle, SceneEntity)> {
        self.with(|scene| {
            scene
                .iter()
                .map(|(handle, entity)| (handle, entity.clone()))
                .collect()
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.with(EntityCollection::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.with(EntityCollection::is_empty)
    }

    /// Release every entity. Called by the owner when the scene is torn down.
    pub fn clear(&self) -> usize {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear()
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, EntityCollection> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SceneRenderer for SharedScene {
    fn create_entity(&mut self, id: &str, state: &EntityState) -> Result<EntityHandle, RenderError> {
        self.write().create_entity(id, state)
    }

    fn update_entity(&mut self, handle: EntityHandle, state: &EntityState) -> Result<(), RenderError> {
        self.write().update_entity(handle, state)
    }

    fn remove_entity(&mut self, handle: EntityHandle) -> Result<(), RenderError> {
        self.write().remove_entity(handle)
    }
}
