// Copyright 2025 John Brosnihan
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
//! World container for the live entity population
//!
//! The world owns every entity record and the master set of alive entities.
//! It is only mutated by the changelist at the synchronization point; between
//! synchronization points it is read-only and components are reached through
//! per-component `RefCell`s.

use crate::ecs::component::{Component, ComponentKey, ComponentKind, ComponentRef, Slot};
use crate::ecs::entity::{ComponentEntry, EntityId, EntityRecord, EntityRef};
use crate::error::EcsError;
use crate::indexed_set::IndexedSet;
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;

/// The live entity population of a scene
pub struct World {
    alive: IndexedSet<EntityId>,
    records: HashMap<EntityId, EntityRecord>,
    singletons: Option<EntityId>,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        World {
            alive: IndexedSet::new(),
            records: HashMap::new(),
            singletons: None,
        }
    }

    /// Check if an entity is alive
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.alive.contains(&entity)
    }

    /// Get the number of alive entities
    pub fn entity_count(&self) -> usize {
        self.alive.len()
    }

    /// Iterate alive entities in master-set order
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.alive.iter().copied()
    }

    /// View a live entity
    pub fn entity(&self, entity: EntityId) -> Result<EntityRef<'_>, EcsError> {
        self.live_record(entity).map(EntityRef::new)
    }

    /// View a live entity, or `None` if it is not alive
    pub fn try_entity(&self, entity: EntityId) -> Option<EntityRef<'_>> {
        self.entity(entity).ok()
    }

    /// The singleton container entity, if this world has one
    pub fn singletons(&self) -> Option<EntityId> {
        self.singletons
    }

    /// Check for a `T` at the default slot
    pub fn has<T: Component>(&self, entity: EntityId) -> bool {
        self.has_key(entity, &ComponentKey::of::<T>())
    }

    /// Check for a `T` at `slot`
    pub fn has_at<T: Component>(&self, entity: EntityId, slot: Slot) -> bool {
        self.has_key(entity, &ComponentKey::at::<T>(slot))
    }

    /// Check for any component at `key`
    pub fn has_key(&self, entity: EntityId, key: &ComponentKey) -> bool {
        self.live_record(entity)
            .map(|record| record.has_key(key))
            .unwrap_or(false)
    }

    /// Borrow the `T` at the default slot
    pub fn get<T: Component>(&self, entity: EntityId) -> Result<Ref<'_, T>, EcsError> {
        self.get_at::<T>(entity, crate::ecs::DEFAULT_SLOT)
    }

    /// Borrow the `T` at `slot`
    pub fn get_at<T: Component>(&self, entity: EntityId, slot: Slot) -> Result<Ref<'_, T>, EcsError> {
        self.live_record(entity)?.borrow(ComponentKey::at::<T>(slot))
    }

    /// Mutably borrow the `T` at the default slot
    ///
    /// Fails with `EcsError::ComponentBusy` if the component is already
    /// borrowed, which is always the case for the component currently running.
    pub fn get_mut<T: Component>(&self, entity: EntityId) -> Result<RefMut<'_, T>, EcsError> {
        self.get_mut_at::<T>(entity, crate::ecs::DEFAULT_SLOT)
    }

    /// Mutably borrow the `T` at `slot`
    pub fn get_mut_at<T: Component>(
        &self,
        entity: EntityId,
        slot: Slot,
    ) -> Result<RefMut<'_, T>, EcsError> {
        self.live_record(entity)?.borrow_mut(ComponentKey::at::<T>(slot))
    }

    /// Borrow the `T` at the default slot, or `None`
    pub fn try_get<T: Component>(&self, entity: EntityId) -> Option<Ref<'_, T>> {
        self.get::<T>(entity).ok()
    }

    /// Mutably borrow the `T` at the default slot, or `None`
    pub fn try_get_mut<T: Component>(&self, entity: EntityId) -> Option<RefMut<'_, T>> {
        self.get_mut::<T>(entity).ok()
    }

    /// Borrow a singleton component by type
    pub fn singleton<T: Component>(&self) -> Result<Ref<'_, T>, EcsError> {
        self.get::<T>(self.singletons.ok_or(EcsError::NoSingletons)?)
    }

    /// Mutably borrow a singleton component by type
    pub fn singleton_mut<T: Component>(&self) -> Result<RefMut<'_, T>, EcsError> {
        self.get_mut::<T>(self.singletons.ok_or(EcsError::NoSingletons)?)
    }

    /// Reference to the component at `key` on `entity`
    pub fn component_ref(&self, entity: EntityId, key: &ComponentKey) -> Option<ComponentRef> {
        self.live_record(entity).ok()?.component_ref(key)
    }

    /// First alive entity that has every kind in `kinds` at the default slot
    pub fn find_with(&self, kinds: &[ComponentKind]) -> Option<EntityId> {
        self.entities().find(|&entity| self.has_kinds(entity, kinds))
    }

    /// Every alive entity that has every kind in `kinds` at the default slot
    pub fn find_all_with(&self, kinds: &[ComponentKind]) -> Vec<EntityId> {
        self.entities()
            .filter(|&entity| self.has_kinds(entity, kinds))
            .collect()
    }

    fn has_kinds(&self, entity: EntityId, kinds: &[ComponentKind]) -> bool {
        kinds.iter().all(|&kind| {
            self.has_key(entity, &ComponentKey::new(kind, crate::ecs::DEFAULT_SLOT))
        })
    }

    fn live_record(&self, entity: EntityId) -> Result<&EntityRecord, EcsError> {
        if !self.alive.contains(&entity) {
            return Err(EcsError::EntityNotAlive { entity });
        }
        self.records
            .get(&entity)
            .ok_or(EcsError::EntityNotAlive { entity })
    }

    // Synchronization-point access. Records outlive their entity's liveness
    // until the dispose phase, so these do not check `alive`.

    pub(crate) fn record(&self, entity: EntityId) -> Option<&EntityRecord> {
        self.records.get(&entity)
    }

    pub(crate) fn record_mut(&mut self, entity: EntityId) -> Option<&mut EntityRecord> {
        self.records.get_mut(&entity)
    }

    /// The cell holding exactly the instance `target` names
    pub(crate) fn cell(&self, target: &ComponentRef) -> Option<&RefCell<Box<dyn Component>>> {
        self.entry(target).map(|entry| &entry.cell)
    }

    pub(crate) fn entry(&self, target: &ComponentRef) -> Option<&ComponentEntry> {
        self.records
            .get(&target.entity)?
            .entry(&target.key)
            .filter(|entry| entry.id == target.id)
    }

    pub(crate) fn insert_record(&mut self, record: EntityRecord) {
        let id = record.id();
        assert!(
            self.records.insert(id, record).is_none(),
            "{} was created twice",
            id
        );
        self.alive.add_or_die(id);
    }

    pub(crate) fn kill(&mut self, entity: EntityId) {
        self.alive.remove_or_die(&entity);
    }

    pub(crate) fn remove_record(&mut self, entity: EntityId) -> Option<EntityRecord> {
        debug_assert!(!self.alive.contains(&entity));
        self.records.remove(&entity)
    }

    pub(crate) fn set_singletons(&mut self, entity: EntityId) {
        self.singletons = Some(entity);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
