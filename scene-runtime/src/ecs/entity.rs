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
//! Entity identity and storage
//!
//! Entities are scene-scoped integer ids that own a bag of components keyed
//! by `(type, slot)`. Ids are handed out in increasing order starting at 1
//! and never reused.

use crate::ecs::component::{
    downcast_mut, downcast_ref, Capabilities, Component, ComponentId, ComponentKey, ComponentRef,
};
use crate::error::EcsError;
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::fmt;

/// Unique identifier for an entity within its scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    /// Create a new EntityId from a raw u64 value
    pub fn new(id: u64) -> Self {
        EntityId(id)
    }

    /// Get the raw u64 value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// A live component together with its bookkeeping
pub(crate) struct ComponentEntry {
    pub(crate) id: ComponentId,
    pub(crate) caps: Capabilities,
    pub(crate) cell: RefCell<Box<dyn Component>>,
}

impl ComponentEntry {
    pub(crate) fn new(id: ComponentId, caps: Capabilities, component: Box<dyn Component>) -> Self {
        ComponentEntry {
            id,
            caps,
            cell: RefCell::new(component),
        }
    }
}

/// Storage for one entity: debug name plus its attached components
pub struct EntityRecord {
    id: EntityId,
    name: String,
    components: HashMap<ComponentKey, ComponentEntry>,
}

impl EntityRecord {
    pub(crate) fn new(id: EntityId, name: impl Into<String>) -> Self {
        EntityRecord {
            id,
            name: name.into(),
            components: HashMap::new(),
        }
    }

    /// Entity id
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Human-readable name for debugging
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Check for a component at `key`
    pub fn has_key(&self, key: &ComponentKey) -> bool {
        self.components.contains_key(key)
    }

    /// References to every attached component, in attachment order
    pub fn component_refs(&self) -> Vec<ComponentRef> {
        let mut refs: Vec<ComponentRef> = self
            .components
            .iter()
            .map(|(key, entry)| ComponentRef {
                entity: self.id,
                key: *key,
                id: entry.id,
            })
            .collect();
        refs.sort_by_key(|r| r.id);
        refs
    }

    /// Reference to the component at `key`, if any
    pub fn component_ref(&self, key: &ComponentKey) -> Option<ComponentRef> {
        self.components.get(key).map(|entry| ComponentRef {
            entity: self.id,
            key: *key,
            id: entry.id,
        })
    }

    pub(crate) fn entry(&self, key: &ComponentKey) -> Option<&ComponentEntry> {
        self.components.get(key)
    }

    /// Shared borrow of the component of type `T` at `key`
    pub(crate) fn borrow<T: Component>(&self, key: ComponentKey) -> Result<Ref<'_, T>, EcsError> {
        let entry = self.entry(&key).ok_or(EcsError::MissingComponent {
            entity: self.id,
            key,
        })?;
        let cell = entry.cell.try_borrow().map_err(|_| EcsError::ComponentBusy {
            entity: self.id,
            key,
        })?;
        Ref::filter_map(cell, |boxed| downcast_ref::<T>(&**boxed)).map_err(|_| {
            EcsError::MissingComponent {
                entity: self.id,
                key,
            }
        })
    }

    /// Exclusive borrow of the component of type `T` at `key`
    pub(crate) fn borrow_mut<T: Component>(
        &self,
        key: ComponentKey,
    ) -> Result<RefMut<'_, T>, EcsError> {
        let entry = self.entry(&key).ok_or(EcsError::MissingComponent {
            entity: self.id,
            key,
        })?;
        let cell = entry
            .cell
            .try_borrow_mut()
            .map_err(|_| EcsError::ComponentBusy {
                entity: self.id,
                key,
            })?;
        RefMut::filter_map(cell, |boxed| downcast_mut::<T>(&mut **boxed)).map_err(|_| {
            EcsError::MissingComponent {
                entity: self.id,
                key,
            }
        })
    }

    /// Physically attach, bypassing staging
    ///
    /// # Panics
    ///
    /// Panics if the key is occupied.
    pub(crate) fn link(&mut self, key: ComponentKey, entry: ComponentEntry) {
        assert!(
            !self.components.contains_key(&key),
            "{} already has a component of type {}",
            self,
            key
        );
        self.components.insert(key, entry);
    }

    /// Physically detach, bypassing staging
    ///
    /// # Panics
    ///
    /// Panics if the key is empty.
    pub(crate) fn unlink(&mut self, key: &ComponentKey) -> ComponentEntry {
        match self.components.remove(key) {
            Some(entry) => entry,
            None => panic!("{} does not have a component of type {}", self, key),
        }
    }
}

impl fmt::Display for EntityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}, {})", self.id.0, self.name)
    }
}

impl fmt::Debug for EntityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Read-only view of a live entity
///
/// Obtained from `World::entity` or by dereferencing an `EntityHandle`.
#[derive(Clone, Copy)]
pub struct EntityRef<'w> {
    record: &'w EntityRecord,
}

impl<'w> EntityRef<'w> {
    pub(crate) fn new(record: &'w EntityRecord) -> Self {
        EntityRef { record }
    }

    /// Entity id
    pub fn id(&self) -> EntityId {
        self.record.id
    }

    /// Debug name
    pub fn name(&self) -> &'w str {
        &self.record.name
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.record.component_count()
    }

    /// Check for a `T` at the default slot
    pub fn has<T: Component>(&self) -> bool {
        self.record.has_key(&ComponentKey::of::<T>())
    }

    /// Check for a `T` at `slot`
    pub fn has_at<T: Component>(&self, slot: crate::ecs::Slot) -> bool {
        self.record.has_key(&ComponentKey::at::<T>(slot))
    }

    /// Borrow the `T` at the default slot
    pub fn get<T: Component>(&self) -> Result<Ref<'w, T>, EcsError> {
        self.record.borrow(ComponentKey::of::<T>())
    }

    /// Borrow the `T` at `slot`
    pub fn get_at<T: Component>(&self, slot: crate::ecs::Slot) -> Result<Ref<'w, T>, EcsError> {
        self.record.borrow(ComponentKey::at::<T>(slot))
    }

    /// Mutably borrow the `T` at the default slot
    pub fn get_mut<T: Component>(&self) -> Result<RefMut<'w, T>, EcsError> {
        self.record.borrow_mut(ComponentKey::of::<T>())
    }

    /// Borrow the `T` at the default slot, or `None`
    pub fn try_get<T: Component>(&self) -> Option<Ref<'w, T>> {
        self.get::<T>().ok()
    }

    /// References to every attached component
    pub fn component_refs(&self) -> Vec<ComponentRef> {
        self.record.component_refs()
    }
}

impl fmt::Display for EntityRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.record, f)
    }
}

impl fmt::Debug for EntityRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.record, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;
    impl Component for Marker {}

    struct Counter(u32);
    impl Component for Counter {}

    fn entry(id: u64) -> ComponentEntry {
        ComponentEntry::new(ComponentId::new(id), Capabilities::default(), Box::new(Marker))
    }

    #[test]
    fn test_entity_id() {
        let entity = EntityId::new(42);
        assert_eq!(entity.raw(), 42);
        assert_eq!(entity.to_string(), "Entity(42)");
        assert!(EntityId::new(1) < EntityId::new(2));
    }

    #[test]
    fn test_link_and_unlink() {
        let mut record = EntityRecord::new(EntityId::new(1), "player");
        record.link(ComponentKey::of::<Marker>(), entry(1));
        record.link(ComponentKey::at::<Marker>(3), entry(2));

        assert_eq!(record.component_count(), 2);
        assert!(record.has_key(&ComponentKey::at::<Marker>(3)));

        let removed = record.unlink(&ComponentKey::of::<Marker>());
        assert_eq!(removed.id, ComponentId::new(1));
        assert!(!record.has_key(&ComponentKey::of::<Marker>()));
    }

    #[test]
    fn test_component_refs_in_attach_order() {
        let mut record = EntityRecord::new(EntityId::new(7), "crate");
        record.link(ComponentKey::at::<Marker>(9), entry(5));
        record.link(ComponentKey::at::<Marker>(1), entry(2));

        let ids: Vec<u64> = record.component_refs().iter().map(|r| r.id.raw()).collect();
        assert_eq!(ids, vec![2, 5]);
    }

    #[test]
    fn test_typed_borrow() {
        let mut record = EntityRecord::new(EntityId::new(3), "counter");
        record.link(
            ComponentKey::of::<Counter>(),
            ComponentEntry::new(ComponentId::new(1), Capabilities::default(), Box::new(Counter(4))),
        );

        record.borrow_mut::<Counter>(ComponentKey::of::<Counter>()).unwrap().0 += 1;
        assert_eq!(record.borrow::<Counter>(ComponentKey::of::<Counter>()).unwrap().0, 5);

        let held = record.borrow_mut::<Counter>(ComponentKey::of::<Counter>()).unwrap();
        assert!(matches!(
            record.borrow::<Counter>(ComponentKey::of::<Counter>()),
            Err(EcsError::ComponentBusy { .. })
        ));
        drop(held);

        assert!(matches!(
            record.borrow::<Marker>(ComponentKey::of::<Marker>()),
            Err(EcsError::MissingComponent { .. })
        ));

        let view = EntityRef::new(&record);
        assert_eq!(view.to_string(), "Entity(3, counter)");
        assert!(view.has::<Counter>());
        assert!(!view.has_at::<Counter>(1));
    }

    #[test]
    #[should_panic(expected = "already has a component of type Marker")]
    fn test_double_link_panics() {
        let mut record = EntityRecord::new(EntityId::new(1), "player");
        record.link(ComponentKey::of::<Marker>(), entry(1));
        record.link(ComponentKey::of::<Marker>(), entry(2));
    }

    #[test]
    #[should_panic(expected = "does not have a component of type Marker")]
    fn test_unlink_missing_panics() {
        let mut record = EntityRecord::new(EntityId::new(1), "player");
        record.unlink(&ComponentKey::of::<Marker>());
    }
}
