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
//! Cross-frame references
//!
//! Destruction and detachment are deferred, so a reference taken this frame
//! may dangle after the next synchronization point. Handles re-validate on
//! every dereference instead of caching a borrow.

use crate::ecs::component::{Component, ComponentRef};
use crate::ecs::entity::{EntityId, EntityRef};
use crate::ecs::world::World;
use crate::error::EcsError;
use std::cell::{Ref, RefMut};
use std::fmt;
use std::marker::PhantomData;

/// Cached reference to an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityHandle {
    id: EntityId,
}

impl EntityHandle {
    /// Wrap an entity id
    pub fn new(id: EntityId) -> Self {
        EntityHandle { id }
    }

    /// The wrapped id, valid or not
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Check whether the entity is still alive
    pub fn is_alive(&self, world: &World) -> bool {
        world.is_alive(self.id)
    }

    /// The entity, or an error if it is no longer alive
    pub fn deref<'w>(&self, world: &'w World) -> Result<EntityRef<'w>, EcsError> {
        world.entity(self.id)
    }

    /// The entity, or `None` if it is no longer alive
    pub fn maybe_deref<'w>(&self, world: &'w World) -> Option<EntityRef<'w>> {
        world.try_entity(self.id)
    }
}

impl From<EntityId> for EntityHandle {
    fn from(id: EntityId) -> Self {
        EntityHandle::new(id)
    }
}

/// Cached reference to one component instance
///
/// Dereferencing fails once the component is detached, even if another
/// component of the same type has since been attached at the same key.
pub struct ComponentHandle<T> {
    target: ComponentRef,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Component> ComponentHandle<T> {
    /// Wrap a component reference
    ///
    /// # Panics
    ///
    /// Panics if `target` does not name a component of type `T`.
    pub fn new(target: ComponentRef) -> Self {
        assert!(
            target.key.kind.is::<T>(),
            "{} is not a {}",
            target,
            std::any::type_name::<T>()
        );
        ComponentHandle {
            target,
            _marker: PhantomData,
        }
    }

    /// The wrapped reference
    pub fn target(&self) -> ComponentRef {
        self.target
    }

    /// The owning entity
    pub fn entity(&self) -> EntityId {
        self.target.entity
    }

    /// Check whether the component is still attached
    pub fn is_attached(&self, world: &World) -> bool {
        world.is_alive(self.target.entity) && world.entry(&self.target).is_some()
    }

    /// Borrow the component, or an error if it is gone
    pub fn deref<'w>(&self, world: &'w World) -> Result<Ref<'w, T>, EcsError> {
        self.validate(world)?;
        world.get_at::<T>(self.target.entity, self.target.key.slot)
    }

    /// Mutably borrow the component, or an error if it is gone or busy
    pub fn deref_mut<'w>(&self, world: &'w World) -> Result<RefMut<'w, T>, EcsError> {
        self.validate(world)?;
        world.get_mut_at::<T>(self.target.entity, self.target.key.slot)
    }

    /// Borrow the component, or `None` if it is gone
    pub fn maybe_deref<'w>(&self, world: &'w World) -> Option<Ref<'w, T>> {
        self.deref(world).ok()
    }

    /// Mutably borrow the component, or `None` if it is gone or busy
    pub fn maybe_deref_mut<'w>(&self, world: &'w World) -> Option<RefMut<'w, T>> {
        self.deref_mut(world).ok()
    }

    fn validate(&self, world: &World) -> Result<(), EcsError> {
        let entity = self.target.entity;
        if !world.is_alive(entity) {
            return Err(EcsError::EntityNotAlive { entity });
        }
        if world.entry(&self.target).is_none() {
            return Err(EcsError::ComponentDetached {
                entity,
                key: self.target.key,
            });
        }
        Ok(())
    }
}

impl<T> Clone for ComponentHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ComponentHandle<T> {}

impl<T> PartialEq for ComponentHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
    }
}

impl<T> Eq for ComponentHandle<T> {}

impl<T> fmt::Debug for ComponentHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentHandle").field(&self.target).finish()
    }
}
