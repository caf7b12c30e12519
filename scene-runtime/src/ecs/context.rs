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
//! Scene access handed to component callbacks
//!
//! Every lifecycle, update, sync, and contact callback receives a
//! `SceneContext`. It pairs a read-only view of the world with the scene's
//! changelist, so a component can inspect the frozen population and stage
//! structural changes for the next synchronization point, but never mutate
//! the population directly.

use crate::ecs::changelist::EntityChangelist;
use crate::ecs::component::{Component, ComponentKey, ComponentRef, Slot, DEFAULT_SLOT};
use crate::ecs::entity::EntityId;
use crate::ecs::world::World;
use crate::error::EcsError;
use std::cell::{Ref, RefMut};

/// Per-frame time source
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Seconds since the previous frame
    pub delta: f32,
    /// Seconds since the scene started
    pub total: f32,
}

impl FrameTime {
    /// Create a frame time from elapsed and total seconds
    pub fn new(delta: f32, total: f32) -> Self {
        FrameTime { delta, total }
    }

    /// The frame `delta` seconds after this one
    pub fn advance(&self, delta: f32) -> Self {
        FrameTime {
            delta,
            total: self.total + delta,
        }
    }
}

/// Pause flags shared between the scene and its components
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SceneControl {
    pub(crate) should_pause: bool,
    pub(crate) is_paused: bool,
}

/// Scene access for the component currently being called
pub struct SceneContext<'a> {
    world: &'a World,
    changes: &'a mut EntityChangelist,
    control: &'a mut SceneControl,
    frame: FrameTime,
    current: ComponentRef,
}

impl<'a> SceneContext<'a> {
    pub(crate) fn new(
        world: &'a World,
        changes: &'a mut EntityChangelist,
        control: &'a mut SceneControl,
        frame: FrameTime,
        current: ComponentRef,
    ) -> Self {
        SceneContext {
            world,
            changes,
            control,
            frame,
            current,
        }
    }

    /// Context for calling into another component from inside a callback
    pub(crate) fn scoped(&mut self, target: ComponentRef) -> SceneContext<'_> {
        SceneContext {
            world: self.world,
            changes: &mut *self.changes,
            control: &mut *self.control,
            frame: self.frame,
            current: target,
        }
    }

    /// The component being called
    pub fn this(&self) -> ComponentRef {
        self.current
    }

    /// The entity that owns the component being called
    pub fn entity(&self) -> EntityId {
        self.current.entity
    }

    /// The population as of the last synchronization point
    pub fn world(&self) -> &'a World {
        self.world
    }

    /// Current frame time
    pub fn frame(&self) -> FrameTime {
        self.frame
    }

    /// Seconds since the previous frame
    pub fn delta_time(&self) -> f32 {
        self.frame.delta
    }

    /// Seconds since the scene started
    pub fn total_time(&self) -> f32 {
        self.frame.total
    }

    /// Borrow a singleton manager
    pub fn singleton<T: Component>(&self) -> Result<Ref<'a, T>, EcsError> {
        self.world.singleton::<T>()
    }

    /// Mutably borrow a singleton manager
    pub fn singleton_mut<T: Component>(&self) -> Result<RefMut<'a, T>, EcsError> {
        self.world.singleton_mut::<T>()
    }

    /// Borrow a sibling component on the calling component's entity
    pub fn sibling<T: Component>(&self) -> Result<Ref<'a, T>, EcsError> {
        self.world.get::<T>(self.current.entity)
    }

    /// Mutably borrow a sibling component on the calling component's entity
    pub fn sibling_mut<T: Component>(&self) -> Result<RefMut<'a, T>, EcsError> {
        self.world.get_mut::<T>(self.current.entity)
    }

    /// Stage a new entity; it becomes alive at the next synchronization point
    pub fn create_entity(&mut self, name: impl Into<String>) -> EntityId {
        self.changes.stage_create(name)
    }

    /// Stage a new entity and return a builder for staging its components
    pub fn spawn(&mut self, name: impl Into<String>) -> EntityCommands<'_> {
        let entity = self.changes.stage_create(name);
        self.commands(entity)
    }

    /// Builder for staging changes to `entity`
    pub fn commands(&mut self, entity: EntityId) -> EntityCommands<'_> {
        EntityCommands::new(self.world, &mut *self.changes, entity)
    }

    /// Stage `component` at the default slot of `entity`
    pub fn stage_attach<T: Component>(&mut self, entity: EntityId, component: T) -> ComponentRef {
        self.stage_attach_at(entity, DEFAULT_SLOT, component)
    }

    /// Stage `component` at `slot` of `entity`
    pub fn stage_attach_at<T: Component>(
        &mut self,
        entity: EntityId,
        slot: Slot,
        component: T,
    ) -> ComponentRef {
        self.changes.stage_attach(
            self.world,
            entity,
            ComponentKey::at::<T>(slot),
            Box::new(component),
        )
    }

    /// Stage detaching the `T` at the default slot of `entity`
    pub fn stage_detach<T: Component>(&mut self, entity: EntityId) {
        self.changes
            .stage_detach(self.world, entity, ComponentKey::of::<T>());
    }

    /// Stage detaching the `T` at `slot` of `entity`
    pub fn stage_detach_at<T: Component>(&mut self, entity: EntityId, slot: Slot) {
        self.changes
            .stage_detach(self.world, entity, ComponentKey::at::<T>(slot));
    }

    /// Stage destroying `entity` and detaching all of its components
    pub fn stage_destroy(&mut self, entity: EntityId) {
        self.changes.stage_destroy(self.world, entity);
    }

    /// Ask the scene to enter or leave the paused state next frame
    pub fn set_should_pause(&mut self, should_pause: bool) {
        self.control.should_pause = should_pause;
    }

    /// Pause request the scene will act on next frame
    pub fn should_pause(&self) -> bool {
        self.control.should_pause
    }

    /// Whether the scene is currently paused
    pub fn is_paused(&self) -> bool {
        self.control.is_paused
    }
}

/// Fluent staging for one entity
///
/// ```
/// use scene_runtime::ecs::{Transform, Velocity};
/// use scene_runtime::math::Vec2;
/// use scene_runtime::{Scene, SceneConfig};
///
/// let mut scene = Scene::new(SceneConfig::default());
/// let ball = scene
///     .spawn("ball")
///     .attach(Transform::at(Vec2::new(1.0, 2.0)))
///     .attach(Velocity::new(Vec2::new(3.0, 0.0)))
///     .id();
///
/// assert!(!scene.world().is_alive(ball));
/// ```
pub struct EntityCommands<'a> {
    world: &'a World,
    changes: &'a mut EntityChangelist,
    entity: EntityId,
}

impl<'a> EntityCommands<'a> {
    pub(crate) fn new(world: &'a World, changes: &'a mut EntityChangelist, entity: EntityId) -> Self {
        EntityCommands {
            world,
            changes,
            entity,
        }
    }

    /// The entity being staged
    pub fn id(&self) -> EntityId {
        self.entity
    }

    /// Stage `component` at the default slot
    pub fn attach<T: Component>(self, component: T) -> Self {
        self.attach_at(DEFAULT_SLOT, component)
    }

    /// Stage `component` at `slot`
    pub fn attach_at<T: Component>(self, slot: Slot, component: T) -> Self {
        self.changes.stage_attach(
            self.world,
            self.entity,
            ComponentKey::at::<T>(slot),
            Box::new(component),
        );
        self
    }

    /// Stage detaching the `T` at the default slot
    pub fn detach<T: Component>(self) -> Self {
        self.detach_at::<T>(DEFAULT_SLOT)
    }

    /// Stage detaching the `T` at `slot`
    pub fn detach_at<T: Component>(self, slot: Slot) -> Self {
        self.changes
            .stage_detach(self.world, self.entity, ComponentKey::at::<T>(slot));
        self
    }

    /// Stage destroying the entity
    pub fn destroy(self) -> EntityId {
        self.changes.stage_destroy(self.world, self.entity);
        self.entity
    }
}
