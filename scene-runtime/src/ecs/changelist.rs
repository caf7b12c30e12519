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
//! Deferred structural changes
//!
//! Creates, destroys, attaches, and detaches requested during a frame are
//! staged here and applied together at the start of the next frame. Between
//! two synchronization points the entity population is frozen, so every
//! update in a frame sees the same world.
//!
//! Applying runs in a fixed order:
//!
//! 1. Removals: `end` every detached component, drop it from the updater and
//!    the syncer registry, unlink it, then remove destroyed entities from the
//!    master set.
//! 2. Additions: add created entities, link staged components, then `begin`
//!    each one and register it with the updater and syncer registry.
//! 3. Sync: notify every registered syncer of the whole batch.
//! 4. Dispose: drop detached components and destroyed entity records.
//! 5. Clear the staging area.
//!
//! Staging done from inside `begin`, `end`, or `sync` is kept for the next
//! synchronization point. Destroying or detaching something the current
//! application is already removing is a no-op.

use crate::ecs::component::{Capabilities, Component, ComponentId, ComponentKey, ComponentRef};
use crate::ecs::context::{FrameTime, SceneContext, SceneControl};
use crate::ecs::entity::{ComponentEntry, EntityId, EntityRecord};
use crate::ecs::updater::EntityUpdater;
use crate::ecs::world::World;
use crate::indexed_set::IndexedSet;
use log::{debug, warn};
use std::collections::HashMap;

/// Capability for observing every applied batch of structural changes
///
/// Syncers maintain derived indexes (colliders by layer, drawables by order)
/// purely from the batches they receive.
pub trait Syncer {
    /// Invoked once per synchronization point with everything it applied
    fn sync(&mut self, batch: &ChangeBatch, ctx: &mut SceneContext<'_>);
}

/// One attached or detached component in a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentEvent {
    /// The component instance
    pub target: ComponentRef,
    /// Capabilities probed when it was staged
    pub caps: Capabilities,
}

/// Everything one synchronization point applied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeBatch {
    /// Entities that became alive
    pub created: Vec<EntityId>,
    /// Entities that stopped being alive
    pub destroyed: Vec<EntityId>,
    /// Components that were linked and begun
    pub attached: Vec<ComponentEvent>,
    /// Components that were ended and unlinked
    pub detached: Vec<ComponentEvent>,
}

impl ChangeBatch {
    /// Check if the batch changed nothing
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
            && self.destroyed.is_empty()
            && self.attached.is_empty()
            && self.detached.is_empty()
    }

    /// Attached components whose type is `T`
    pub fn attached_of<T: Component>(&self) -> impl Iterator<Item = ComponentRef> + '_ {
        self.attached
            .iter()
            .filter(|event| event.target.key.kind.is::<T>())
            .map(|event| event.target)
    }

    /// Detached components whose type is `T`
    pub fn detached_of<T: Component>(&self) -> impl Iterator<Item = ComponentRef> + '_ {
        self.detached
            .iter()
            .filter(|event| event.target.key.kind.is::<T>())
            .map(|event| event.target)
    }
}

struct StagedComponent {
    id: ComponentId,
    caps: Capabilities,
    component: Box<dyn Component>,
}

#[derive(Default)]
struct PendingChanges {
    created: IndexedSet<EntityId>,
    names: HashMap<EntityId, String>,
    destroyed: IndexedSet<EntityId>,
    cancelled: IndexedSet<EntityId>,
    attach_order: IndexedSet<(EntityId, ComponentKey)>,
    attached: HashMap<(EntityId, ComponentKey), StagedComponent>,
    detached: IndexedSet<ComponentRef>,
}

/// Entities and components being torn down by the running application
#[derive(Default)]
struct Removing {
    entities: IndexedSet<EntityId>,
    components: IndexedSet<ComponentRef>,
}

impl Removing {
    fn of(pending: &PendingChanges) -> Self {
        Removing {
            entities: pending.destroyed.iter().copied().collect(),
            components: pending.detached.iter().copied().collect(),
        }
    }

    fn has_key(&self, entity: EntityId, key: &ComponentKey) -> bool {
        self.entities.contains(&entity)
            || self
                .components
                .iter()
                .any(|target| target.entity == entity && target.key == *key)
    }
}

impl PendingChanges {
    fn is_empty(&self) -> bool {
        self.created.is_empty()
            && self.destroyed.is_empty()
            && self.attach_order.is_empty()
            && self.detached.is_empty()
    }
}

/// Staging area for entity and component changes
pub struct EntityChangelist {
    next_entity_id: u64,
    next_component_id: u64,
    pending: PendingChanges,
    removing: Removing,
    syncers: IndexedSet<ComponentRef>,
}

impl EntityChangelist {
    /// Create an empty changelist; the first staged entity gets id 1
    pub fn new() -> Self {
        EntityChangelist {
            next_entity_id: 1,
            next_component_id: 1,
            pending: PendingChanges::default(),
            removing: Removing::default(),
            syncers: IndexedSet::new(),
        }
    }

    /// Check if nothing is staged
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Check whether `entity` is staged for creation
    pub fn is_pending_create(&self, entity: EntityId) -> bool {
        self.pending.created.contains(&entity)
    }

    /// Check whether `entity` is staged for destruction
    pub fn is_pending_destroy(&self, entity: EntityId) -> bool {
        self.pending.destroyed.contains(&entity)
    }

    /// Check whether a component is staged for attachment at `key`
    pub fn is_pending_attach(&self, entity: EntityId, key: &ComponentKey) -> bool {
        self.pending.attached.contains_key(&(entity, *key))
    }

    /// Registered syncers, in registration order until the first removal
    pub fn syncers(&self) -> &[ComponentRef] {
        self.syncers.as_slice()
    }

    /// Allocate an entity id and stage its creation
    pub fn stage_create(&mut self, name: impl Into<String>) -> EntityId {
        let entity = EntityId::new(self.next_entity_id);
        self.next_entity_id += 1;

        self.pending.created.add_or_die(entity);
        self.pending.names.insert(entity, name.into());
        entity
    }

    /// Stage destruction of `entity` along with detachment of its components
    ///
    /// Idempotent within a frame. Destroying an entity that is only pending
    /// creation cancels the creation. Destroying an entity that the running
    /// synchronization point is already destroying does nothing.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is neither alive nor pending creation.
    pub fn stage_destroy(&mut self, world: &World, entity: EntityId) {
        if self.pending.created.remove(&entity) {
            self.pending.names.remove(&entity);
            self.pending.cancelled.add(entity);
            return;
        }
        if self.pending.cancelled.contains(&entity) || self.removing.entities.contains(&entity) {
            return;
        }
        assert!(
            world.is_alive(entity),
            "cannot destroy {}: entity is not alive",
            entity
        );

        if !self.pending.destroyed.add(entity) {
            return;
        }
        if let Some(record) = world.record(entity) {
            for target in record.component_refs() {
                if !self.removing.components.contains(&target) {
                    self.pending.detached.add(target);
                }
            }
        }
    }

    /// Stage `component` to be attached at `key`
    ///
    /// The component's owning entity is fixed here. Staging again at the same
    /// key before the next synchronization point replaces the earlier one.
    ///
    /// # Panics
    ///
    /// Panics if the entity is neither alive nor pending creation, or already
    /// has a live component at `key`. An entity being destroyed by the running
    /// synchronization point still accepts the component; it is discarded at
    /// the next one.
    pub fn stage_attach(
        &mut self,
        world: &World,
        entity: EntityId,
        key: ComponentKey,
        mut component: Box<dyn Component>,
    ) -> ComponentRef {
        assert!(
            world.is_alive(entity)
                || self.pending.created.contains(&entity)
                || self.removing.entities.contains(&entity),
            "cannot attach {} to {}: entity is neither alive nor pending creation",
            key,
            entity
        );
        assert!(
            !world.has_key(entity, &key),
            "{} already has a component of type {}",
            entity,
            key
        );

        let id = ComponentId::new(self.next_component_id);
        self.next_component_id += 1;
        let caps = Capabilities::probe(&mut *component);

        self.pending.attach_order.add((entity, key));
        self.pending
            .attached
            .insert((entity, key), StagedComponent { id, caps, component });

        ComponentRef { entity, key, id }
    }

    /// Stage the live component at `key` to be detached
    ///
    /// Idempotent within a frame. Detaching a component that the running
    /// synchronization point is already detaching does nothing.
    ///
    /// # Panics
    ///
    /// Panics if the entity has no live component at `key`.
    pub fn stage_detach(&mut self, world: &World, entity: EntityId, key: ComponentKey) {
        let target = match world.component_ref(entity, &key) {
            Some(target) => target,
            None if self.removing.has_key(entity, &key) => return,
            None => panic!("{} does not have a component of type {}", entity, key),
        };
        if self.removing.entities.contains(&entity) || self.removing.components.contains(&target) {
            return;
        }
        self.pending.detached.add(target);
    }

    /// Apply every staged change to `world` and `updater`
    pub(crate) fn apply(
        &mut self,
        world: &mut World,
        updater: &mut EntityUpdater,
        control: &mut SceneControl,
        frame: FrameTime,
    ) -> ChangeBatch {
        let mut pending = std::mem::take(&mut self.pending);
        self.removing = Removing::of(&pending);
        let mut batch = ChangeBatch::default();

        let disposed = self.process_removals(&mut pending, world, updater, control, frame, &mut batch);
        self.process_additions(&mut pending, world, updater, control, frame, &mut batch);
        self.sync(world, control, frame, &batch);

        // Dispose
        drop(disposed);
        for &entity in &batch.destroyed {
            world.remove_record(entity);
        }
        self.removing = Removing::default();

        if !batch.is_empty() {
            debug!(
                "Applied changelist: {} created, {} destroyed, {} attached, {} detached",
                batch.created.len(),
                batch.destroyed.len(),
                batch.attached.len(),
                batch.detached.len()
            );
        }
        batch
    }

    fn process_removals(
        &mut self,
        pending: &mut PendingChanges,
        world: &mut World,
        updater: &mut EntityUpdater,
        control: &mut SceneControl,
        frame: FrameTime,
        batch: &mut ChangeBatch,
    ) -> Vec<ComponentEntry> {
        for &target in pending.detached.iter() {
            let Some(entry) = world.entry(&target) else {
                panic!("{} was staged for detach but is not attached", target);
            };
            let caps = entry.caps;
            {
                let mut ctx = SceneContext::new(world, self, control, frame, target);
                entry.cell.borrow_mut().end(&mut ctx);
            }
            if caps.updatable {
                updater.remove(&target);
            }
            if caps.syncer {
                self.syncers.remove_or_die(&target);
            }
            batch.detached.push(ComponentEvent { target, caps });
        }

        let mut disposed = Vec::with_capacity(pending.detached.len());
        for target in pending.detached.iter() {
            if let Some(record) = world.record_mut(target.entity) {
                disposed.push(record.unlink(&target.key));
            }
        }
        for &entity in pending.destroyed.iter() {
            world.kill(entity);
            batch.destroyed.push(entity);
        }
        disposed
    }

    fn process_additions(
        &mut self,
        pending: &mut PendingChanges,
        world: &mut World,
        updater: &mut EntityUpdater,
        control: &mut SceneControl,
        frame: FrameTime,
        batch: &mut ChangeBatch,
    ) {
        for &entity in pending.created.iter() {
            let name = pending.names.remove(&entity).unwrap_or_default();
            world.insert_record(EntityRecord::new(entity, name));
            batch.created.push(entity);
        }

        let mut linked = Vec::with_capacity(pending.attach_order.len());
        for &(entity, key) in pending.attach_order.iter() {
            let Some(staged) = pending.attached.remove(&(entity, key)) else {
                continue;
            };
            if !world.is_alive(entity) {
                warn!(
                    "Discarding {} staged on {}: entity did not survive the synchronization point",
                    key, entity
                );
                continue;
            }
            if let Some(record) = world.record_mut(entity) {
                record.link(key, ComponentEntry::new(staged.id, staged.caps, staged.component));
                linked.push(ComponentEvent {
                    target: ComponentRef {
                        entity,
                        key,
                        id: staged.id,
                    },
                    caps: staged.caps,
                });
            }
        }

        for event in &linked {
            let target = event.target;
            if let Some(cell) = world.cell(&target) {
                let mut ctx = SceneContext::new(world, self, control, frame, target);
                cell.borrow_mut().begin(&mut ctx);
            }
            if event.caps.updatable {
                updater.add(world, target);
            }
            if event.caps.syncer {
                self.syncers.add_or_die(target);
            }
        }
        batch.attached = linked;
    }

    fn sync(&mut self, world: &World, control: &mut SceneControl, frame: FrameTime, batch: &ChangeBatch) {
        for target in self.syncers.to_vec() {
            let Some(cell) = world.cell(&target) else {
                continue;
            };
            let mut component = cell.borrow_mut();
            if let Some(syncer) = component.as_syncer() {
                let mut ctx = SceneContext::new(world, self, control, frame, target);
                syncer.sync(batch, &mut ctx);
            }
        }
    }
}

impl Default for EntityChangelist {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::{downcast_ref, ComponentKind, DEFAULT_SLOT};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Probe {
        label: &'static str,
        log: Log,
    }

    impl Component for Probe {
        fn begin(&mut self, ctx: &mut SceneContext<'_>) {
            self.log
                .borrow_mut()
                .push(format!("begin {} alive={}", self.label, ctx.world().is_alive(ctx.entity())));
        }

        fn end(&mut self, ctx: &mut SceneContext<'_>) {
            self.log
                .borrow_mut()
                .push(format!("end {} alive={}", self.label, ctx.world().is_alive(ctx.entity())));
        }
    }

    struct Harness {
        world: World,
        changes: EntityChangelist,
        updater: EntityUpdater,
        control: SceneControl,
    }

    impl Harness {
        fn new() -> Self {
            Harness {
                world: World::new(),
                changes: EntityChangelist::new(),
                updater: EntityUpdater::new(),
                control: SceneControl::default(),
            }
        }

        fn attach(&mut self, entity: EntityId, component: impl Component) -> ComponentRef {
            let key = ComponentKey::new(ComponentKind::of_val(&component), DEFAULT_SLOT);
            self.changes
                .stage_attach(&self.world, entity, key, Box::new(component))
        }

        fn apply(&mut self) -> ChangeBatch {
            self.changes.apply(
                &mut self.world,
                &mut self.updater,
                &mut self.control,
                FrameTime::default(),
            )
        }
    }

    fn probe(label: &'static str, log: &Log) -> Probe {
        Probe {
            label,
            log: log.clone(),
        }
    }

    #[test]
    fn test_entity_ids_start_at_one() {
        let mut changes = EntityChangelist::new();
        assert_eq!(changes.stage_create("a"), EntityId::new(1));
        assert_eq!(changes.stage_create("b"), EntityId::new(2));
    }

    #[test]
    fn test_created_entity_alive_after_apply() {
        let mut h = Harness::new();
        let entity = h.changes.stage_create("player");
        assert!(!h.world.is_alive(entity));
        assert!(h.changes.is_pending_create(entity));

        let batch = h.apply();
        assert!(h.world.is_alive(entity));
        assert_eq!(batch.created, vec![entity]);
        assert_eq!(h.world.entity(entity).unwrap().name(), "player");
        assert!(h.changes.is_empty());
    }

    #[test]
    fn test_begin_and_end_run_once() {
        let log: Log = Rc::default();
        let mut h = Harness::new();
        let entity = h.changes.stage_create("e");
        h.attach(entity, probe("p", &log));
        h.apply();

        h.changes.stage_destroy(&h.world, entity);
        h.changes.stage_destroy(&h.world, entity);
        assert!(h.changes.is_pending_destroy(entity));
        let batch = h.apply();

        assert_eq!(batch.destroyed, vec![entity]);
        assert_eq!(batch.detached.len(), 1);
        assert!(!h.world.is_alive(entity));
        assert!(h.world.record(entity).is_none());
        assert_eq!(
            *log.borrow(),
            vec!["begin p alive=true".to_string(), "end p alive=true".to_string()]
        );
    }

    #[test]
    fn test_last_write_wins() {
        let log: Log = Rc::default();
        let mut h = Harness::new();
        let entity = h.changes.stage_create("e");
        let first = h.attach(entity, probe("first", &log));
        let second = h.attach(entity, probe("second", &log));
        assert_ne!(first.id, second.id);

        let batch = h.apply();
        assert_eq!(batch.attached.len(), 1);
        assert_eq!(batch.attached[0].target, second);
        assert_eq!(*log.borrow(), vec!["begin second alive=true".to_string()]);

        let record = h.world.record(entity).unwrap();
        let cell = record.entry(&ComponentKey::of::<Probe>()).unwrap().cell.borrow();
        assert_eq!(downcast_ref::<Probe>(&**cell).unwrap().label, "second");
    }

    #[test]
    fn test_detach_is_idempotent() {
        let log: Log = Rc::default();
        let mut h = Harness::new();
        let entity = h.changes.stage_create("e");
        h.attach(entity, probe("p", &log));
        h.apply();

        h.changes.stage_detach(&h.world, entity, ComponentKey::of::<Probe>());
        h.changes.stage_detach(&h.world, entity, ComponentKey::of::<Probe>());
        let batch = h.apply();

        assert_eq!(batch.detached.len(), 1);
        assert!(h.world.is_alive(entity));
        assert!(!h.world.has::<Probe>(entity));
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_create_then_destroy_cancels() {
        let log: Log = Rc::default();
        let mut h = Harness::new();
        let entity = h.changes.stage_create("ghost");
        h.attach(entity, probe("p", &log));
        h.changes.stage_destroy(&h.world, entity);
        h.changes.stage_destroy(&h.world, entity);

        let batch = h.apply();
        assert!(batch.created.is_empty());
        assert!(batch.attached.is_empty());
        assert!(!h.world.is_alive(entity));
        assert!(log.borrow().is_empty(), "never begun, never ended");
    }

    #[test]
    fn test_attach_to_destroyed_entity_is_discarded() {
        let log: Log = Rc::default();
        let mut h = Harness::new();
        let entity = h.changes.stage_create("e");
        h.apply();

        h.changes.stage_destroy(&h.world, entity);
        h.attach(entity, probe("late", &log));
        let batch = h.apply();

        assert!(batch.attached.is_empty());
        assert!(log.borrow().is_empty());
    }

    #[test]
    #[should_panic(expected = "already has a component of type Probe")]
    fn test_attach_over_live_component_panics() {
        let log: Log = Rc::default();
        let mut h = Harness::new();
        let entity = h.changes.stage_create("e");
        h.attach(entity, probe("a", &log));
        h.apply();
        h.attach(entity, probe("b", &log));
    }

    #[test]
    #[should_panic(expected = "does not have a component of type Probe")]
    fn test_detach_missing_panics() {
        let mut h = Harness::new();
        let entity = h.changes.stage_create("e");
        h.apply();
        h.changes.stage_detach(&h.world, entity, ComponentKey::of::<Probe>());
    }

    #[test]
    #[should_panic(expected = "entity is neither alive nor pending creation")]
    fn test_attach_to_unknown_entity_panics() {
        let log: Log = Rc::default();
        let mut h = Harness::new();
        h.attach(EntityId::new(42), probe("p", &log));
    }

    /// Stages destruction of its own entity and detachment of itself on end
    struct Undertaker;

    impl Component for Undertaker {
        fn end(&mut self, ctx: &mut SceneContext<'_>) {
            let entity = ctx.entity();
            ctx.stage_destroy(entity);
            ctx.stage_detach::<Undertaker>(entity);
        }
    }

    #[test]
    fn test_removal_in_progress_is_not_restaged() {
        let mut h = Harness::new();
        let entity = h.changes.stage_create("e");
        h.attach(entity, Undertaker);
        h.apply();

        h.changes.stage_destroy(&h.world, entity);
        let batch = h.apply();
        assert_eq!(batch.destroyed, vec![entity]);
        assert!(h.changes.is_empty());
        assert!(h.changes.removing.entities.is_empty());

        let batch = h.apply();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_destroy_during_detach_skips_detaching_component() {
        let log: Log = Rc::default();
        let mut h = Harness::new();
        let entity = h.changes.stage_create("e");
        h.attach(entity, Undertaker);
        h.attach(entity, probe("p", &log));
        h.apply();

        h.changes.stage_detach(&h.world, entity, ComponentKey::of::<Undertaker>());
        h.apply();
        assert!(h.world.is_alive(entity));
        assert!(h.changes.is_pending_destroy(entity));

        let batch = h.apply();
        assert_eq!(batch.destroyed, vec![entity]);
        assert_eq!(batch.detached.len(), 1);
        assert_eq!(
            *log.borrow(),
            vec!["begin p alive=true".to_string(), "end p alive=true".to_string()]
        );
    }

    struct Counting {
        batches: Vec<usize>,
    }

    impl Component for Counting {
        fn as_syncer(&mut self) -> Option<&mut dyn Syncer> {
            Some(self)
        }
    }

    impl Syncer for Counting {
        fn sync(&mut self, batch: &ChangeBatch, _ctx: &mut SceneContext<'_>) {
            self.batches.push(batch.attached.len());
        }
    }

    #[test]
    fn test_syncer_sees_its_own_batch() {
        let log: Log = Rc::default();
        let mut h = Harness::new();
        let entity = h.changes.stage_create("e");
        let syncer = h.attach(entity, Counting { batches: Vec::new() });
        h.attach(entity, probe("p", &log));
        h.apply();
        assert_eq!(h.changes.syncers(), &[syncer]);

        h.apply();
        let batches = h.world.get::<Counting>(entity).unwrap().batches.clone();
        assert_eq!(batches, vec![2, 0]);

        h.changes.stage_detach(&h.world, entity, ComponentKey::of::<Counting>());
        h.apply();
        assert!(h.changes.syncers().is_empty());
    }
}
