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
//! Contact detection and enter/stay/exit dispatch
//!
//! The collision manager is a singleton component. As a syncer it keeps
//! colliders indexed by layer and collision handlers indexed by entity. As an
//! updatable it runs after movement, tests every collidable pair with an
//! O(n²) sweep per layer pair, and diffs this frame's contacts against the
//! previous frame's to decide which callback each handler receives.

use crate::ecs::changelist::{ChangeBatch, ComponentEvent, Syncer};
use crate::ecs::updater::{order, Updatable};
use crate::ecs::{Component, ComponentRef, EntityId, SceneContext, Transform, World};
use crate::indexed_set::IndexedSet;
use crate::math::RectF;
use crate::physics::collider::{Collider, ALL_LAYERS};
use crate::physics::contact::ContactInfo;
use crate::physics::CollisionHandler;
use log::{trace, warn};
use std::collections::{BTreeMap, BTreeSet, HashMap};

type PairKey = (ComponentRef, ComponentRef);

/// Contacts of one frame, keyed by canonical pair, in discovery order
#[derive(Default)]
struct ContactMap {
    contacts: Vec<ContactInfo>,
    index: HashMap<PairKey, usize>,
}

impl ContactMap {
    fn insert(&mut self, contact: ContactInfo) {
        let key = (contact.mine, contact.other);
        if self.index.contains_key(&key) {
            return;
        }
        self.index.insert(key, self.contacts.len());
        self.contacts.push(contact);
    }

    fn contains(&self, key: &PairKey) -> bool {
        self.index.contains_key(key)
    }

    fn clear(&mut self) {
        self.contacts.clear();
        self.index.clear();
    }

    fn len(&self) -> usize {
        self.contacts.len()
    }
}

#[derive(Clone, Copy)]
enum Callback {
    Enter,
    Stay,
    Exit,
}

/// Singleton that detects collider overlap and notifies handlers
pub struct CollisionManager {
    collidable_layers: BTreeSet<(i32, i32)>,
    colliders: BTreeMap<i32, IndexedSet<ComponentRef>>,
    collider_layers: HashMap<ComponentRef, i32>,
    handlers: HashMap<EntityId, IndexedSet<ComponentRef>>,
    contacts: ContactMap,
    previous_contacts: ContactMap,
}

impl CollisionManager {
    /// Create a manager where only `ALL_LAYERS` colliders collide
    pub fn new() -> Self {
        CollisionManager {
            collidable_layers: BTreeSet::new(),
            colliders: BTreeMap::new(),
            collider_layers: HashMap::new(),
            handlers: HashMap::new(),
            contacts: ContactMap::default(),
            previous_contacts: ContactMap::default(),
        }
    }

    /// Create a manager with the given layer pairs marked collidable
    pub fn with_collidable_layers(pairs: impl IntoIterator<Item = (i32, i32)>) -> Self {
        let mut manager = CollisionManager::new();
        for (a, b) in pairs {
            manager.mark_collidable(a, b);
        }
        manager
    }

    /// Allow colliders on `a` and `b` to collide
    ///
    /// # Panics
    ///
    /// Panics if either layer is `ALL_LAYERS`.
    pub fn mark_collidable(&mut self, a: i32, b: i32) {
        self.collidable_layers.insert(normalized_pair(a, b));
    }

    /// Stop colliders on `a` and `b` from colliding
    ///
    /// # Panics
    ///
    /// Panics if either layer is `ALL_LAYERS`.
    pub fn mark_noncollidable(&mut self, a: i32, b: i32) {
        self.collidable_layers.remove(&normalized_pair(a, b));
    }

    /// Explicitly allowed layer pairs, each as `(min, max)`
    pub fn collidable_layers(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.collidable_layers.iter().copied()
    }

    /// Check whether colliders on `a` and `b` are tested against each other
    pub fn layers_collidable(&self, a: i32, b: i32) -> bool {
        if a == ALL_LAYERS || b == ALL_LAYERS {
            return true;
        }
        self.collidable_layers.contains(&(a.min(b), a.max(b)))
    }

    /// Registered colliders on `layer`
    pub fn colliders_on(&self, layer: i32) -> &[ComponentRef] {
        self.colliders
            .get(&layer)
            .map(|set| set.as_slice())
            .unwrap_or(&[])
    }

    /// Total number of registered colliders
    pub fn collider_count(&self) -> usize {
        self.collider_layers.len()
    }

    /// Number of collision handlers registered for `entity`
    pub fn handler_count(&self, entity: EntityId) -> usize {
        self.handlers.get(&entity).map(|set| set.len()).unwrap_or(0)
    }

    /// This frame's contacts, each seen from the lower entity id's side
    pub fn contacts(&self) -> &[ContactInfo] {
        &self.contacts.contacts
    }

    /// World rectangle and enabled flag of every registered collider
    ///
    /// Colliders whose entity has no `Transform` use the identity transform.
    pub fn collider_shapes(&self, world: &World) -> Vec<(ComponentRef, RectF, bool)> {
        self.colliders
            .values()
            .flat_map(|set| set.iter())
            .filter_map(|&target| {
                collider_shape(world, &target).map(|(rect, enabled)| (target, rect, enabled))
            })
            .collect()
    }

    fn check_contacts(&mut self, world: &World) {
        std::mem::swap(&mut self.contacts, &mut self.previous_contacts);
        self.contacts.clear();

        let shapes: HashMap<ComponentRef, RectF> = self
            .collider_shapes(world)
            .into_iter()
            .filter(|(_, _, enabled)| *enabled)
            .map(|(target, rect, _)| (target, rect))
            .collect();

        // Same-layer pairs
        for (&layer, set) in &self.colliders {
            if !self.layers_collidable(layer, layer) {
                continue;
            }
            for i in 0..set.len() {
                for j in (i + 1)..set.len() {
                    check_pair(&shapes, &mut self.contacts, set[i], set[j]);
                }
            }
        }

        // Cross-layer pairs
        let layers: Vec<i32> = self.colliders.keys().copied().collect();
        for (i, &first) in layers.iter().enumerate() {
            for &second in &layers[i + 1..] {
                if !self.layers_collidable(first, second) {
                    continue;
                }
                for &a in self.colliders[&first].iter() {
                    for &b in self.colliders[&second].iter() {
                        check_pair(&shapes, &mut self.contacts, a, b);
                    }
                }
            }
        }
    }

    fn handle_collisions(&self, ctx: &mut SceneContext<'_>) {
        for contact in &self.previous_contacts.contacts {
            if !self.contacts.contains(&(contact.mine, contact.other)) {
                trace!("Contact exit: {} / {}", contact.mine, contact.other);
                self.dispatch(Callback::Exit, contact, ctx);
            }
        }

        for contact in &self.contacts.contacts {
            if self.previous_contacts.contains(&(contact.mine, contact.other)) {
                self.dispatch(Callback::Stay, contact, ctx);
            } else {
                trace!("Contact enter: {} / {}", contact.mine, contact.other);
                self.dispatch(Callback::Enter, contact, ctx);
            }
        }
    }

    fn dispatch(&self, callback: Callback, contact: &ContactInfo, ctx: &mut SceneContext<'_>) {
        self.notify(contact.mine.entity, callback, contact, ctx);
        self.notify(contact.other.entity, callback, &contact.inverted(), ctx);
    }

    fn notify(
        &self,
        entity: EntityId,
        callback: Callback,
        contact: &ContactInfo,
        ctx: &mut SceneContext<'_>,
    ) {
        let Some(handlers) = self.handlers.get(&entity) else {
            return;
        };
        let world = ctx.world();
        for &target in handlers.iter() {
            let Some(cell) = world.cell(&target) else {
                continue;
            };
            let Ok(mut component) = cell.try_borrow_mut() else {
                warn!("Skipping busy collision handler {}", target);
                continue;
            };
            let Some(handler) = component.as_collision_handler() else {
                continue;
            };
            let mut scoped = ctx.scoped(target);
            match callback {
                Callback::Enter => handler.on_collision_enter(contact, &mut scoped),
                Callback::Stay => handler.on_collision_stay(contact, &mut scoped),
                Callback::Exit => handler.on_collision_exit(contact, &mut scoped),
            }
        }
    }

    fn track_attached(&mut self, world: &World, event: &ComponentEvent) {
        let target = event.target;
        if target.key.kind.is::<Collider>() {
            match collider_layer(world, &target) {
                Some(layer) => {
                    if !self.collider_layers.contains_key(&target) {
                        self.collider_layers.insert(target, layer);
                        self.colliders.entry(layer).or_default().add_or_die(target);
                    }
                }
                None => warn!("Cannot index collider {}: not readable", target),
            }
        }
        if event.caps.collision_handler {
            self.handlers.entry(target.entity).or_default().add(target);
        }
    }

    fn track_detached(&mut self, event: &ComponentEvent) {
        let target = event.target;
        if let Some(layer) = self.collider_layers.remove(&target) {
            if let Some(set) = self.colliders.get_mut(&layer) {
                set.remove_or_die(&target);
                if set.is_empty() {
                    self.colliders.remove(&layer);
                }
            }
        }
        if event.caps.collision_handler {
            if let Some(set) = self.handlers.get_mut(&target.entity) {
                set.remove_or_die(&target);
            }
        }
    }
}

impl Default for CollisionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for CollisionManager {
    /// Index colliders and handlers that were attached before this manager
    fn begin(&mut self, ctx: &mut SceneContext<'_>) {
        let world = ctx.world();
        for entity in world.entities() {
            let Some(record) = world.record(entity) else {
                continue;
            };
            for target in record.component_refs() {
                if let Some(entry) = world.entry(&target) {
                    let event = ComponentEvent {
                        target,
                        caps: entry.caps,
                    };
                    self.track_attached(world, &event);
                }
            }
        }
    }

    fn as_updatable(&mut self) -> Option<&mut dyn Updatable> {
        Some(self)
    }

    fn as_syncer(&mut self) -> Option<&mut dyn Syncer> {
        Some(self)
    }
}

impl Updatable for CollisionManager {
    fn update_order(&self) -> i32 {
        order::COLLISION
    }

    fn update(&mut self, ctx: &mut SceneContext<'_>) {
        self.check_contacts(ctx.world());
        self.handle_collisions(ctx);
        trace!("{} contacts this frame", self.contacts.len());
    }
}

impl Syncer for CollisionManager {
    fn sync(&mut self, batch: &ChangeBatch, ctx: &mut SceneContext<'_>) {
        for event in &batch.detached {
            self.track_detached(event);
        }
        for event in &batch.attached {
            self.track_attached(ctx.world(), event);
        }
        for entity in &batch.destroyed {
            self.handlers.remove(entity);
        }
    }
}

fn normalized_pair(a: i32, b: i32) -> (i32, i32) {
    assert!(
        a != ALL_LAYERS && b != ALL_LAYERS,
        "ALL_LAYERS is always collidable and cannot be marked"
    );
    (a.min(b), a.max(b))
}

fn collider_layer(world: &World, target: &ComponentRef) -> Option<i32> {
    let cell = world.cell(target)?.try_borrow().ok()?;
    crate::ecs::downcast_ref::<Collider>(&**cell).map(|collider| collider.layer())
}

fn collider_shape(world: &World, target: &ComponentRef) -> Option<(RectF, bool)> {
    let cell = world.cell(target)?.try_borrow().ok()?;
    let collider = crate::ecs::downcast_ref::<Collider>(&**cell)?;
    let rect = match world.try_get::<Transform>(target.entity) {
        Some(transform) => collider.world_rect(&transform),
        None => collider.world_rect(&Transform::identity()),
    };
    Some((rect, collider.is_enabled()))
}

fn check_pair(
    shapes: &HashMap<ComponentRef, RectF>,
    contacts: &mut ContactMap,
    a: ComponentRef,
    b: ComponentRef,
) {
    if a.entity == b.entity {
        return;
    }
    let (Some(rect_a), Some(rect_b)) = (shapes.get(&a), shapes.get(&b)) else {
        return;
    };
    let Some(overlap) = rect_a.overlap(rect_b) else {
        return;
    };

    if a.entity < b.entity {
        contacts.insert(ContactInfo::between(a, rect_a, b, overlap));
    } else {
        contacts.insert(ContactInfo::between(b, rect_b, a, overlap));
    }
}
