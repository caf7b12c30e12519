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
//! Contact lifecycle tests
//!
//! Covers enter/stay/exit sequencing, layer gating, same-entity exclusion,
//! and contact orientation.

use scene_runtime::ecs::{Component, ComponentKey, ComponentRef, EntityId, SceneContext, Transform};
use scene_runtime::math::{RectF, Vec2};
use scene_runtime::physics::{Collider, CollisionHandler, CollisionManager, ContactInfo};
use scene_runtime::plugins::{CollisionPlugin, PluginRegistry};
use scene_runtime::{Scene, SceneConfig};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Enter,
    Stay,
    Exit,
}

type Events = Rc<RefCell<Vec<(Phase, ContactInfo)>>>;

/// Records every contact callback its entity receives
struct Recorder {
    events: Events,
}

impl Component for Recorder {
    fn as_collision_handler(&mut self) -> Option<&mut dyn CollisionHandler> {
        Some(self)
    }
}

impl CollisionHandler for Recorder {
    fn on_collision_enter(&mut self, contact: &ContactInfo, _ctx: &mut SceneContext<'_>) {
        self.events.borrow_mut().push((Phase::Enter, *contact));
    }

    fn on_collision_stay(&mut self, contact: &ContactInfo, _ctx: &mut SceneContext<'_>) {
        self.events.borrow_mut().push((Phase::Stay, *contact));
    }

    fn on_collision_exit(&mut self, contact: &ContactInfo, _ctx: &mut SceneContext<'_>) {
        self.events.borrow_mut().push((Phase::Exit, *contact));
    }
}

fn scene_with_layers(pairs: &[(i32, i32)]) -> Scene {
    let config = SceneConfig::default().with_collidable_layers(pairs.iter().copied());
    let registry = PluginRegistry::new().with(CollisionPlugin).unwrap();
    Scene::with_plugins(config, registry).unwrap()
}

fn unit_box() -> RectF {
    RectF::centered(Vec2::zeros(), Vec2::new(2.0, 2.0))
}

/// Spawn a 2x2 box collider with a recorder at `(x, y)`
fn spawn_box(scene: &mut Scene, name: &str, layer: i32, x: f32, y: f32) -> (EntityId, Events) {
    let events: Events = Rc::default();
    let entity = scene
        .spawn(name)
        .attach(Transform::at(Vec2::new(x, y)))
        .attach(Collider::new(unit_box()).with_layer(layer))
        .attach(Recorder {
            events: Rc::clone(&events),
        })
        .id();
    (entity, events)
}

fn move_to(scene: &Scene, entity: EntityId, x: f32, y: f32) {
    scene.world().get_mut::<Transform>(entity).unwrap().position = Vec2::new(x, y);
}

fn collider_of(scene: &Scene, entity: EntityId) -> ComponentRef {
    scene
        .world()
        .component_ref(entity, &ComponentKey::of::<Collider>())
        .unwrap()
}

fn phases(events: &Events) -> Vec<Phase> {
    events.borrow().iter().map(|(phase, _)| *phase).collect()
}

#[test]
fn test_enter_stay_exit_sequence() {
    let mut scene = scene_with_layers(&[(1, 1)]);
    let (a, a_events) = spawn_box(&mut scene, "a", 1, 0.0, 0.0);
    let (b, b_events) = spawn_box(&mut scene, "b", 1, 10.0, 0.0);
    scene.step(0.1);
    assert!(a_events.borrow().is_empty());
    assert!(b_events.borrow().is_empty());

    // Frame 1: overlap
    move_to(&scene, b, 1.5, 0.0);
    scene.step(0.1);
    assert_eq!(phases(&a_events), vec![Phase::Enter]);
    assert_eq!(phases(&b_events), vec![Phase::Enter]);
    let (_, a_view) = a_events.borrow()[0];
    assert_eq!(a_view.mine, collider_of(&scene, a));
    assert_eq!(a_view.other, collider_of(&scene, b));
    let (_, b_view) = b_events.borrow()[0];
    assert_eq!(b_view.mine, collider_of(&scene, b));
    assert_eq!(b_view.other, collider_of(&scene, a));

    // Frame 2: still overlapping
    scene.step(0.1);
    assert_eq!(phases(&a_events), vec![Phase::Enter, Phase::Stay]);
    assert_eq!(phases(&b_events), vec![Phase::Enter, Phase::Stay]);

    // Frame 3: apart
    move_to(&scene, b, 10.0, 0.0);
    scene.step(0.1);
    assert_eq!(phases(&a_events), vec![Phase::Enter, Phase::Stay, Phase::Exit]);
    assert_eq!(phases(&b_events), vec![Phase::Enter, Phase::Stay, Phase::Exit]);

    // Frame 4: nothing more
    scene.step(0.1);
    assert_eq!(a_events.borrow().len(), 3);
    assert_eq!(b_events.borrow().len(), 3);
}

#[test]
fn test_normal_points_back_toward_mine() {
    let mut scene = scene_with_layers(&[(1, 1)]);
    let (_, left_events) = spawn_box(&mut scene, "left", 1, 0.0, 0.0);
    let (_, right_events) = spawn_box(&mut scene, "right", 1, 1.5, 0.0);
    scene.step(0.1);

    let (_, left_view) = left_events.borrow()[0];
    let (_, right_view) = right_events.borrow()[0];
    assert_eq!(left_view.normal, Vec2::new(-1.0, 0.0));
    assert_eq!(right_view.normal, Vec2::new(1.0, 0.0));
    assert_eq!(left_view.overlap, right_view.overlap);
    assert_eq!(left_view.overlap.width(), 0.5);
}

#[test]
fn test_vertical_overlap_uses_vertical_normal() {
    let mut scene = scene_with_layers(&[(1, 1)]);
    let (_, top_events) = spawn_box(&mut scene, "top", 1, 0.0, 0.0);
    let (_, bottom_events) = spawn_box(&mut scene, "bottom", 1, 0.0, 1.5);
    scene.step(0.1);

    let (_, top_view) = top_events.borrow()[0];
    let (_, bottom_view) = bottom_events.borrow()[0];
    assert_eq!(top_view.normal, Vec2::new(0.0, -1.0));
    assert_eq!(bottom_view.normal, Vec2::new(0.0, 1.0));
}

#[test]
fn test_unmarked_layers_do_not_collide() {
    let mut scene = scene_with_layers(&[(1, 1)]);
    let (_, a_events) = spawn_box(&mut scene, "a", 1, 0.0, 0.0);
    let (_, b_events) = spawn_box(&mut scene, "b", 2, 0.5, 0.0);
    scene.step(0.1);
    scene.step(0.1);

    assert!(a_events.borrow().is_empty());
    assert!(b_events.borrow().is_empty());
}

#[test]
fn test_cross_layer_pair_collides_once_marked() {
    let mut scene = scene_with_layers(&[(2, 1)]);
    let (_, a_events) = spawn_box(&mut scene, "a", 1, 0.0, 0.0);
    let (_, b_events) = spawn_box(&mut scene, "b", 2, 0.5, 0.0);
    scene.step(0.1);

    assert_eq!(phases(&a_events), vec![Phase::Enter]);
    assert_eq!(phases(&b_events), vec![Phase::Enter]);
}

#[test]
fn test_all_layers_collides_with_everything() {
    let mut scene = scene_with_layers(&[]);
    let (_, a_events) = spawn_box(&mut scene, "a", 0, 0.0, 0.0);
    let (_, b_events) = spawn_box(&mut scene, "b", 7, 0.5, 0.0);
    scene.step(0.1);

    assert_eq!(phases(&a_events), vec![Phase::Enter]);
    assert_eq!(phases(&b_events), vec![Phase::Enter]);
}

#[test]
fn test_colliders_on_same_entity_never_collide() {
    let mut scene = scene_with_layers(&[(1, 1)]);
    let events: Events = Rc::default();
    scene
        .spawn("double")
        .attach(Transform::default())
        .attach(Collider::new(unit_box()).with_layer(1))
        .attach_at(1, Collider::new(unit_box()).with_layer(1))
        .attach(Recorder {
            events: Rc::clone(&events),
        });
    scene.step(0.1);

    assert!(events.borrow().is_empty());
    let manager = scene.singleton::<CollisionManager>().unwrap();
    assert_eq!(manager.colliders_on(1).len(), 2);
    assert!(manager.contacts().is_empty());
}

#[test]
fn test_disabled_collider_exits() {
    let mut scene = scene_with_layers(&[(1, 1)]);
    let (a, a_events) = spawn_box(&mut scene, "a", 1, 0.0, 0.0);
    let (_, b_events) = spawn_box(&mut scene, "b", 1, 0.5, 0.0);
    scene.step(0.1);
    assert_eq!(phases(&a_events), vec![Phase::Enter]);

    scene
        .world()
        .get_mut::<Collider>(a)
        .unwrap()
        .set_enabled(false);
    scene.step(0.1);

    assert_eq!(phases(&a_events), vec![Phase::Enter, Phase::Exit]);
    assert_eq!(phases(&b_events), vec![Phase::Enter, Phase::Exit]);
}

#[test]
fn test_contacts_reported_from_lower_entity() {
    let mut scene = scene_with_layers(&[(1, 1)]);
    let (a, _) = spawn_box(&mut scene, "a", 1, 0.0, 0.0);
    let (b, _) = spawn_box(&mut scene, "b", 1, 0.5, 0.0);
    scene.step(0.1);

    let manager = scene.singleton::<CollisionManager>().unwrap();
    assert_eq!(manager.contacts().len(), 1);
    assert_eq!(manager.contacts()[0].mine_entity(), a.min(b));
    assert_eq!(manager.handler_count(a), 1);
}

#[test]
fn test_destroyed_collider_is_unregistered() {
    let mut scene = scene_with_layers(&[(1, 1)]);
    let (a, _) = spawn_box(&mut scene, "a", 1, 0.0, 0.0);
    let (_, b_events) = spawn_box(&mut scene, "b", 1, 0.5, 0.0);
    scene.step(0.1);

    scene.stage_destroy(a);
    scene.step(0.1);

    let manager = scene.singleton::<CollisionManager>().unwrap();
    assert_eq!(manager.collider_count(), 1);
    assert_eq!(manager.handler_count(a), 0);
    // The survivor is told the contact ended
    assert_eq!(phases(&b_events), vec![Phase::Enter, Phase::Exit]);
}

#[test]
fn test_manager_attached_late_indexes_existing_colliders() {
    let mut scene = Scene::new(SceneConfig::default());
    let (_, a_events) = spawn_box(&mut scene, "a", 0, 0.0, 0.0);
    let (_, b_events) = spawn_box(&mut scene, "b", 0, 0.5, 0.0);
    scene.step(0.1);

    let singletons = scene.singletons();
    scene.commands(singletons).attach(CollisionManager::new());
    scene.step(0.1);

    assert_eq!(scene.singleton::<CollisionManager>().unwrap().collider_count(), 2);
    assert_eq!(phases(&a_events), vec![Phase::Enter]);
    assert_eq!(phases(&b_events), vec![Phase::Enter]);
}
