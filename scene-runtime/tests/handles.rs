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
//! Entity and component handle tests

use scene_runtime::ecs::{
    Component, ComponentHandle, ComponentKey, EntityHandle, SceneContext, Transform, Updatable,
};
use scene_runtime::math::Vec2;
use scene_runtime::{EcsError, Scene, SceneConfig};
use std::cell::RefCell;
use std::rc::Rc;

/// Copies a target's position every frame through a cached handle
struct Follower {
    target: ComponentHandle<Transform>,
    seen: Rc<RefCell<Vec<Option<Vec2>>>>,
}

impl Component for Follower {
    fn as_updatable(&mut self) -> Option<&mut dyn Updatable> {
        Some(self)
    }
}

impl Updatable for Follower {
    fn update(&mut self, ctx: &mut SceneContext<'_>) {
        let position = self
            .target
            .maybe_deref(ctx.world())
            .map(|transform| transform.position);
        self.seen.borrow_mut().push(position);
    }
}

/// Tries to borrow itself through the world while running
struct SelfBorrower {
    result: Rc<RefCell<Option<EcsError>>>,
}

impl Component for SelfBorrower {
    fn as_updatable(&mut self) -> Option<&mut dyn Updatable> {
        Some(self)
    }
}

impl Updatable for SelfBorrower {
    fn update(&mut self, ctx: &mut SceneContext<'_>) {
        let err = ctx.world().get::<SelfBorrower>(ctx.entity()).err();
        *self.result.borrow_mut() = err;
    }
}

fn transform_handle(scene: &Scene, entity: scene_runtime::EntityId) -> ComponentHandle<Transform> {
    let target = scene
        .world()
        .component_ref(entity, &ComponentKey::of::<Transform>())
        .unwrap();
    ComponentHandle::new(target)
}

#[test]
fn test_entity_handle_follows_liveness() {
    let mut scene = Scene::new(SceneConfig::default());
    let entity = scene.spawn("e").id();
    let handle = EntityHandle::from(entity);

    assert!(!handle.is_alive(scene.world()));
    assert!(handle.maybe_deref(scene.world()).is_none());

    scene.step(0.1);
    assert!(handle.is_alive(scene.world()));
    assert_eq!(handle.deref(scene.world()).unwrap().name(), "e");

    scene.stage_destroy(entity);
    scene.step(0.1);
    assert_eq!(
        handle.deref(scene.world()).unwrap_err(),
        EcsError::EntityNotAlive { entity }
    );
}

#[test]
fn test_component_handle_reads_through() {
    let mut scene = Scene::new(SceneConfig::default());
    let target = scene
        .spawn("target")
        .attach(Transform::at(Vec2::new(4.0, 2.0)))
        .id();
    scene.step(0.1);

    let handle = transform_handle(&scene, target);
    assert_eq!(handle.entity(), target);
    assert!(handle.is_attached(scene.world()));
    assert_eq!(handle.deref(scene.world()).unwrap().position, Vec2::new(4.0, 2.0));

    handle.deref_mut(scene.world()).unwrap().position.x = 9.0;
    assert_eq!(scene.world().get::<Transform>(target).unwrap().position.x, 9.0);
}

#[test]
fn test_handle_goes_stale_when_component_replaced() {
    let mut scene = Scene::new(SceneConfig::default());
    let target = scene.spawn("target").attach(Transform::default()).id();
    scene.step(0.1);
    let old = transform_handle(&scene, target);

    scene.commands(target).detach::<Transform>();
    scene.step(0.1);
    scene.commands(target).attach(Transform::at(Vec2::new(1.0, 1.0)));
    scene.step(0.1);

    assert!(scene.world().has::<Transform>(target));
    assert!(!old.is_attached(scene.world()));
    assert_eq!(
        old.deref(scene.world()).unwrap_err(),
        EcsError::ComponentDetached {
            entity: target,
            key: ComponentKey::of::<Transform>(),
        }
    );
    assert!(transform_handle(&scene, target).is_attached(scene.world()));
}

#[test]
fn test_cached_handle_inside_component() {
    let mut scene = Scene::new(SceneConfig::default());
    let target = scene
        .spawn("target")
        .attach(Transform::at(Vec2::new(1.0, 2.0)))
        .id();
    scene.step(0.1);

    let seen = Rc::new(RefCell::new(Vec::new()));
    let target_handle = transform_handle(&scene, target);
    scene.spawn("follower").attach(Follower {
        target: target_handle,
        seen: Rc::clone(&seen),
    });
    scene.step(0.1);

    scene.stage_destroy(target);
    scene.step(0.1);

    assert_eq!(*seen.borrow(), vec![Some(Vec2::new(1.0, 2.0)), None]);
}

#[test]
fn test_running_component_is_busy() {
    let mut scene = Scene::new(SceneConfig::default());
    let result = Rc::new(RefCell::new(None));
    let entity = scene
        .spawn("self")
        .attach(SelfBorrower {
            result: Rc::clone(&result),
        })
        .id();
    scene.step(0.1);

    assert_eq!(
        *result.borrow(),
        Some(EcsError::ComponentBusy {
            entity,
            key: ComponentKey::of::<SelfBorrower>(),
        })
    );
}

#[test]
#[should_panic(expected = "is not a")]
fn test_handle_type_mismatch_panics() {
    let mut scene = Scene::new(SceneConfig::default());
    let target = scene.spawn("target").attach(Transform::default()).id();
    scene.step(0.1);

    let target = scene
        .world()
        .component_ref(target, &ComponentKey::of::<Transform>())
        .unwrap();
    let _ = ComponentHandle::<scene_runtime::ecs::Velocity>::new(target);
}
