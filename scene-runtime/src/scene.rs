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
//! Scene driver
//!
//! A scene owns the world, the changelist, and the updater. Each call to
//! `update` is one frame:
//!
//! 1. Latch the pause request made during the previous frame
//! 2. Apply the changelist (the synchronization point)
//! 3. Enter or leave the paused state
//! 4. Run every active updatable in update order
//!
//! Structural changes staged from outside (through `spawn`, `commands`,
//! `stage_destroy`) or from inside callbacks become visible at step 2 of the
//! next frame.

use crate::config::SceneConfig;
use crate::ecs::context::SceneControl;
use crate::ecs::{
    Component, EntityChangelist, EntityCommands, EntityId, EntityUpdater, FrameTime, World,
};
use crate::error::{EcsError, PluginError};
use crate::input::{InputManager, Key, MouseButton};
use crate::math::Vec2;
use crate::plugins::{default_plugins, PluginInstaller, PluginRegistry};
use crate::render::{Canvas, RenderManager};
use log::info;
use std::cell::{Ref, RefMut};

/// Name given to the singleton container entity
pub const SINGLETONS_NAME: &str = "Singletons";

/// Frame-stepped owner of a world of entities
pub struct Scene {
    config: SceneConfig,
    world: World,
    changes: EntityChangelist,
    updater: EntityUpdater,
    control: SceneControl,
    time: FrameTime,
    frame_count: u64,
    singletons: EntityId,
    shut_down: bool,
}

impl Scene {
    /// Create a scene with only the singleton container entity
    ///
    /// The initial synchronization runs before returning, so the singleton
    /// entity is alive. No updatable runs until the first `update`.
    pub fn new(config: SceneConfig) -> Self {
        let mut scene = Scene::staged(config);
        scene.initial_sync();
        scene
    }

    /// Create a scene and install every plugin in `registry`
    ///
    /// # Errors
    ///
    /// Returns the first dependency or install failure. Nothing installed by
    /// earlier plugins has taken effect at that point.
    pub fn with_plugins(config: SceneConfig, registry: PluginRegistry) -> Result<Self, PluginError> {
        let mut scene = Scene::staged(config);
        let mut installer = PluginInstaller::new(
            &scene.world,
            &mut scene.changes,
            scene.singletons,
            &scene.config,
        );
        match registry.install_all(&mut installer) {
            Ok(installed) => info!(
                "Scene '{}' installed {} plugin(s): {:?}",
                scene.config.name,
                installed.len(),
                installed
            ),
            Err(err) => {
                // Staged components never began, so there is nothing to end
                scene.shut_down = true;
                return Err(err);
            }
        }
        scene.initial_sync();
        Ok(scene)
    }

    /// Create a scene with the input, collision, and render managers
    pub fn with_default_plugins(config: SceneConfig) -> Result<Self, PluginError> {
        Scene::with_plugins(config, default_plugins())
    }

    fn staged(config: SceneConfig) -> Self {
        let mut changes = EntityChangelist::new();
        let singletons = changes.stage_create(SINGLETONS_NAME);
        let control = SceneControl {
            should_pause: config.start_paused,
            is_paused: false,
        };
        Scene {
            config,
            world: World::new(),
            changes,
            updater: EntityUpdater::new(),
            control,
            time: FrameTime::default(),
            frame_count: 0,
            singletons,
            shut_down: false,
        }
    }

    fn initial_sync(&mut self) {
        let should_pause = self.control.should_pause;
        self.synchronize(should_pause);
        self.world.set_singletons(self.singletons);
        info!(
            "Scene '{}' created with {} entity(ies)",
            self.config.name,
            self.world.entity_count()
        );
    }

    fn synchronize(&mut self, should_pause: bool) {
        self.changes
            .apply(&mut self.world, &mut self.updater, &mut self.control, self.time);
        self.updater.set_paused(&self.world, should_pause);
        self.control.is_paused = self.updater.is_paused();
    }

    /// Advance one frame
    pub fn update(&mut self, frame: FrameTime) {
        let should_pause = self.control.should_pause;
        self.time = frame;
        self.synchronize(should_pause);
        self.updater
            .update(&self.world, &mut self.changes, &mut self.control, frame);
        self.frame_count += 1;
    }

    /// Advance one frame `delta` seconds after the last
    pub fn step(&mut self, delta: f32) {
        let frame = self.time.advance(delta);
        self.update(frame);
    }

    /// Draw through the `RenderManager` singleton
    ///
    /// Returns the number of drawables drawn, or `None` when the scene has no
    /// render manager.
    pub fn draw(&self, canvas: &mut dyn Canvas) -> Option<usize> {
        let mut renderer = self.world.try_get_mut::<RenderManager>(self.singletons)?;
        Some(renderer.draw(&self.world, canvas))
    }

    /// Hand the keys held this frame to the `InputManager` singleton
    ///
    /// They are latched at the start of the next update pass.
    pub fn submit_input(&self, held: impl IntoIterator<Item = Key>) -> Result<(), EcsError> {
        self.world.singleton_mut::<InputManager>()?.submit_frame(held);
        Ok(())
    }

    /// Hand the mouse buttons held this frame and the cursor position to the
    /// `InputManager` singleton
    pub fn submit_mouse(
        &self,
        held: impl IntoIterator<Item = MouseButton>,
        position: Vec2,
    ) -> Result<(), EcsError> {
        self.world
            .singleton_mut::<InputManager>()?
            .submit_mouse(held, position);
        Ok(())
    }

    /// Destroy every entity so each component's `end` runs exactly once
    ///
    /// Pending changes are applied first. Ordinary entities are destroyed
    /// before the singleton entity, so managers outlive the components they
    /// track. Calling this again does nothing.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        let should_pause = self.control.should_pause;
        self.synchronize(should_pause);

        let mut doomed: Vec<EntityId> = self
            .world
            .entities()
            .filter(|&entity| entity != self.singletons)
            .collect();
        if self.world.is_alive(self.singletons) {
            doomed.push(self.singletons);
        }
        let count = doomed.len();
        for entity in doomed {
            self.changes.stage_destroy(&self.world, entity);
        }
        self.synchronize(should_pause);

        self.shut_down = true;
        info!(
            "Scene '{}' shut down after {} frame(s), {} entity(ies) destroyed",
            self.config.name, self.frame_count, count
        );
    }

    /// Check whether `shutdown` has run
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// The population as of the last synchronization point
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The configuration this scene was built with
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// The update schedule
    pub fn updater(&self) -> &EntityUpdater {
        &self.updater
    }

    /// Pending structural changes
    pub fn changelist(&self) -> &EntityChangelist {
        &self.changes
    }

    /// The singleton container entity
    pub fn singletons(&self) -> EntityId {
        self.singletons
    }

    /// Borrow a singleton manager
    pub fn singleton<T: Component>(&self) -> Result<Ref<'_, T>, EcsError> {
        self.world.singleton::<T>()
    }

    /// Mutably borrow a singleton manager
    pub fn singleton_mut<T: Component>(&self) -> Result<RefMut<'_, T>, EcsError> {
        self.world.singleton_mut::<T>()
    }

    /// Stage a new entity
    pub fn stage_create(&mut self, name: impl Into<String>) -> EntityId {
        self.changes.stage_create(name)
    }

    /// Stage a new entity and return a builder for its components
    pub fn spawn(&mut self, name: impl Into<String>) -> EntityCommands<'_> {
        let entity = self.changes.stage_create(name);
        EntityCommands::new(&self.world, &mut self.changes, entity)
    }

    /// Builder for staging changes on an existing or pending entity
    pub fn commands(&mut self, entity: EntityId) -> EntityCommands<'_> {
        EntityCommands::new(&self.world, &mut self.changes, entity)
    }

    /// Stage destruction of `entity`
    ///
    /// # Panics
    ///
    /// Panics if `entity` is neither alive nor pending creation.
    pub fn stage_destroy(&mut self, entity: EntityId) {
        self.changes.stage_destroy(&self.world, entity);
    }

    /// Whether the updater is currently paused
    pub fn is_paused(&self) -> bool {
        self.control.is_paused
    }

    /// The pause request that the next update will act on
    pub fn should_pause(&self) -> bool {
        self.control.should_pause
    }

    /// Request pausing or unpausing at the next update
    pub fn set_should_pause(&mut self, should_pause: bool) {
        self.control.should_pause = should_pause;
    }

    /// Number of completed updates
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Frame time of the most recent update
    pub fn time(&self) -> FrameTime {
        self.time
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        self.shutdown();
    }
}
