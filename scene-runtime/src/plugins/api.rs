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
//! Plugin API traits and installer
//!
//! A plugin runs once, while the scene is being constructed, and stages the
//! singleton managers and entities it contributes. Everything it stages takes
//! effect at the scene's initial synchronization point.
//!
//! # Contracts
//!
//! Plugins must:
//! - Use a name that is unique within a registry
//! - Not create circular dependencies with other plugins
//! - Attach at most one component of each type to the singleton entity

use crate::config::SceneConfig;
use crate::ecs::{
    Component, ComponentKey, ComponentRef, EntityChangelist, EntityCommands, EntityId, World,
};
use crate::error::PluginError;

/// Version of the plugin API
///
/// Format: MAJOR.MINOR.PATCH following semantic versioning.
pub const PLUGIN_API_VERSION: &str = "0.1.0";

/// Scoped staging access handed to `ScenePlugin::install`
///
/// The installer can only stage. The world it exposes is the population before
/// the initial synchronization, so the singleton entity is still pending.
pub struct PluginInstaller<'a> {
    world: &'a World,
    changes: &'a mut EntityChangelist,
    singletons: EntityId,
    config: &'a SceneConfig,
}

impl<'a> PluginInstaller<'a> {
    /// Create an installer; only the scene builds these
    pub(crate) fn new(
        world: &'a World,
        changes: &'a mut EntityChangelist,
        singletons: EntityId,
        config: &'a SceneConfig,
    ) -> Self {
        PluginInstaller {
            world,
            changes,
            singletons,
            config,
        }
    }

    /// Configuration the scene is being built with
    pub fn config(&self) -> &SceneConfig {
        self.config
    }

    /// The singleton container entity
    pub fn singletons(&self) -> EntityId {
        self.singletons
    }

    /// Check whether a singleton of type `T` has already been staged
    pub fn has_singleton<T: Component>(&self) -> bool {
        self.world.has::<T>(self.singletons)
            || self
                .changes
                .is_pending_attach(self.singletons, &ComponentKey::of::<T>())
    }

    /// Stage a manager component on the singleton entity
    pub fn attach_singleton<T: Component>(&mut self, component: T) -> ComponentRef {
        self.changes.stage_attach(
            self.world,
            self.singletons,
            ComponentKey::of::<T>(),
            Box::new(component),
        )
    }

    /// Stage a new entity and return a builder for its components
    pub fn spawn(&mut self, name: impl Into<String>) -> EntityCommands<'_> {
        let entity = self.changes.stage_create(name);
        EntityCommands::new(self.world, self.changes, entity)
    }
}

/// A unit of scene setup
///
/// Built-in managers are installed through this trait, and applications can
/// contribute their own the same way.
///
/// ```
/// use scene_runtime::plugins::{PluginInstaller, ScenePlugin};
/// use scene_runtime::PluginError;
/// use scene_runtime::ecs::Transform;
///
/// struct Arena;
///
/// impl ScenePlugin for Arena {
///     fn name(&self) -> &str { "arena" }
///     fn version(&self) -> &str { "1.0.0" }
///
///     fn install(&self, installer: &mut PluginInstaller<'_>) -> Result<(), PluginError> {
///         installer.spawn("floor").attach(Transform::default());
///         Ok(())
///     }
/// }
/// ```
pub trait ScenePlugin {
    /// Unique name within a registry
    fn name(&self) -> &str;

    /// Plugin version, MAJOR.MINOR.PATCH
    fn version(&self) -> &str;

    /// Plugin API version this plugin was built against
    fn api_version(&self) -> &str {
        PLUGIN_API_VERSION
    }

    /// Names of plugins that must be installed first
    fn dependencies(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Stage this plugin's contribution to the scene
    fn install(&self, installer: &mut PluginInstaller<'_>) -> Result<(), PluginError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Transform;

    struct Marker;

    impl ScenePlugin for Marker {
        fn name(&self) -> &str {
            "marker"
        }

        fn version(&self) -> &str {
            "1.0.0"
        }

        fn install(&self, installer: &mut PluginInstaller<'_>) -> Result<(), PluginError> {
            if installer.has_singleton::<Transform>() {
                return Err(PluginError::Install {
                    name: self.name().to_string(),
                    reason: "already installed".to_string(),
                });
            }
            installer.attach_singleton(Transform::default());
            Ok(())
        }
    }

    #[test]
    fn test_plugin_api_version() {
        assert_eq!(PLUGIN_API_VERSION, "0.1.0");
        assert_eq!(Marker.api_version(), PLUGIN_API_VERSION);
        assert!(Marker.dependencies().is_empty());
    }

    #[test]
    fn test_installer_stages_on_pending_singletons() {
        let world = World::new();
        let mut changes = EntityChangelist::new();
        let singletons = changes.stage_create("Singletons");
        let config = SceneConfig::default();

        let mut installer = PluginInstaller::new(&world, &mut changes, singletons, &config);
        assert_eq!(installer.singletons(), singletons);
        assert_eq!(installer.config().name, "scene");

        Marker.install(&mut installer).unwrap();
        let err = Marker.install(&mut installer).unwrap_err();
        assert!(matches!(err, PluginError::Install { .. }));
    }

    #[test]
    fn test_installer_spawn() {
        let world = World::new();
        let mut changes = EntityChangelist::new();
        let singletons = changes.stage_create("Singletons");
        let config = SceneConfig::default();

        let mut installer = PluginInstaller::new(&world, &mut changes, singletons, &config);
        let floor = installer.spawn("floor").attach(Transform::default()).id();

        assert_ne!(floor, singletons);
        assert!(changes.is_pending_create(floor));
    }
}
