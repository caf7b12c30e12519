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
//! Built-in manager plugins
//!
//! Each plugin attaches one singleton manager, configured from the scene's
//! `SceneConfig`.

use crate::error::PluginError;
use crate::input::InputManager;
use crate::physics::{CollisionManager, ALL_LAYERS};
use crate::plugins::api::{PluginInstaller, ScenePlugin};
use crate::plugins::registry::PluginRegistry;
use crate::render::RenderManager;
use log::debug;

/// Attaches an `InputManager`
#[derive(Debug, Default, Clone, Copy)]
pub struct InputPlugin;

impl ScenePlugin for InputPlugin {
    fn name(&self) -> &str {
        "input"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn install(&self, installer: &mut PluginInstaller<'_>) -> Result<(), PluginError> {
        ensure_absent::<InputManager>(self, installer)?;
        installer.attach_singleton(InputManager::new());
        Ok(())
    }
}

/// Attaches a `CollisionManager` with the configured collidable layers
#[derive(Debug, Default, Clone, Copy)]
pub struct CollisionPlugin;

impl ScenePlugin for CollisionPlugin {
    fn name(&self) -> &str {
        "collision"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn install(&self, installer: &mut PluginInstaller<'_>) -> Result<(), PluginError> {
        ensure_absent::<CollisionManager>(self, installer)?;
        let pairs = installer.config().collision.collidable_layers.clone();
        if let Some(&(a, b)) = pairs.iter().find(|&&(a, b)| a == ALL_LAYERS || b == ALL_LAYERS) {
            return Err(PluginError::Install {
                name: self.name().to_string(),
                reason: format!("layer pair ({}, {}) names ALL_LAYERS", a, b),
            });
        }
        debug!("Collidable layer pairs: {:?}", pairs);
        installer.attach_singleton(CollisionManager::with_collidable_layers(pairs));
        Ok(())
    }
}

/// Attaches a `RenderManager` sized from the render configuration
#[derive(Debug, Default, Clone, Copy)]
pub struct RenderPlugin;

impl ScenePlugin for RenderPlugin {
    fn name(&self) -> &str {
        "render"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn install(&self, installer: &mut PluginInstaller<'_>) -> Result<(), PluginError> {
        ensure_absent::<RenderManager>(self, installer)?;
        let render = installer.config().render;
        installer.attach_singleton(RenderManager::new(render.width, render.height));
        Ok(())
    }
}

/// Registry holding the input, collision, and render plugins
pub fn default_plugins() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    let builtins: [Box<dyn ScenePlugin>; 3] =
        [Box::new(InputPlugin), Box::new(CollisionPlugin), Box::new(RenderPlugin)];
    for plugin in builtins {
        // Built-in names are distinct and versions come from Cargo
        if let Err(err) = registry.register(plugin) {
            unreachable!("built-in plugin rejected: {}", err);
        }
    }
    registry
}

fn ensure_absent<T: crate::ecs::Component>(
    plugin: &dyn ScenePlugin,
    installer: &PluginInstaller<'_>,
) -> Result<(), PluginError> {
    if installer.has_singleton::<T>() {
        return Err(PluginError::Install {
            name: plugin.name().to_string(),
            reason: format!("a {} singleton is already staged", std::any::type_name::<T>()),
        });
    }
    Ok(())
}
