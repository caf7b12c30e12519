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
//! Plugin registry
//!
//! Handles:
//! - Registration with duplicate and version checks
//! - Dependency resolution with missing and circular dependency detection
//! - Installation in a deterministic dependency order

use crate::error::PluginError;
use crate::plugins::api::{PluginInstaller, ScenePlugin, PLUGIN_API_VERSION};
use log::info;
use semver::Version;
use std::collections::{BTreeSet, HashMap};

/// Ordered collection of scene plugins
///
/// Plugins are installed dependencies-first. Among plugins whose dependencies
/// are all satisfied, the one registered earliest goes first, so the same
/// registry always installs in the same order.
pub struct PluginRegistry {
    plugins: Vec<Box<dyn ScenePlugin>>,
    by_name: HashMap<String, usize>,
}

impl PluginRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        PluginRegistry {
            plugins: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Register a plugin
    ///
    /// # Errors
    ///
    /// - A plugin with the same name is already registered
    /// - The plugin's own version is not semver
    /// - The plugin API version is incompatible with `PLUGIN_API_VERSION`
    pub fn register(&mut self, plugin: Box<dyn ScenePlugin>) -> Result<(), PluginError> {
        let name = plugin.name().to_string();

        if self.by_name.contains_key(&name) {
            return Err(PluginError::AlreadyRegistered(name));
        }

        if Version::parse(plugin.version()).is_err() {
            return Err(PluginError::InvalidVersion {
                name,
                version: plugin.version().to_string(),
            });
        }

        let plugin_api = plugin.api_version();
        if !is_version_compatible(plugin_api, PLUGIN_API_VERSION) {
            return Err(PluginError::IncompatibleApi {
                name,
                plugin_api: plugin_api.to_string(),
                runtime_api: PLUGIN_API_VERSION.to_string(),
            });
        }

        self.by_name.insert(name, self.plugins.len());
        self.plugins.push(plugin);
        Ok(())
    }

    /// Builder-style `register`
    pub fn with(mut self, plugin: impl ScenePlugin + 'static) -> Result<Self, PluginError> {
        self.register(Box::new(plugin))?;
        Ok(self)
    }

    /// Look up a plugin by name
    pub fn get(&self, name: &str) -> Option<&dyn ScenePlugin> {
        self.by_name.get(name).map(|&index| self.plugins[index].as_ref())
    }

    /// Number of registered plugins
    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    /// Check if no plugins are registered
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Names in the order `install_all` would install them
    ///
    /// # Errors
    ///
    /// - A declared dependency is not registered
    /// - The dependency graph contains a cycle
    pub fn load_order(&self) -> Result<Vec<String>, PluginError> {
        Ok(self
            .resolve()?
            .into_iter()
            .map(|index| self.plugins[index].name().to_string())
            .collect())
    }

    /// Install every plugin in dependency order
    ///
    /// Stops at the first failing plugin. Returns the installed names.
    pub fn install_all(
        &self,
        installer: &mut PluginInstaller<'_>,
    ) -> Result<Vec<String>, PluginError> {
        let order = self.resolve()?;
        let mut installed = Vec::with_capacity(order.len());
        for index in order {
            let plugin = &self.plugins[index];
            info!("Installing plugin '{}' v{}", plugin.name(), plugin.version());
            plugin.install(installer)?;
            installed.push(plugin.name().to_string());
        }
        Ok(installed)
    }

    /// Kahn's algorithm over registration indices
    fn resolve(&self) -> Result<Vec<usize>, PluginError> {
        let count = self.plugins.len();
        let mut in_degree = vec![0usize; count];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); count];

        for (index, plugin) in self.plugins.iter().enumerate() {
            for dependency in plugin.dependencies() {
                let Some(&dep_index) = self.by_name.get(dependency) else {
                    return Err(PluginError::MissingDependency {
                        plugin: plugin.name().to_string(),
                        dependency: dependency.to_string(),
                    });
                };
                dependents[dep_index].push(index);
                in_degree[index] += 1;
            }
        }

        let mut ready: BTreeSet<usize> = (0..count).filter(|&i| in_degree[i] == 0).collect();
        let mut sorted = Vec::with_capacity(count);

        while let Some(index) = ready.pop_first() {
            sorted.push(index);
            for &dependent in &dependents[index] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if sorted.len() != count {
            let cycle = (0..count)
                .filter(|&i| in_degree[i] > 0)
                .map(|i| self.plugins[i].name().to_string())
                .collect();
            return Err(PluginError::CircularDependency(cycle));
        }

        Ok(sorted)
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if a plugin API version is compatible with the runtime
///
/// Uses semantic versioning rules:
/// - Major version must match
/// - For major version 0.x.y, minor versions must match (breaking changes)
/// - For major version >= 1, the plugin's minor must not exceed the runtime's
/// - Patch version is ignored
fn is_version_compatible(plugin_version: &str, runtime_version: &str) -> bool {
    let (Ok(plugin), Ok(runtime)) = (
        Version::parse(plugin_version),
        Version::parse(runtime_version),
    ) else {
        return false;
    };

    if plugin.major != runtime.major {
        return false;
    }

    if plugin.major != 0 {
        plugin.minor <= runtime.minor
    } else {
        plugin.minor == runtime.minor
    }
}
