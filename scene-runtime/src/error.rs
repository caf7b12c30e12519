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
//! Error types
//!
//! Only expected-absence conditions are errors. Contract violations such as
//! attaching over an occupied slot are panics at the call site.

use crate::ecs::{ComponentKey, EntityId};
use thiserror::Error;

/// Errors from entity and component lookups
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The entity is not (or no longer) part of the scene
    #[error("{entity} is no longer alive")]
    EntityNotAlive {
        /// The entity that was looked up
        entity: EntityId,
    },

    /// The entity has no component at the requested key
    #[error("{entity} does not have a component of type {key}")]
    MissingComponent {
        /// The entity that was searched
        entity: EntityId,
        /// The requested (type, slot) key
        key: ComponentKey,
    },

    /// The component is mutably borrowed, usually because it is the one
    /// currently running
    #[error("component {key} on {entity} is already borrowed")]
    ComponentBusy {
        /// Owning entity
        entity: EntityId,
        /// The busy component's key
        key: ComponentKey,
    },

    /// A cached component reference no longer points at an attached component
    #[error("component {key} is no longer attached to {entity}")]
    ComponentDetached {
        /// Entity the component used to belong to
        entity: EntityId,
        /// The stale key
        key: ComponentKey,
    },

    /// The world has no singleton container entity
    #[error("scene has no singleton entity")]
    NoSingletons,
}

/// Errors from loading or validating a scene configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration text is not valid TOML for `SceneConfig`
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration parsed but violates a constraint
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors from registering or installing scene plugins
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PluginError {
    /// A plugin with this name is already registered
    #[error("plugin '{0}' is already registered")]
    AlreadyRegistered(String),

    /// The plugin targets an incompatible plugin API
    #[error("plugin '{name}' API version {plugin_api} is incompatible with runtime API version {runtime_api}")]
    IncompatibleApi {
        /// Plugin name
        name: String,
        /// API version the plugin was built against
        plugin_api: String,
        /// API version of this runtime
        runtime_api: String,
    },

    /// The plugin reports a version string that is not semver
    #[error("plugin '{name}' has invalid version '{version}'")]
    InvalidVersion {
        /// Plugin name
        name: String,
        /// The unparseable version string
        version: String,
    },

    /// A declared dependency was never registered
    #[error("plugin '{plugin}' depends on '{dependency}' which is not registered")]
    MissingDependency {
        /// The dependent plugin
        plugin: String,
        /// The missing dependency
        dependency: String,
    },

    /// The dependency graph contains a cycle
    #[error("circular dependency detected among plugins: {0:?}")]
    CircularDependency(Vec<String>),

    /// A plugin's install step failed
    #[error("failed to install plugin '{name}': {reason}")]
    Install {
        /// Plugin name
        name: String,
        /// Why the install failed
        reason: String,
    },
}
