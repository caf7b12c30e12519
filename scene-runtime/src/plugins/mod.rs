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
//! Plugin system for scene setup
//!
//! Plugins stage singleton managers and initial entities while a scene is
//! being built, so the scene core never hard-codes which managers exist.
//!
//! # Registration
//!
//! ```
//! use scene_runtime::plugins::{CollisionPlugin, InputPlugin, PluginRegistry};
//! use scene_runtime::{Scene, SceneConfig};
//!
//! let registry = PluginRegistry::new()
//!     .with(InputPlugin)?
//!     .with(CollisionPlugin)?;
//!
//! let scene = Scene::with_plugins(SceneConfig::default(), registry)?;
//! assert!(scene.singleton::<scene_runtime::input::InputManager>().is_ok());
//! # Ok::<(), scene_runtime::PluginError>(())
//! ```
//!
//! # Dependency Management
//!
//! A plugin lists the names it depends on. The registry will:
//! - Verify all dependencies are registered
//! - Install plugins dependencies-first, ties broken by registration order
//! - Detect and reject circular dependencies
//!
//! # Version Compatibility
//!
//! Plugins declare the API version they target; the registry rejects
//! versions with a different major, or a different minor while the API is 0.x.

pub mod api;
pub mod builtin;
pub mod registry;

pub use api::{PluginInstaller, ScenePlugin, PLUGIN_API_VERSION};
pub use builtin::{default_plugins, CollisionPlugin, InputPlugin, RenderPlugin};
pub use registry::PluginRegistry;
