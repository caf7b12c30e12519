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
//! # Scene Runtime
//!
//! A frame-stepped entity/component runtime for 2D scenes.
//!
//! ## Features
//!
//! - **Deferred Mutation**: Entity creation, destruction, and component
//!   attachment are staged and applied together at one synchronization point
//!   per frame
//! - **Ordered Updates**: Updatable components run in a stable order with
//!   per-component pause opt-out
//! - **Contact Events**: Layered AABB overlap detection with enter, stay, and
//!   exit callbacks
//! - **Extensibility**: Plugins install the singleton managers a scene needs
//!
//! ## Example
//!
//! ```rust
//! use scene_runtime::ecs::{Transform, Velocity};
//! use scene_runtime::math::Vec2;
//! use scene_runtime::{Scene, SceneConfig};
//!
//! let mut scene = Scene::with_default_plugins(SceneConfig::default()).unwrap();
//! let ball = scene
//!     .spawn("ball")
//!     .attach(Transform::at(Vec2::new(0.0, 0.0)))
//!     .attach(Velocity::new(Vec2::new(2.0, 0.0)))
//!     .id();
//!
//! scene.step(0.5);
//! assert_eq!(scene.world().get::<Transform>(ball).unwrap().position.x, 1.0);
//! ```

#![warn(missing_docs)]

/// Configuration loading and validation
pub mod config;

/// Entity/component model, deferred changes, and update scheduling
pub mod ecs;

/// Error types
pub mod error;

/// Dense set with O(1) membership and removal
pub mod indexed_set;

/// Keyboard and mouse state
pub mod input;

/// Geometry primitives
pub mod math;

/// Contact detection
pub mod physics;

/// Plugin system for scene setup
pub mod plugins;

/// Drawing surface
pub mod render;

/// Scene driver
pub mod scene;

pub use config::SceneConfig;
pub use ecs::{EntityId, World};
pub use error::{ConfigError, EcsError, PluginError};
pub use indexed_set::IndexedSet;
pub use scene::Scene;
