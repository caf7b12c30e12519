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
//! Scene configuration
//!
//! Every field has a default, so a TOML file only needs the keys it changes:
//!
//! ```toml
//! name = "arena"
//! start_paused = false
//!
//! [collision]
//! collidable_layers = [[1, 2], [2, 2]]
//!
//! [render]
//! width = 1280
//! height = 720
//! ```

use crate::error::ConfigError;
use crate::physics::ALL_LAYERS;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Collision manager settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Unordered layer pairs whose colliders are tested against each other
    pub collidable_layers: Vec<(i32, i32)>,
}

/// Render target settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Logical width in pixels
    pub width: u32,
    /// Logical height in pixels
    pub height: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            width: 960,
            height: 540,
        }
    }
}

/// Configuration for a `Scene`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Scene name used in log output
    pub name: String,
    /// Request pause before the first update
    pub start_paused: bool,
    /// Collision manager settings
    pub collision: CollisionConfig,
    /// Render target settings
    pub render: RenderConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        SceneConfig {
            name: "scene".to_string(),
            start_paused: false,
            collision: CollisionConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scene name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Request pause before the first update
    pub fn with_start_paused(mut self, start_paused: bool) -> Self {
        self.start_paused = start_paused;
        self
    }

    /// Replace the collidable layer pairs
    pub fn with_collidable_layers(mut self, pairs: impl IntoIterator<Item = (i32, i32)>) -> Self {
        self.collision.collidable_layers = pairs.into_iter().collect();
        self
    }

    /// Set the logical render size
    pub fn with_render_size(mut self, width: u32, height: u32) -> Self {
        self.render = RenderConfig { width, height };
        self
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check constraints serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(&(a, b)) = self
            .collision
            .collidable_layers
            .iter()
            .find(|&&(a, b)| a == ALL_LAYERS || b == ALL_LAYERS)
        {
            return Err(ConfigError::Invalid(format!(
                "collidable layer pair ({}, {}) names ALL_LAYERS, which is always collidable",
                a, b
            )));
        }
        if self.render.width == 0 || self.render.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "render size must be positive, got {}x{}",
                self.render.width, self.render.height
            )));
        }
        Ok(())
    }
}
