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
//! Built-in spatial components
//!
//! `Transform` places an entity in the 2D scene; `Velocity` moves it every
//! frame, just before collision detection runs.

use crate::ecs::updater::{order, Updatable};
use crate::ecs::{Component, SceneContext};
use crate::math::Vec2;
use log::warn;

/// 2D position and scale of an entity
///
/// # Examples
///
/// ```
/// use scene_runtime::ecs::Transform;
/// use scene_runtime::math::Vec2;
///
/// let transform = Transform::at(Vec2::new(3.0, 4.0));
/// assert_eq!(transform.scale, Vec2::new(1.0, 1.0));
/// assert!(transform.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// World-space position
    pub position: Vec2,
    /// Per-axis scale
    pub scale: Vec2,
}

impl Transform {
    /// Create a transform with the given position and scale
    pub fn new(position: Vec2, scale: Vec2) -> Self {
        Transform { position, scale }
    }

    /// Create an unscaled transform at `position`
    pub fn at(position: Vec2) -> Self {
        Transform::new(position, Vec2::new(1.0, 1.0))
    }

    /// Unscaled transform at the origin
    pub fn identity() -> Self {
        Transform::at(Vec2::zeros())
    }

    /// Builder-style scale override
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Check if every field is finite and the scale is non-negative
    pub fn is_valid(&self) -> bool {
        self.position.iter().all(|v| v.is_finite())
            && self.scale.iter().all(|v| v.is_finite() && *v >= 0.0)
    }
}

impl Component for Transform {}

impl Default for Transform {
    fn default() -> Self {
        Transform::identity()
    }
}

/// Constant linear velocity in units per second
///
/// Integrates its entity's `Transform` each frame at `order::MOVEMENT`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Velocity {
    /// Units per second
    pub linear: Vec2,
}

impl Velocity {
    /// Create a new velocity
    pub fn new(linear: Vec2) -> Self {
        Velocity { linear }
    }

    /// Velocity of zero
    pub fn zero() -> Self {
        Velocity::new(Vec2::zeros())
    }

    /// Speed in units per second
    pub fn speed(&self) -> f32 {
        self.linear.norm()
    }
}

impl Component for Velocity {
    fn as_updatable(&mut self) -> Option<&mut dyn Updatable> {
        Some(self)
    }
}

impl Updatable for Velocity {
    fn update_order(&self) -> i32 {
        order::MOVEMENT
    }

    fn update(&mut self, ctx: &mut SceneContext<'_>) {
        match ctx.sibling_mut::<Transform>() {
            Ok(mut transform) => transform.position += self.linear * ctx.delta_time(),
            Err(err) => warn!("Velocity cannot move {}: {}", ctx.entity(), err),
        }
    }
}

impl Default for Velocity {
    fn default() -> Self {
        Velocity::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_defaults() {
        let transform = Transform::default();
        assert_eq!(transform.position, Vec2::zeros());
        assert_eq!(transform.scale, Vec2::new(1.0, 1.0));
        assert!(transform.is_valid());
    }

    #[test]
    fn test_transform_validity() {
        assert!(!Transform::at(Vec2::new(f32::NAN, 0.0)).is_valid());
        assert!(!Transform::identity().with_scale(Vec2::new(-1.0, 1.0)).is_valid());
    }

    #[test]
    fn test_velocity_order_precedes_collision() {
        let velocity = Velocity::new(Vec2::new(3.0, 4.0));
        assert_eq!(velocity.speed(), 5.0);
        assert!(velocity.update_order() < order::COLLISION);
        assert_eq!(Velocity::default(), Velocity::zero());
    }
}
