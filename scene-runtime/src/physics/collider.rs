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
//! Axis-aligned rectangle collider

use crate::ecs::{Component, Transform};
use crate::math::RectF;

/// Layer that collides with every other layer
pub const ALL_LAYERS: i32 = 0;

/// AABB collider relative to its entity's transform
///
/// Pairs of colliders on the same entity never collide.
///
/// # Examples
///
/// ```
/// use scene_runtime::ecs::Transform;
/// use scene_runtime::math::{RectF, Vec2};
/// use scene_runtime::physics::Collider;
///
/// let collider = Collider::new(RectF::centered(Vec2::zeros(), Vec2::new(2.0, 2.0))).with_layer(3);
/// let rect = collider.world_rect(&Transform::at(Vec2::new(10.0, 5.0)));
/// assert_eq!(rect.center(), Vec2::new(10.0, 5.0));
/// assert_eq!(collider.layer(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    rect: RectF,
    layer: i32,
    enabled: bool,
}

impl Collider {
    /// Create an enabled collider on `ALL_LAYERS`
    ///
    /// The rectangle's center is the offset from the entity's position at
    /// scale 1.
    pub fn new(rect: RectF) -> Self {
        Collider {
            rect,
            layer: ALL_LAYERS,
            enabled: true,
        }
    }

    /// Builder-style layer assignment; the layer is fixed once attached
    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    /// Base rectangle
    pub fn rect(&self) -> RectF {
        self.rect
    }

    /// Collision layer
    pub fn layer(&self) -> i32 {
        self.layer
    }

    /// Whether collision checks consider this collider
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable collision checks for this collider
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// World-space rectangle under `transform`
    pub fn world_rect(&self, transform: &Transform) -> RectF {
        self.rect
            .scale_from_center(transform.scale)
            .with_center(self.rect.center().component_mul(&transform.scale))
            .translate(transform.position)
    }

    /// Overlap between the world rectangles of two colliders
    pub fn overlap(
        &self,
        transform: &Transform,
        other: &Collider,
        other_transform: &Transform,
    ) -> Option<RectF> {
        self.world_rect(transform)
            .overlap(&other.world_rect(other_transform))
    }
}

impl Component for Collider {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;

    #[test]
    fn test_world_rect_translates() {
        let collider = Collider::new(RectF::new(0.0, 0.0, 4.0, 2.0));
        let rect = collider.world_rect(&Transform::at(Vec2::new(1.0, 1.0)));
        assert_eq!(rect, RectF::new(1.0, 1.0, 4.0, 2.0));
    }

    #[test]
    fn test_world_rect_scales_offset() {
        // Offset center (2, 1) doubles along x with the scale
        let collider = Collider::new(RectF::new(0.0, 0.0, 4.0, 2.0));
        let transform = Transform::identity().with_scale(Vec2::new(2.0, 1.0));
        let rect = collider.world_rect(&transform);

        assert_eq!(rect.size(), Vec2::new(8.0, 2.0));
        assert_eq!(rect.center(), Vec2::new(4.0, 1.0));
    }

    #[test]
    fn test_overlap_and_enable() {
        let mut a = Collider::new(RectF::new(0.0, 0.0, 2.0, 2.0));
        let b = Collider::new(RectF::new(1.0, 0.0, 2.0, 2.0));
        let t = Transform::identity();
        assert_eq!(a.overlap(&t, &b, &t), Some(RectF::new(1.0, 0.0, 1.0, 2.0)));

        assert!(a.is_enabled());
        a.set_enabled(false);
        assert!(!a.is_enabled());
        assert_eq!(a.layer(), ALL_LAYERS);
    }
}
