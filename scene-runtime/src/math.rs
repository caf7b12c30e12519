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
//! 2D math primitives
//!
//! Vectors come from `nalgebra`; `RectF` is an axis-aligned rectangle in
//! screen-style coordinates (y grows downward, `top < bottom`).

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Axis-aligned rectangle with float coordinates
///
/// # Examples
///
/// ```
/// use scene_runtime::math::RectF;
///
/// let a = RectF::new(0.0, 0.0, 10.0, 10.0);
/// let b = RectF::new(5.0, 2.0, 10.0, 4.0);
/// let overlap = a.overlap(&b).unwrap();
/// assert_eq!(overlap, RectF::new(5.0, 2.0, 5.0, 4.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectF {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl RectF {
    /// Create a rectangle from its top-left corner and size
    ///
    /// # Panics
    ///
    /// Panics if either dimension is negative.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        assert!(
            width >= 0.0 && height >= 0.0,
            "Rectangle size must be non-negative"
        );
        RectF { x, y, width, height }
    }

    /// Create a rectangle from location and size vectors
    pub fn from_vectors(location: Vec2, size: Vec2) -> Self {
        RectF::new(location.x, location.y, size.x, size.y)
    }

    /// Create a rectangle of the given size centered on `center`
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        RectF::from_vectors(center - size / 2.0, size)
    }

    /// Top-left corner
    pub fn location(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Width and height
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Geometric center
    pub fn center(&self) -> Vec2 {
        self.location() + self.size() / 2.0
    }

    /// Get the width
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Get the height
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Left edge
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Right edge
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Bottom edge
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Same size, moved so its center is `center`
    pub fn with_center(&self, center: Vec2) -> Self {
        RectF::centered(center, self.size())
    }

    /// Same size, moved by `displacement`
    pub fn translate(&self, displacement: Vec2) -> Self {
        RectF::from_vectors(self.location() + displacement, self.size())
    }

    /// Size multiplied component-wise, top-left corner fixed
    pub fn scale(&self, scale: Vec2) -> Self {
        RectF::from_vectors(self.location(), self.size().component_mul(&scale))
    }

    /// Size multiplied component-wise, center fixed
    pub fn scale_from_center(&self, scale: Vec2) -> Self {
        self.scale(scale).with_center(self.center())
    }

    /// Check for a non-empty intersection
    ///
    /// Touching edges do not count as overlap.
    pub fn overlaps(&self, other: &RectF) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// The intersection rectangle, if the two overlap
    pub fn overlap(&self, other: &RectF) -> Option<RectF> {
        if !self.overlaps(other) {
            return None;
        }

        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Some(RectF::new(left, top, right - left, bottom - top))
    }
}

impl Default for RectF {
    fn default() -> Self {
        RectF::new(0.0, 0.0, 0.0, 0.0)
    }
}
