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
//! Rendering collaborator surface
//!
//! Pixels are out of scope. Components that want to be drawn expose the
//! `Drawable` capability; the `RenderManager` singleton orders them and
//! hands each a `Canvas` supplied by the embedding application.

pub mod collider_renderer;
pub mod manager;

pub use collider_renderer::ColliderRenderer;
pub use manager::RenderManager;

use crate::ecs::{Component, ComponentRef, EntityId, World};
use crate::error::EcsError;
use crate::math::{RectF, Vec2};
use std::cell::Ref;

/// RGBA color with float channels in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel
    pub r: f32,
    /// Green channel
    pub g: f32,
    /// Blue channel
    pub b: f32,
    /// Alpha channel
    pub a: f32,
}

impl Color {
    /// Opaque white
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    /// Opaque orange, used for collider outlines
    pub const ORANGE: Color = Color::rgb(1.0, 0.647, 0.0);
    /// Default clear color
    pub const CORNFLOWER_BLUE: Color = Color::rgb(0.392, 0.584, 0.929);

    /// Opaque color from red, green, and blue
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Color { r, g, b, a: 1.0 }
    }
}

/// Drawing target provided by the embedding application
pub trait Canvas {
    /// Fill the whole target
    fn clear(&mut self, color: Color);

    /// Fill an axis-aligned rectangle
    fn fill_rect(&mut self, rect: RectF, color: Color);

    /// Outline an axis-aligned rectangle with one-unit edges
    fn stroke_rect(&mut self, rect: RectF, color: Color) {
        let (w, h) = (rect.width(), rect.height());
        self.fill_rect(RectF::new(rect.left(), rect.top(), w, 1.0), color);
        self.fill_rect(RectF::new(rect.left(), rect.top(), 1.0, h), color);
        self.fill_rect(RectF::new(rect.left(), rect.bottom(), w, 1.0), color);
        self.fill_rect(RectF::new(rect.right(), rect.top(), 1.0, h), color);
    }
}

/// Read-only scene access during drawing
pub struct DrawContext<'a> {
    world: &'a World,
    current: ComponentRef,
    render_size: Vec2,
}

impl<'a> DrawContext<'a> {
    pub(crate) fn new(world: &'a World, current: ComponentRef, render_size: Vec2) -> Self {
        DrawContext {
            world,
            current,
            render_size,
        }
    }

    /// The drawable being called
    pub fn this(&self) -> ComponentRef {
        self.current
    }

    /// The entity owning the drawable
    pub fn entity(&self) -> EntityId {
        self.current.entity
    }

    /// The population as of the last synchronization point
    pub fn world(&self) -> &'a World {
        self.world
    }

    /// Logical render target size
    pub fn render_size(&self) -> Vec2 {
        self.render_size
    }

    /// Borrow a singleton manager
    pub fn singleton<T: Component>(&self) -> Result<Ref<'a, T>, EcsError> {
        self.world.singleton::<T>()
    }
}

/// Capability for being drawn each frame
pub trait Drawable {
    /// Higher orders are drawn on top; must stay constant for the component's lifetime
    fn draw_order(&self) -> i32 {
        0
    }

    /// When false, `draw` is skipped
    fn is_visible(&self) -> bool {
        true
    }

    /// Draw onto `canvas`
    fn draw(&mut self, ctx: &DrawContext<'_>, canvas: &mut dyn Canvas);
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Canvas that records every call
    #[derive(Default)]
    pub(crate) struct RecordingCanvas {
        pub(crate) clears: Vec<Color>,
        pub(crate) fills: Vec<(RectF, Color)>,
    }

    impl Canvas for RecordingCanvas {
        fn clear(&mut self, color: Color) {
            self.clears.push(color);
        }

        fn fill_rect(&mut self, rect: RectF, color: Color) {
            self.fills.push((rect, color));
        }
    }
}
