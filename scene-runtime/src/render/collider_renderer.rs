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
//! Debug overlay outlining every registered collider

use crate::ecs::updater::Updatable;
use crate::ecs::{Component, SceneContext};
use crate::input::{InputManager, Key};
use crate::physics::CollisionManager;
use crate::render::{Canvas, Color, DrawContext, Drawable};
use log::{debug, warn};

/// Draw order of the overlay, above ordinary sprites
pub const COLLIDER_OVERLAY_ORDER: i32 = 100;

/// Outlines colliders; a key press toggles visibility
#[derive(Debug, Clone)]
pub struct ColliderRenderer {
    visible: bool,
    toggle_key: Key,
    enabled_color: Color,
    disabled_color: Color,
}

impl ColliderRenderer {
    /// Hidden overlay toggled by `toggle_key`
    pub fn new(toggle_key: Key) -> Self {
        ColliderRenderer {
            visible: false,
            toggle_key,
            enabled_color: Color::ORANGE,
            disabled_color: Color::WHITE,
        }
    }

    /// Builder-style initial visibility
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Key that flips visibility
    pub fn toggle_key(&self) -> Key {
        self.toggle_key
    }

    /// Show or hide the overlay
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

impl Default for ColliderRenderer {
    fn default() -> Self {
        ColliderRenderer::new(Key::F1)
    }
}

impl Component for ColliderRenderer {
    fn as_updatable(&mut self) -> Option<&mut dyn Updatable> {
        Some(self)
    }

    fn as_drawable(&mut self) -> Option<&mut dyn Drawable> {
        Some(self)
    }
}

impl Updatable for ColliderRenderer {
    fn pause(&mut self) -> bool {
        false
    }

    fn update(&mut self, ctx: &mut SceneContext<'_>) {
        let pressed = match ctx.singleton::<InputManager>() {
            Ok(input) => input.is_pressed(self.toggle_key),
            Err(_) => return,
        };
        if pressed {
            self.visible = !self.visible;
            debug!("Collider overlay visible: {}", self.visible);
        }
    }
}

impl Drawable for ColliderRenderer {
    fn draw_order(&self) -> i32 {
        COLLIDER_OVERLAY_ORDER
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn draw(&mut self, ctx: &DrawContext<'_>, canvas: &mut dyn Canvas) {
        let collisions = match ctx.singleton::<CollisionManager>() {
            Ok(collisions) => collisions,
            Err(err) => {
                warn!("Collider overlay has nothing to draw: {}", err);
                return;
            }
        };
        for (_, rect, enabled) in collisions.collider_shapes(ctx.world()) {
            let color = if enabled {
                self.enabled_color
            } else {
                self.disabled_color
            };
            canvas.stroke_rect(rect, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_hidden_and_ignores_pause() {
        let mut overlay = ColliderRenderer::default();
        assert!(!overlay.is_visible());
        assert!(!overlay.pause());
        assert_eq!(overlay.draw_order(), COLLIDER_OVERLAY_ORDER);
        assert_eq!(overlay.toggle_key(), Key::F1);
    }

    #[test]
    fn test_with_visible() {
        let overlay = ColliderRenderer::new(Key::C).with_visible(true);
        assert!(overlay.is_visible());
    }
}
