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
//! Draw-order registry

use crate::ecs::changelist::{ChangeBatch, Syncer};
use crate::ecs::{Component, ComponentRef, EntityId, SceneContext, World};
use crate::indexed_set::IndexedSet;
use crate::math::Vec2;
use crate::render::{Canvas, Color, DrawContext};
use log::warn;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct DrawKey {
    order: i32,
    entity: EntityId,
    registration: u64,
}

/// Singleton that draws every visible drawable in draw order
pub struct RenderManager {
    drawables: IndexedSet<ComponentRef>,
    keys: HashMap<ComponentRef, DrawKey>,
    next_registration: u64,
    render_size: Vec2,
    clear_color: Color,
}

impl RenderManager {
    /// Create a render manager for a `width` x `height` logical target
    pub fn new(width: u32, height: u32) -> Self {
        RenderManager {
            drawables: IndexedSet::new(),
            keys: HashMap::new(),
            next_registration: 0,
            render_size: Vec2::new(width as f32, height as f32),
            clear_color: Color::CORNFLOWER_BLUE,
        }
    }

    /// Builder-style clear color override
    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Logical render target size
    pub fn render_size(&self) -> Vec2 {
        self.render_size
    }

    /// Number of registered drawables
    pub fn drawable_count(&self) -> usize {
        self.drawables.len()
    }

    /// Clear `canvas` and draw every visible drawable
    ///
    /// Drawables are ordered by draw order, then owning entity id, then
    /// registration. Returns the number drawn.
    pub fn draw(&mut self, world: &World, canvas: &mut dyn Canvas) -> usize {
        canvas.clear(self.clear_color);

        let keys = &self.keys;
        self.drawables.sort_by_key(|target| keys.get(target).copied());

        let mut drawn = 0;
        for &target in self.drawables.iter() {
            let Some(cell) = world.cell(&target) else {
                continue;
            };
            let Ok(mut component) = cell.try_borrow_mut() else {
                warn!("Skipping busy drawable {}", target);
                continue;
            };
            let Some(drawable) = component.as_drawable() else {
                continue;
            };
            if !drawable.is_visible() {
                continue;
            }
            let ctx = DrawContext::new(world, target, self.render_size);
            drawable.draw(&ctx, canvas);
            drawn += 1;
        }
        drawn
    }

    fn register(&mut self, world: &World, target: ComponentRef) {
        let Some(cell) = world.cell(&target) else {
            return;
        };
        let Ok(mut component) = cell.try_borrow_mut() else {
            return;
        };
        let Some(drawable) = component.as_drawable() else {
            return;
        };
        if self.drawables.add(target) {
            self.keys.insert(
                target,
                DrawKey {
                    order: drawable.draw_order(),
                    entity: target.entity,
                    registration: self.next_registration,
                },
            );
            self.next_registration += 1;
        }
    }
}

impl Default for RenderManager {
    fn default() -> Self {
        RenderManager::new(960, 540)
    }
}

impl Component for RenderManager {
    /// Register drawables attached before this manager
    fn begin(&mut self, ctx: &mut SceneContext<'_>) {
        let world = ctx.world();
        for entity in world.entities() {
            let Some(record) = world.record(entity) else {
                continue;
            };
            for target in record.component_refs() {
                if world.entry(&target).map(|entry| entry.caps.drawable) == Some(true) {
                    self.register(world, target);
                }
            }
        }
    }

    fn as_syncer(&mut self) -> Option<&mut dyn Syncer> {
        Some(self)
    }
}

impl Syncer for RenderManager {
    fn sync(&mut self, batch: &ChangeBatch, ctx: &mut SceneContext<'_>) {
        for event in batch.detached.iter().filter(|event| event.caps.drawable) {
            if self.drawables.remove(&event.target) {
                self.keys.remove(&event.target);
            }
        }
        for event in batch.attached.iter().filter(|event| event.caps.drawable) {
            self.register(ctx.world(), event.target);
        }
    }
}
