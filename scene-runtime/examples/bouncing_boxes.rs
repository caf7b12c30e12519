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
//! Bouncing boxes
//!
//! Boxes fly around a walled arena and reflect off walls and each other.
//! Shows plugins, contact callbacks, deferred spawning, pausing, and a
//! headless canvas.
//!
//! Run with `RUST_LOG=debug` to see every synchronization point.

use scene_runtime::ecs::{Component, SceneContext, Transform, Updatable, Velocity};
use scene_runtime::input::Key;
use scene_runtime::math::{RectF, Vec2};
use scene_runtime::physics::{Collider, CollisionHandler, ContactInfo};
use scene_runtime::render::{Canvas, Color, ColliderRenderer, DrawContext, Drawable};
use scene_runtime::{Scene, SceneConfig};

const BOX_LAYER: i32 = 1;
const WALL_LAYER: i32 = 2;
const ARENA: (f32, f32) = (320.0, 200.0);

/// Reflects its entity's velocity off whatever it runs into
struct Bouncer {
    bounces: u32,
}

impl Component for Bouncer {
    fn as_collision_handler(&mut self) -> Option<&mut dyn CollisionHandler> {
        Some(self)
    }
}

impl CollisionHandler for Bouncer {
    fn on_collision_enter(&mut self, contact: &ContactInfo, ctx: &mut SceneContext<'_>) {
        let normal = contact.normal;
        if let Ok(mut velocity) = ctx.sibling_mut::<Velocity>() {
            let into = velocity.linear.dot(&normal);
            if into < 0.0 {
                velocity.linear -= normal * (2.0 * into);
                self.bounces += 1;
            }
        }
        if let Ok(mut transform) = ctx.sibling_mut::<Transform>() {
            let depth = if normal.x != 0.0 {
                contact.overlap.width()
            } else {
                contact.overlap.height()
            };
            transform.position += normal * depth;
        }
    }
}

/// Draws its entity's collider as a filled box
struct BoxSprite {
    color: Color,
}

impl Component for BoxSprite {
    fn as_drawable(&mut self) -> Option<&mut dyn Drawable> {
        Some(self)
    }
}

impl Drawable for BoxSprite {
    fn draw(&mut self, ctx: &DrawContext<'_>, canvas: &mut dyn Canvas) {
        let world = ctx.world();
        let (Ok(transform), Ok(collider)) = (
            world.get::<Transform>(ctx.entity()),
            world.get::<Collider>(ctx.entity()),
        ) else {
            return;
        };
        canvas.fill_rect(collider.world_rect(&transform), self.color);
    }
}

/// Spawns one more box every `interval` seconds, up to `limit`
struct Spawner {
    interval: f32,
    elapsed: f32,
    spawned: u32,
    limit: u32,
}

impl Component for Spawner {
    fn as_updatable(&mut self) -> Option<&mut dyn Updatable> {
        Some(self)
    }
}

impl Updatable for Spawner {
    fn update(&mut self, ctx: &mut SceneContext<'_>) {
        self.elapsed += ctx.delta_time();
        if self.elapsed < self.interval || self.spawned >= self.limit {
            return;
        }
        self.elapsed = 0.0;
        self.spawned += 1;

        let n = self.spawned as f32;
        spawn_box(
            ctx,
            Vec2::new(40.0 + 25.0 * n, 40.0 + 10.0 * n),
            Vec2::new(60.0 - 10.0 * n, 45.0 + 5.0 * n),
        );
    }
}

fn spawn_box(ctx: &mut SceneContext<'_>, position: Vec2, velocity: Vec2) {
    ctx.spawn("box")
        .attach(Transform::at(position))
        .attach(Velocity::new(velocity))
        .attach(Collider::new(RectF::centered(Vec2::zeros(), Vec2::new(12.0, 12.0))).with_layer(BOX_LAYER))
        .attach(Bouncer { bounces: 0 })
        .attach(BoxSprite {
            color: Color::WHITE,
        });
}

/// Counts what would have been drawn
#[derive(Default)]
struct TallyCanvas {
    rects: usize,
}

impl Canvas for TallyCanvas {
    fn clear(&mut self, _color: Color) {
        self.rects = 0;
    }

    fn fill_rect(&mut self, _rect: RectF, _color: Color) {
        self.rects += 1;
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    println!("Scene Runtime - Bouncing Boxes");
    println!("==============================\n");

    let config = SceneConfig::default()
        .with_name("bouncing-boxes")
        .with_collidable_layers([(BOX_LAYER, BOX_LAYER), (BOX_LAYER, WALL_LAYER)])
        .with_render_size(ARENA.0 as u32, ARENA.1 as u32);
    let mut scene = Scene::with_default_plugins(config)?;

    let (w, h) = ARENA;
    let walls = [
        ("top", RectF::new(0.0, -10.0, w, 10.0)),
        ("bottom", RectF::new(0.0, h, w, 10.0)),
        ("left", RectF::new(-10.0, 0.0, 10.0, h)),
        ("right", RectF::new(w, 0.0, 10.0, h)),
    ];
    for (name, rect) in walls {
        scene
            .spawn(name)
            .attach(Transform::default())
            .attach(Collider::new(rect).with_layer(WALL_LAYER));
    }
    scene.spawn("spawner").attach(Spawner {
        interval: 0.5,
        elapsed: 0.0,
        spawned: 0,
        limit: 6,
    });
    scene.spawn("overlay").attach(ColliderRenderer::new(Key::F1));

    let mut canvas = TallyCanvas::default();
    for frame in 0..600u32 {
        match frame {
            // Show collider outlines for a while
            120 => scene.submit_input([Key::F1])?,
            121 => scene.submit_input([])?,
            300 => scene.set_should_pause(true),
            360 => scene.set_should_pause(false),
            _ => {}
        }

        scene.step(1.0 / 60.0);
        let drawn = scene.draw(&mut canvas).unwrap_or(0);

        if frame % 60 == 0 {
            println!(
                "t={:>5.2}s entities={:>2} drawables drawn={:>2} rects={:>3} paused={}",
                scene.time().total,
                scene.world().entity_count(),
                drawn,
                canvas.rects,
                scene.is_paused()
            );
        }
    }

    let boxes = scene.world().find_all_with(&[scene_runtime::ecs::ComponentKind::of::<Bouncer>()]);
    println!("\nBounces per box:");
    for entity in boxes {
        let bounces = scene.world().get::<Bouncer>(entity)?.bounces;
        let position = scene.world().get::<Transform>(entity)?.position;
        println!("  {} at ({:>6.1}, {:>6.1}): {}", entity, position.x, position.y, bounces);
    }

    scene.shutdown();
    Ok(())
}
