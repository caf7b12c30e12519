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
//! Benchmarks for contact detection
//!
//! The sweep is O(n²) per collidable layer pair, so these mostly show how
//! quickly that bites and how much layer gating saves.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use scene_runtime::ecs::Transform;
use scene_runtime::math::{RectF, Vec2};
use scene_runtime::physics::{Collider, CollisionManager};
use scene_runtime::plugins::{CollisionPlugin, PluginRegistry};
use scene_runtime::{Scene, SceneConfig};

/// Grid of 1x1 boxes spaced so that each touches its right-hand neighbour
fn grid_scene(count: usize, layers: i32, pairs: &[(i32, i32)]) -> Scene {
    let config = SceneConfig::default().with_collidable_layers(pairs.iter().copied());
    let registry = PluginRegistry::new()
        .with(CollisionPlugin)
        .expect("collision plugin registers");
    let mut scene = Scene::with_plugins(config, registry).expect("collision plugin installs");

    let columns = (count as f32).sqrt().ceil() as usize;
    for i in 0..count {
        let x = (i % columns) as f32 * 0.9;
        let y = (i / columns) as f32 * 2.0;
        let layer = 1 + (i as i32 % layers);
        scene
            .spawn("box")
            .attach(Transform::at(Vec2::new(x, y)))
            .attach(Collider::new(RectF::centered(Vec2::zeros(), Vec2::new(1.0, 1.0))).with_layer(layer));
    }
    scene.step(0.016);
    scene
}

/// Benchmark: one layer, every pair tested
fn bench_single_layer(c: &mut Criterion) {
    let mut group = c.benchmark_group("collision_single_layer");

    for collider_count in [50, 200, 800].iter() {
        group.throughput(Throughput::Elements(*collider_count as u64));
        let mut scene = grid_scene(*collider_count, 1, &[(1, 1)]);
        group.bench_function(BenchmarkId::from_parameter(collider_count), |b| {
            b.iter(|| {
                scene.step(0.016);
                black_box(scene.singleton::<CollisionManager>().map(|m| m.contacts().len()).ok())
            });
        });
    }

    group.finish();
}

/// Benchmark: four layers, only same-layer pairs collidable
fn bench_gated_layers(c: &mut Criterion) {
    let mut group = c.benchmark_group("collision_gated_layers");

    for collider_count in [50, 200, 800].iter() {
        group.throughput(Throughput::Elements(*collider_count as u64));
        let mut scene = grid_scene(*collider_count, 4, &[(1, 1), (2, 2), (3, 3), (4, 4)]);
        group.bench_function(BenchmarkId::from_parameter(collider_count), |b| {
            b.iter(|| {
                scene.step(0.016);
                black_box(scene.singleton::<CollisionManager>().map(|m| m.contacts().len()).ok())
            });
        });
    }

    group.finish();
}

criterion_group!(collision_benches, bench_single_layer, bench_gated_layers);
criterion_main!(collision_benches);
