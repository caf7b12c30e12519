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
//! Discrete AABB contact detection
//!
//! Only overlap notification is provided: no swept tests, no spatial
//! partitioning, and no collision response.

pub mod collider;
pub mod collision;
pub mod contact;

pub use collider::{Collider, ALL_LAYERS};
pub use collision::CollisionManager;
pub use contact::ContactInfo;

use crate::ecs::SceneContext;

/// Capability for reacting to contacts of a sibling collider
///
/// `contact.mine` is always a collider on the handler's own entity.
pub trait CollisionHandler {
    /// First frame the two colliders overlap
    fn on_collision_enter(&mut self, _contact: &ContactInfo, _ctx: &mut SceneContext<'_>) {}

    /// Every following frame they still overlap
    fn on_collision_stay(&mut self, _contact: &ContactInfo, _ctx: &mut SceneContext<'_>) {}

    /// First frame they no longer overlap; `contact` is the last one seen
    fn on_collision_exit(&mut self, _contact: &ContactInfo, _ctx: &mut SceneContext<'_>) {}
}
