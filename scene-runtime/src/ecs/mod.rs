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
//! Entity/component model with deferred structural changes
//!
//! This module provides the core types for entity storage, component
//! capabilities, the staging changelist, and the pause-aware updater.

pub mod changelist;
pub mod component;
pub mod components;
pub mod context;
pub mod entity;
pub mod handle;
pub mod updater;
pub mod world;

pub use changelist::{ChangeBatch, ComponentEvent, EntityChangelist, Syncer};
pub use component::{
    downcast_mut, downcast_ref, Capabilities, Component, ComponentId, ComponentKey,
    ComponentKind, ComponentRef, Slot, DEFAULT_SLOT,
};
pub use components::{Transform, Velocity};
pub use context::{EntityCommands, FrameTime, SceneContext};
pub use entity::{EntityId, EntityRecord, EntityRef};
pub use handle::{ComponentHandle, EntityHandle};
pub use updater::{EntityUpdater, Updatable};
pub use world::World;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_creation() {
        let world = World::new();
        assert_eq!(world.entity_count(), 0);
        assert!(world.singletons().is_none());
    }

    #[test]
    fn test_default_slot_key() {
        assert_eq!(ComponentKey::of::<Transform>().slot, DEFAULT_SLOT);
    }
}
