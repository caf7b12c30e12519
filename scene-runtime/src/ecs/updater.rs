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
//! Pause-aware frame scheduler for updatable components
//!
//! The updater partitions every attached updatable into an active and a
//! paused set. Each frame it sorts the active set by update order, breaking
//! ties by registration order, and runs them sequentially.
//!
//! # Examples
//!
//! ```
//! use scene_runtime::ecs::updater::order;
//! use scene_runtime::ecs::{Component, SceneContext, Updatable};
//!
//! struct PauseMenu;
//!
//! impl Component for PauseMenu {
//!     fn as_updatable(&mut self) -> Option<&mut dyn Updatable> {
//!         Some(self)
//!     }
//! }
//!
//! impl Updatable for PauseMenu {
//!     fn update_order(&self) -> i32 {
//!         order::INPUT + 1
//!     }
//!
//!     // Keeps running while the scene is paused
//!     fn pause(&mut self) -> bool {
//!         false
//!     }
//!
//!     fn update(&mut self, ctx: &mut SceneContext<'_>) {
//!         let _ = ctx.is_paused();
//!     }
//! }
//! ```

use crate::ecs::changelist::EntityChangelist;
use crate::ecs::component::ComponentRef;
use crate::ecs::context::{FrameTime, SceneContext, SceneControl};
use crate::ecs::world::World;
use crate::indexed_set::IndexedSet;
use log::debug;
use std::collections::HashMap;

/// Well-known update orders
///
/// Lower orders run first. Components without an opinion use `DEFAULT`.
pub mod order {
    /// Input polling and anything that must see fresh input
    pub const INPUT: i32 = i32::MIN;

    /// Default order for gameplay logic
    pub const DEFAULT: i32 = 0;

    /// Velocity integration, immediately before collision detection
    pub const MOVEMENT: i32 = COLLISION - 1;

    /// Collision detection and contact callbacks
    pub const COLLISION: i32 = 100;
}

/// Capability for running logic every eligible frame
pub trait Updatable {
    /// Position in the frame; must stay constant for the component's lifetime
    fn update_order(&self) -> i32 {
        order::DEFAULT
    }

    /// Called when the scene pauses; return false to keep updating
    fn pause(&mut self) -> bool {
        true
    }

    /// Called once on every unpause, whether or not `pause` opted out
    fn unpause(&mut self) {}

    /// Per-frame logic
    fn update(&mut self, ctx: &mut SceneContext<'_>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct UpdateKey {
    order: i32,
    registration: u64,
}

/// Scheduler for updatable components
pub struct EntityUpdater {
    active: IndexedSet<ComponentRef>,
    paused: IndexedSet<ComponentRef>,
    keys: HashMap<ComponentRef, UpdateKey>,
    next_registration: u64,
    is_paused: bool,
}

impl EntityUpdater {
    /// Create a new, unpaused updater
    pub fn new() -> Self {
        EntityUpdater {
            active: IndexedSet::new(),
            paused: IndexedSet::new(),
            keys: HashMap::new(),
            next_registration: 0,
            is_paused: false,
        }
    }

    /// Whether the updater is in the paused state
    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    /// Number of registered updatables
    pub fn len(&self) -> usize {
        self.active.len() + self.paused.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check whether `target` will run next frame
    pub fn is_active(&self, target: &ComponentRef) -> bool {
        self.active.contains(target)
    }

    /// Check whether `target` is frozen by the pause
    pub fn is_frozen(&self, target: &ComponentRef) -> bool {
        self.paused.contains(target)
    }

    /// Register an attached updatable
    ///
    /// While paused, the component is asked whether it pauses; otherwise it
    /// goes straight to the active set.
    pub(crate) fn add(&mut self, world: &World, target: ComponentRef) {
        let Some(cell) = world.cell(&target) else {
            return;
        };
        let mut component = cell.borrow_mut();
        let Some(updatable) = component.as_updatable() else {
            return;
        };

        self.keys.insert(
            target,
            UpdateKey {
                order: updatable.update_order(),
                registration: self.next_registration,
            },
        );
        self.next_registration += 1;

        if self.is_paused && updatable.pause() {
            debug_assert!(!self.active.contains(&target));
            self.paused.add_or_die(target);
        } else {
            debug_assert!(!self.paused.contains(&target));
            self.active.add_or_die(target);
        }
    }

    /// Unregister an updatable
    ///
    /// # Panics
    ///
    /// Panics unless `target` is in exactly one of the two sets.
    pub(crate) fn remove(&mut self, target: &ComponentRef) {
        let removed_active = self.active.remove(target);
        let removed_paused = self.paused.remove(target);
        assert!(
            removed_active ^ removed_paused,
            "{} must be registered exactly once",
            target
        );
        self.keys.remove(target);
    }

    /// Enter or leave the paused state
    ///
    /// Pausing asks every active unit whether it pauses. Unpausing notifies
    /// every unit, including ones that never paused, and reactivates them all.
    pub(crate) fn set_paused(&mut self, world: &World, should_pause: bool) {
        if should_pause == self.is_paused {
            return;
        }

        if should_pause {
            for target in self.active.to_vec() {
                let Some(cell) = world.cell(&target) else {
                    continue;
                };
                let pauses = cell
                    .borrow_mut()
                    .as_updatable()
                    .map(|updatable| updatable.pause())
                    .unwrap_or(false);
                if pauses {
                    self.active.remove_or_die(&target);
                    self.paused.add_or_die(target);
                }
            }
        } else {
            for target in self.active.iter().chain(self.paused.iter()) {
                if let Some(cell) = world.cell(target) {
                    if let Some(updatable) = cell.borrow_mut().as_updatable() {
                        updatable.unpause();
                    }
                }
            }
            for target in self.paused.drain() {
                self.active.add_or_die(target);
            }
        }

        self.is_paused = should_pause;
        debug!(
            "Updater {}: {} active, {} frozen",
            if should_pause { "paused" } else { "resumed" },
            self.active.len(),
            self.paused.len()
        );
    }

    /// Run every active updatable once, in update order
    pub(crate) fn update(
        &mut self,
        world: &World,
        changes: &mut EntityChangelist,
        control: &mut SceneControl,
        frame: FrameTime,
    ) {
        let keys = &self.keys;
        self.active.sort_by_key(|target| keys.get(target).copied());

        for &target in self.active.iter() {
            let Some(cell) = world.cell(&target) else {
                continue;
            };
            let mut component = cell.borrow_mut();
            if let Some(updatable) = component.as_updatable() {
                let mut ctx = SceneContext::new(world, changes, control, frame, target);
                updatable.update(&mut ctx);
            }
        }
    }

    /// Active units in the order the last `update` ran them
    pub fn active(&self) -> &[ComponentRef] {
        self.active.as_slice()
    }
}

impl Default for EntityUpdater {
    fn default() -> Self {
        Self::new()
    }
}
