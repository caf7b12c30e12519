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
//! Component trait, keys, and capability probing
//!
//! A component is identified on its entity by a `(kind, slot)` key. The kind
//! is a `TypeId` token for the concrete type; the slot lets several instances
//! of one type live on the same entity. Capabilities (updatable, syncer,
//! drawable, collision handler) are discovered once when a component is
//! staged and recorded alongside it, so registries never re-test types.

use crate::ecs::changelist::Syncer;
use crate::ecs::context::SceneContext;
use crate::ecs::entity::EntityId;
use crate::ecs::updater::Updatable;
use crate::physics::CollisionHandler;
use crate::render::Drawable;
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Secondary key for co-resident components of the same type
pub type Slot = i32;

/// Slot used by components that appear at most once per entity
pub const DEFAULT_SLOT: Slot = Slot::MIN;

/// Upcast helper so `dyn Component` can be downcast to its concrete type
///
/// Implemented for every `'static` type; component authors never write it.
pub trait AsAny: Any {
    /// Borrow as `&dyn Any`
    fn as_any(&self) -> &dyn Any;

    /// Borrow as `&mut dyn Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Trait that all components must implement
///
/// `begin` runs exactly once at the synchronization point where the
/// attachment becomes live, and `end` exactly once when it is detached or its
/// entity is destroyed. Initialization that needs the scene belongs in
/// `begin`, not in the constructor.
///
/// Optional capabilities are exposed by overriding the `as_*` accessors to
/// return `Some(self)`:
///
/// ```
/// use scene_runtime::ecs::{Component, SceneContext, Updatable};
///
/// struct Spinner {
///     turns: u32,
/// }
///
/// impl Component for Spinner {
///     fn as_updatable(&mut self) -> Option<&mut dyn Updatable> {
///         Some(self)
///     }
/// }
///
/// impl Updatable for Spinner {
///     fn update(&mut self, _ctx: &mut SceneContext<'_>) {
///         self.turns += 1;
///     }
/// }
/// ```
pub trait Component: AsAny {
    /// Invoked once when the attachment takes effect
    fn begin(&mut self, _ctx: &mut SceneContext<'_>) {}

    /// Invoked once when the component is detached or its entity destroyed
    fn end(&mut self, _ctx: &mut SceneContext<'_>) {}

    /// Per-frame update capability
    fn as_updatable(&mut self) -> Option<&mut dyn Updatable> {
        None
    }

    /// Structural-change observer capability
    fn as_syncer(&mut self) -> Option<&mut dyn Syncer> {
        None
    }

    /// Rendering capability
    fn as_drawable(&mut self) -> Option<&mut dyn Drawable> {
        None
    }

    /// Contact callback capability
    fn as_collision_handler(&mut self) -> Option<&mut dyn CollisionHandler> {
        None
    }
}

/// Downcast a type-erased component
pub fn downcast_ref<T: Component>(component: &dyn Component) -> Option<&T> {
    component.as_any().downcast_ref::<T>()
}

/// Mutably downcast a type-erased component
pub fn downcast_mut<T: Component>(component: &mut dyn Component) -> Option<&mut T> {
    component.as_any_mut().downcast_mut::<T>()
}

/// Stable, comparable token for a concrete component type
///
/// Equality and hashing use only the `TypeId`; the name is kept for messages.
#[derive(Clone, Copy)]
pub struct ComponentKind {
    id: TypeId,
    name: &'static str,
}

impl ComponentKind {
    /// Token for the component type `T`
    pub fn of<T: Component>() -> Self {
        ComponentKind {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Token for the type of `component`
    pub fn of_val<T: Component>(_component: &T) -> Self {
        Self::of::<T>()
    }

    /// Check whether this token names `T`
    pub fn is<T: Component>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Full type name, for diagnostics
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without the module path
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

impl PartialEq for ComponentKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ComponentKind {}

impl Hash for ComponentKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// `(type, slot)` address of a component on its entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentKey {
    /// Concrete component type
    pub kind: ComponentKind,
    /// Slot index, `DEFAULT_SLOT` for single-instance components
    pub slot: Slot,
}

impl ComponentKey {
    /// Key for `T` at the default slot
    pub fn of<T: Component>() -> Self {
        Self::at::<T>(DEFAULT_SLOT)
    }

    /// Key for `T` at `slot`
    pub fn at<T: Component>(slot: Slot) -> Self {
        ComponentKey {
            kind: ComponentKind::of::<T>(),
            slot,
        }
    }

    /// Key for an already type-erased kind
    pub fn new(kind: ComponentKind, slot: Slot) -> Self {
        ComponentKey { kind, slot }
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.slot == DEFAULT_SLOT {
            write!(f, "{}", self.kind.short_name())
        } else {
            write!(f, "{}[{}]", self.kind.short_name(), self.slot)
        }
    }
}

/// Scene-unique serial assigned to every staged component
///
/// Distinguishes a component from a later one attached at the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u64);

impl ComponentId {
    /// Create a component id from a raw value
    pub fn new(raw: u64) -> Self {
        ComponentId(raw)
    }

    /// Get the raw value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Plain-data address of one component instance
///
/// This is the component's back-reference to its owning entity. It is fixed
/// when the component is staged and never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentRef {
    /// Owning entity
    pub entity: EntityId,
    /// Key on the owning entity
    pub key: ComponentKey,
    /// Instance serial
    pub id: ComponentId,
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.entity, self.key, self.id.0)
    }
}

/// Optional interfaces a component implements
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Implements `Updatable`
    pub updatable: bool,
    /// Implements `Syncer`
    pub syncer: bool,
    /// Implements `Drawable`
    pub drawable: bool,
    /// Implements `CollisionHandler`
    pub collision_handler: bool,
}

impl Capabilities {
    /// Ask a component which capabilities it exposes
    pub fn probe(component: &mut dyn Component) -> Self {
        Capabilities {
            updatable: component.as_updatable().is_some(),
            syncer: component.as_syncer().is_some(),
            drawable: component.as_drawable().is_some(),
            collision_handler: component.as_collision_handler().is_some(),
        }
    }
}
