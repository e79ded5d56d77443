// Copyright 2024 Saptak Santra
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

//! Component traits
//!
//! Components are units of behavior or data exclusively owned by one game
//! object. Each component embeds a [`ComponentState`] carrying its owner
//! back-reference, its enabled flag and its disposal bookkeeping.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::entity::GameObjectId;
use crate::error::{Result, SceneError};
use crate::pool::PoolTicket;
use crate::scene::Scene;
use crate::time::GameTime;

/// Upcast helpers so boxed components can be downcast to their concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Type key used to index a game object's component bag.
///
/// Equality and hashing only consider the `TypeId`; the name is carried
/// for error messages and debug output.
#[derive(Clone, Copy)]
pub struct ComponentKey {
    type_id: TypeId,
    name: &'static str,
}

impl ComponentKey {
    pub fn of<T: Component>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: short_type_name(std::any::type_name::<T>()),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ComponentKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ComponentKey {}

impl Hash for ComponentKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentKey({})", self.name)
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    // Generic arguments carry their own paths; only trim the outer one.
    let outer = full.split('<').next().unwrap_or(full);
    match outer.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}

/// Ownership and lifetime bookkeeping embedded in every component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentState {
    owner: Option<GameObjectId>,
    enabled: bool,
    disposed: bool,
    /// Set while the component is on loan from an instance pool
    pool_ticket: Option<PoolTicket>,
}

impl ComponentState {
    pub fn new() -> Self {
        Self {
            owner: None,
            enabled: true,
            disposed: false,
            pool_ticket: None,
        }
    }

    /// State of a component created already attached to `owner`.
    pub(crate) fn owned_by(owner: GameObjectId) -> Self {
        Self {
            owner: Some(owner),
            ..Self::new()
        }
    }

    pub fn owner(&self) -> Option<GameObjectId> {
        self.owner
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn pool_ticket(&self) -> Option<PoolTicket> {
        self.pool_ticket
    }

    pub(crate) fn set_pool_ticket(&mut self, ticket: PoolTicket) {
        self.pool_ticket = Some(ticket);
    }

    /// Assign the owner. Ownership is write-once.
    pub(crate) fn claim(&mut self, owner: GameObjectId, component: &'static str) -> Result<()> {
        match self.owner {
            Some(existing) => Err(SceneError::ComponentOwnerAlreadySet {
                component,
                owner: existing,
                attempted: owner,
            }),
            None => {
                self.owner = Some(owner);
                Ok(())
            }
        }
    }

    /// Returns true the first time only.
    pub(crate) fn mark_disposed(&mut self) -> bool {
        !std::mem::replace(&mut self.disposed, true)
    }

    /// Back to the freshly constructed state. Only pools may do this.
    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ComponentState {
    fn default() -> Self {
        Self::new()
    }
}

/// Base contract shared by everything that can be attached to a game object.
pub trait Component: AsAny {
    fn state(&self) -> &ComponentState;

    fn state_mut(&mut self) -> &mut ComponentState;

    /// The game object that owns this component, once attached.
    fn owner(&self) -> Option<GameObjectId> {
        self.state().owner()
    }

    fn is_enabled(&self) -> bool {
        self.state().is_enabled()
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.state_mut().set_enabled(enabled);
    }

    /// Disposal hook. Runs exactly once, when the owner drops the component.
    fn on_dispose(&mut self) {}

    /// Components that update themselves without a processor return `Some(self)`.
    fn as_self_updating(&mut self) -> Option<&mut dyn SelfUpdatingComponent> {
        None
    }
}

/// Components updated by their owning game object rather than a processor.
pub trait SelfUpdatingComponent: Component {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) -> Result<()>;
}

/// Components that can be handed out again by an [`InstancePool`](crate::pool::InstancePool).
///
/// `recycle` must put every field back to its default value; the pool resets
/// the embedded [`ComponentState`] itself.
pub trait Recyclable: Component + Default {
    fn recycle(&mut self);
}

/// Everything an update hook may touch while its component is detached.
pub struct UpdateContext<'a> {
    pub scene: &'a mut Scene,
    pub owner: GameObjectId,
    pub time: GameTime,
}

impl<'a> UpdateContext<'a> {
    pub fn new(scene: &'a mut Scene, owner: GameObjectId, time: GameTime) -> Self {
        Self { scene, owner, time }
    }

    /// Seconds elapsed since the previous tick.
    pub fn delta_seconds(&self) -> f32 {
        self.time.delta_seconds()
    }
}

pub(crate) fn dispose(component: &mut dyn Component) {
    if component.state_mut().mark_disposed() {
        component.on_dispose();
    }
}

pub(crate) fn downcast_ref<T: Component>(component: &dyn Component) -> Option<&T> {
    component.as_any().downcast_ref::<T>()
}

pub(crate) fn downcast_mut<T: Component>(component: &mut dyn Component) -> Option<&mut T> {
    component.as_any_mut().downcast_mut::<T>()
}

pub(crate) fn downcast_box<T: Component>(component: Box<dyn Component>) -> Option<Box<T>> {
    component.into_any().downcast::<T>().ok()
}

/// Implement [`Component`] for a struct with a `state: ComponentState` field.
///
/// ```ignore
/// struct Health { state: ComponentState, hp: u32 }
/// impl_component!(Health);
///
/// struct Blinker { state: ComponentState }
/// impl_component!(Blinker, self_updating);
/// impl SelfUpdatingComponent for Blinker { /* ... */ }
/// ```
#[macro_export]
macro_rules! impl_component {
    ($ty:ty) => {
        impl $crate::component::Component for $ty {
            fn state(&self) -> &$crate::component::ComponentState {
                &self.state
            }

            fn state_mut(&mut self) -> &mut $crate::component::ComponentState {
                &mut self.state
            }
        }
    };
    ($ty:ty, self_updating) => {
        impl $crate::component::Component for $ty {
            fn state(&self) -> &$crate::component::ComponentState {
                &self.state
            }

            fn state_mut(&mut self) -> &mut $crate::component::ComponentState {
                &mut self.state
            }

            fn as_self_updating(
                &mut self,
            ) -> Option<&mut dyn $crate::component::SelfUpdatingComponent> {
                Some(self)
            }
        }
    };
}
