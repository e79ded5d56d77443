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

//! Component processors
//!
//! A processor owns the per-frame update of every component of one type.
//! The update itself is an injected [`ComponentUpdater`] strategy, so a
//! processor is built from plain data plus a closure or a small struct.

#[cfg(feature = "profiling")]
use tracing::info_span;
use tracing::error;

use crate::component::{Component, ComponentKey, UpdateContext};
use crate::config::{SceneConfig, DEFAULT_PROCESSOR_CAPACITY};
use crate::entity::GameObjectId;
use crate::error::{Result, SceneError};
use crate::scene::Scene;
use crate::time::GameTime;

/// Per-component update strategy.
pub trait ComponentUpdater<T: Component> {
    fn update(&mut self, component: &mut T, ctx: &mut UpdateContext<'_>) -> Result<()>;

    /// Called after a processor attaches a new component.
    fn on_component_created(&mut self, _component: &mut T, _owner: GameObjectId) {}

    /// Called before a processor detaches a component.
    fn on_component_destroyed(&mut self, _component: &mut T, _owner: GameObjectId) {}
}

impl<T, F> ComponentUpdater<T> for F
where
    T: Component,
    F: FnMut(&mut T, &mut UpdateContext<'_>) -> Result<()>,
{
    fn update(&mut self, component: &mut T, ctx: &mut UpdateContext<'_>) -> Result<()> {
        self(component, ctx)
    }
}

/// Run `updater` over `owners` in order, skipping inactive components.
pub(crate) fn update_tracked<T, U>(
    scene: &mut Scene,
    owners: &[GameObjectId],
    updater: &mut U,
    time: GameTime,
) -> Result<()>
where
    T: Component,
    U: ComponentUpdater<T>,
{
    for &owner in owners {
        scene.update_component::<T, _>(owner, time, |component, ctx| {
            updater.update(component, ctx)
        })?;
    }
    Ok(())
}

/// Creates, tracks and updates every `T` it is asked to manage.
pub struct ComponentProcessor<T, U>
where
    T: Component + Default,
    U: ComponentUpdater<T>,
{
    /// Owners in insertion order
    owners: Vec<GameObjectId>,
    updater: U,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T, U> ComponentProcessor<T, U>
where
    T: Component + Default,
    U: ComponentUpdater<T>,
{
    pub fn new(updater: U) -> Self {
        Self::with_capacity(updater, DEFAULT_PROCESSOR_CAPACITY)
    }

    pub fn with_capacity(updater: U, capacity: usize) -> Self {
        Self {
            owners: Vec::with_capacity(capacity),
            updater,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn from_config(updater: U, config: &SceneConfig) -> Self {
        Self::with_capacity(updater, config.processor_capacity)
    }

    /// Construct a default `T`, attach it to `owner` and start tracking it.
    pub fn add<'s>(&mut self, scene: &'s mut Scene, owner: GameObjectId) -> Result<&'s mut T> {
        let component = scene.add(owner, T::default())?;
        self.updater.on_component_created(component, owner);
        if !self.owners.contains(&owner) {
            self.owners.push(owner);
        }
        Ok(component)
    }

    /// Track a `T` that is already attached to `owner`.
    pub fn add_existing(&mut self, scene: &Scene, owner: GameObjectId) -> Result<()> {
        scene.get::<T>(owner)?;
        if self.owners.contains(&owner) {
            error!(?owner, component = self.name(), "component already tracked");
            return Err(SceneError::ProcessorError(format!(
                "{} on {:?} is already tracked",
                self.name(),
                owner
            )));
        }
        self.owners.push(owner);
        Ok(())
    }

    /// Detach and dispose the `T` on `owner` and stop tracking it.
    /// Returns whether anything was removed.
    pub fn remove(&mut self, scene: &mut Scene, owner: GameObjectId) -> bool {
        let tracked = match self.owners.iter().position(|&o| o == owner) {
            Some(index) => {
                self.owners.remove(index);
                true
            }
            None => false,
        };
        if let Some(component) = scene.try_get_mut::<T>(owner) {
            self.updater.on_component_destroyed(component, owner);
        }
        let detached = matches!(scene.remove::<T>(owner), Ok(true));
        tracked || detached
    }

    /// Update every tracked component whose owner and enabled flag are
    /// both active. The first strategy error aborts the tick.
    pub fn update(&mut self, scene: &mut Scene, time: GameTime) -> Result<()> {
        #[cfg(feature = "profiling")]
        let span = info_span!(
            "processor.update",
            component = self.name(),
            tracked = self.owners.len()
        );
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        // Forget components that were destroyed or removed behind our back.
        self.owners.retain(|&owner| scene.contains_component::<T>(owner));
        update_tracked::<T, U>(scene, &self.owners, &mut self.updater, time)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    pub fn contains(&self, owner: GameObjectId) -> bool {
        self.owners.contains(&owner)
    }

    /// Owners of the tracked components, in insertion order.
    pub fn owners(&self) -> &[GameObjectId] {
        &self.owners
    }

    pub fn updater(&self) -> &U {
        &self.updater
    }

    pub fn updater_mut(&mut self) -> &mut U {
        &mut self.updater
    }

    pub fn name(&self) -> &'static str {
        ComponentKey::of::<T>().name()
    }
}
