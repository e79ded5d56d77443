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

//! Scene: arena of game objects and the operations that mutate its structure

use slotmap::SlotMap;
use smallvec::{smallvec, SmallVec};
use tracing::{debug, error, trace};

#[cfg(feature = "profiling")]
use tracing::info_span;

use crate::component::{self, Component, ComponentKey, UpdateContext};
use crate::config::SceneConfig;
use crate::entity::GameObjectId;
use crate::error::{Result, SceneError};
use crate::game_object::GameObject;
use crate::time::GameTime;
use crate::transform::{Frame, TransformComponent};

/// Owns every game object and the links between them.
///
/// Game objects are addressed by [`GameObjectId`] handles. A handle to a
/// destroyed object is never reused for a different object; lookups through
/// it fail with [`SceneError::GameObjectNotFound`].
pub struct Scene {
    /// Game objects keyed by generational handles
    objects: SlotMap<GameObjectId, GameObject>,

    /// Parentless objects in spawn order
    roots: Vec<GameObjectId>,

    config: SceneConfig,
}

impl Scene {
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            objects: SlotMap::with_capacity_and_key(config.object_capacity),
            roots: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    // ========== Lifetime ==========

    /// Create a root game object carrying a default transform.
    pub fn spawn(&mut self, name: impl Into<String>) -> GameObjectId {
        let name = name.into();
        let capacity = self.config.component_capacity;
        let id = self
            .objects
            .insert_with_key(|handle| GameObject::new(handle, name, capacity));
        self.roots.push(id);
        trace!(?id, "spawned game object");
        id
    }

    /// Create a game object directly under `parent`.
    pub fn spawn_child(
        &mut self,
        parent: GameObjectId,
        name: impl Into<String>,
    ) -> Result<GameObjectId> {
        if !self.objects.contains_key(parent) {
            return Err(SceneError::GameObjectNotFound(parent));
        }
        let child = self.spawn(name);
        self.set_parent(child, Some(parent))?;
        Ok(child)
    }

    /// Destroy a game object and its whole subtree, disposing every
    /// component exactly once. Returns false when `id` is already gone.
    pub fn destroy(&mut self, id: GameObjectId) -> bool {
        let parent = match self.objects.get(id) {
            Some(object) => object.parent,
            None => return false,
        };

        match parent {
            Some(parent) => {
                if let Err(err) = self.unlink_child(parent, id) {
                    error!(?id, %err, "destroying game object with a broken parent link");
                }
            }
            None => self.roots.retain(|&root| root != id),
        }

        let doomed: Vec<GameObjectId> =
            std::iter::once(id).chain(self.descendants(id)).collect();
        for handle in &doomed {
            if let Some(mut object) = self.objects.remove(*handle) {
                object.dispose();
            }
        }
        trace!(?id, destroyed = doomed.len(), "destroyed game object subtree");
        true
    }

    /// Destroy every game object.
    pub fn clear(&mut self) {
        for root in std::mem::take(&mut self.roots) {
            self.destroy(root);
        }
    }

    pub fn contains(&self, id: GameObjectId) -> bool {
        self.objects.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn object(&self, id: GameObjectId) -> Option<&GameObject> {
        self.objects.get(id)
    }

    pub fn object_mut(&mut self, id: GameObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(id)
    }

    /// Like [`object`](Self::object), failing with `GameObjectNotFound`.
    pub fn get_object(&self, id: GameObjectId) -> Result<&GameObject> {
        self.objects
            .get(id)
            .ok_or(SceneError::GameObjectNotFound(id))
    }

    fn get_object_mut(&mut self, id: GameObjectId) -> Result<&mut GameObject> {
        self.objects
            .get_mut(id)
            .ok_or(SceneError::GameObjectNotFound(id))
    }

    pub fn roots(&self) -> &[GameObjectId] {
        &self.roots
    }

    pub fn iter(&self) -> impl Iterator<Item = (GameObjectId, &GameObject)> {
        self.objects.iter()
    }

    // ========== Components ==========

    /// Attach a component. Fails when the object already holds one of the
    /// same type or when the component already belongs to an object.
    pub fn add<T: Component>(&mut self, id: GameObjectId, component: T) -> Result<&mut T> {
        self.add_boxed(id, Box::new(component))
    }

    pub fn add_boxed<T: Component>(
        &mut self,
        id: GameObjectId,
        mut component: Box<T>,
    ) -> Result<&mut T> {
        let key = ComponentKey::of::<T>();
        let object = self.get_object_mut(id)?;
        if object.contains_key(&key) {
            error!(?id, component = key.name(), "component type already present");
            return Err(SceneError::ComponentAlreadyAdded {
                object: id,
                component: key.name(),
            });
        }
        if let Err(err) = component.state_mut().claim(id, key.name()) {
            error!(?id, %err, "component already owned");
            return Err(err);
        }
        object.insert_component(key, component);

        if key == ComponentKey::of::<TransformComponent>() {
            self.regenerate_transforms(id);
        }
        self.get_object_mut(id)?.get_mut::<T>()
    }

    /// Detach and dispose a component. Returns false when it was absent.
    pub fn remove<T: Component>(&mut self, id: GameObjectId) -> Result<bool> {
        self.remove_by_key(id, &ComponentKey::of::<T>())
    }

    pub fn remove_by_key(&mut self, id: GameObjectId, key: &ComponentKey) -> Result<bool> {
        let removed = self.get_object_mut(id)?.remove_component(key);
        match removed {
            Some(mut boxed) => {
                component::dispose(boxed.as_mut());
                if *key == ComponentKey::of::<TransformComponent>() {
                    // Children now compose against the nearest ancestor frame.
                    self.regenerate_transforms(id);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Detach a component without disposing it. The component keeps its
    /// owner, so it cannot be added to another object.
    pub fn take<T: Component>(&mut self, id: GameObjectId) -> Result<Box<T>> {
        let key = ComponentKey::of::<T>();
        let not_found = SceneError::ComponentNotFound {
            object: id,
            component: key.name(),
        };
        let boxed = self
            .get_object_mut(id)?
            .remove_component(&key)
            .ok_or_else(|| not_found.clone())?;
        if key == ComponentKey::of::<TransformComponent>() {
            self.regenerate_transforms(id);
        }
        component::downcast_box::<T>(boxed).ok_or(not_found)
    }

    pub fn get<T: Component>(&self, id: GameObjectId) -> Result<&T> {
        self.get_object(id)?.get::<T>()
    }

    pub fn get_mut<T: Component>(&mut self, id: GameObjectId) -> Result<&mut T> {
        self.get_object_mut(id)?.get_mut::<T>()
    }

    /// `None` when either the object or the component is missing.
    pub fn try_get<T: Component>(&self, id: GameObjectId) -> Option<&T> {
        self.objects.get(id)?.try_get::<T>()
    }

    pub fn try_get_mut<T: Component>(&mut self, id: GameObjectId) -> Option<&mut T> {
        self.objects.get_mut(id)?.try_get_mut::<T>()
    }

    pub fn contains_component<T: Component>(&self, id: GameObjectId) -> bool {
        self.objects
            .get(id)
            .map_or(false, |object| object.contains::<T>())
    }

    /// A component is active when it is enabled and its owner is active.
    pub fn is_component_active<T: Component>(&self, id: GameObjectId) -> bool {
        self.is_component_active_key(id, &ComponentKey::of::<T>())
    }

    pub fn is_component_active_key(&self, id: GameObjectId, key: &ComponentKey) -> bool {
        match self.objects.get(id) {
            Some(object) => {
                object.is_active()
                    && object
                        .get_dyn(key)
                        .map_or(false, |component| component.is_enabled())
            }
            None => false,
        }
    }

    // ========== Transforms ==========

    pub fn transform(&self, id: GameObjectId) -> Result<&TransformComponent> {
        self.get::<TransformComponent>(id)
    }

    pub(crate) fn transform_component_mut(
        &mut self,
        id: GameObjectId,
    ) -> Result<&mut TransformComponent> {
        self.get_mut::<TransformComponent>(id)
    }

    /// World frame of the nearest ancestor holding a transform.
    pub(crate) fn parent_frame(&self, id: GameObjectId) -> Frame {
        let mut current = self.objects.get(id).and_then(|object| object.parent);
        while let Some(ancestor) = current {
            let Some(object) = self.objects.get(ancestor) else {
                break;
            };
            if let Some(transform) = object.transform() {
                return transform.world_frame();
            }
            current = object.parent;
        }
        Frame::IDENTITY
    }

    /// Recompute world values for `id` and every descendant.
    pub(crate) fn regenerate_transforms(&mut self, id: GameObjectId) {
        let mut stack: SmallVec<[(GameObjectId, Frame); 16]> =
            smallvec![(id, self.parent_frame(id))];

        while let Some((current, parent)) = stack.pop() {
            let Some(object) = self.objects.get_mut(current) else {
                continue;
            };
            // Objects without a transform pass their parent's frame through.
            let frame = match object.transform_mut() {
                Some(transform) => {
                    transform.regenerate(&parent);
                    transform.world_frame()
                }
                None => parent,
            };

            let mut child = object.first_child;
            while let Some(handle) = child {
                stack.push((handle, frame));
                child = self.objects.get(handle).and_then(|object| object.next_sibling);
            }
        }
    }

    // ========== Hierarchy ==========

    pub fn parent(&self, id: GameObjectId) -> Result<Option<GameObjectId>> {
        Ok(self.get_object(id)?.parent)
    }

    /// Move `child` under `parent`, or to the root level when `None`.
    ///
    /// The child is inserted at the head of the new parent's child list.
    /// Its world transform is regenerated from its unchanged local values.
    pub fn set_parent(&mut self, child: GameObjectId, parent: Option<GameObjectId>) -> Result<()> {
        let current = self.get_object(child)?.parent;
        if current == parent {
            return Ok(());
        }

        if let Some(parent) = parent {
            if parent == child {
                error!(?child, "cannot parent a game object to itself");
                return Err(SceneError::HierarchyError(
                    "cannot parent a game object to itself".to_string(),
                ));
            }
            if !self.objects.contains_key(parent) {
                return Err(SceneError::GameObjectNotFound(parent));
            }
            // A childless object cannot be an ancestor of anything.
            let has_children = self.get_object(child)?.first_child.is_some();
            if has_children && self.is_ancestor_of(child, parent) {
                error!(?child, ?parent, "reparenting would create a cycle");
                return Err(SceneError::HierarchyError(format!(
                    "{:?} is a descendant of {:?}",
                    parent, child
                )));
            }
        }

        match current {
            Some(old) => self.unlink_child(old, child)?,
            None => self.roots.retain(|&root| root != child),
        }
        match parent {
            Some(parent) => self.link_child(parent, child),
            None => self.roots.push(child),
        }

        let inherited = parent
            .and_then(|parent| self.objects.get(parent))
            .map_or(true, |parent| parent.is_active());
        if let Some(object) = self.objects.get_mut(child) {
            object.active_in_hierarchy = inherited;
        }
        self.propagate_active(child);
        self.regenerate_transforms(child);

        debug!(?child, ?parent, "reparented game object");
        Ok(())
    }

    /// True when `ancestor` appears on the parent chain of `id`.
    pub fn is_ancestor_of(&self, ancestor: GameObjectId, id: GameObjectId) -> bool {
        let mut current = self.objects.get(id).and_then(|object| object.parent);
        while let Some(handle) = current {
            if handle == ancestor {
                return true;
            }
            current = self.objects.get(handle).and_then(|object| object.parent);
        }
        false
    }

    fn link_child(&mut self, parent: GameObjectId, child: GameObjectId) {
        let head = self.objects.get(parent).and_then(|object| object.first_child);
        if let Some(object) = self.objects.get_mut(child) {
            object.parent = Some(parent);
            object.next_sibling = head;
        }
        if let Some(object) = self.objects.get_mut(parent) {
            object.first_child = Some(child);
        }
    }

    /// Splice `child` out of `parent`'s list. Leaves everything untouched
    /// when the list does not contain it.
    fn unlink_child(&mut self, parent: GameObjectId, child: GameObjectId) -> Result<()> {
        let head = self.get_object(parent)?.first_child;
        let next = self.get_object(child)?.next_sibling;

        if head == Some(child) {
            if let Some(object) = self.objects.get_mut(parent) {
                object.first_child = next;
            }
        } else {
            let mut previous = head;
            loop {
                let Some(handle) = previous else {
                    error!(?parent, ?child, "child missing from parent's child list");
                    return Err(SceneError::HierarchyError(format!(
                        "{:?} is not a child of {:?}",
                        child, parent
                    )));
                };
                let sibling = self.objects.get(handle).and_then(|object| object.next_sibling);
                if sibling == Some(child) {
                    if let Some(object) = self.objects.get_mut(handle) {
                        object.next_sibling = next;
                    }
                    break;
                }
                previous = sibling;
            }
        }

        if let Some(object) = self.objects.get_mut(child) {
            object.parent = None;
            object.next_sibling = None;
        }
        Ok(())
    }

    /// Depth-first search below `id` for the first descendant named `name`.
    pub fn find_child_by_name(
        &self,
        id: GameObjectId,
        name: &str,
    ) -> Result<Option<GameObjectId>> {
        if name.is_empty() {
            return Err(SceneError::InvalidArgument(
                "child name must not be empty".to_string(),
            ));
        }
        let first = self.get_object(id)?.first_child;
        Ok(self.find_in_siblings(first, name))
    }

    fn find_in_siblings(&self, first: Option<GameObjectId>, name: &str) -> Option<GameObjectId> {
        // Next sibling below first child on the stack keeps pre-order.
        let mut stack: SmallVec<[GameObjectId; 16]> = first.into_iter().collect();
        while let Some(handle) = stack.pop() {
            let Some(object) = self.objects.get(handle) else {
                continue;
            };
            if object.name == name {
                return Some(handle);
            }
            if let Some(next) = object.next_sibling {
                stack.push(next);
            }
            if let Some(child) = object.first_child {
                stack.push(child);
            }
        }
        None
    }

    // ========== Activity ==========

    pub fn set_active(&mut self, id: GameObjectId, active: bool) -> Result<()> {
        let object = self.get_object_mut(id)?;
        if object.active_self == active {
            return Ok(());
        }
        object.active_self = active;
        self.propagate_active(id);
        debug!(?id, active, "changed game object activity");
        Ok(())
    }

    /// False for destroyed handles.
    pub fn is_active(&self, id: GameObjectId) -> bool {
        self.objects.get(id).map_or(false, |object| object.is_active())
    }

    /// Push `id`'s effective activity down to every descendant.
    fn propagate_active(&mut self, id: GameObjectId) {
        let mut stack: SmallVec<[GameObjectId; 16]> = smallvec![id];

        while let Some(current) = stack.pop() {
            let Some(object) = self.objects.get(current) else {
                continue;
            };
            let active = object.is_active();
            let mut child = object.first_child;
            while let Some(handle) = child {
                let Some(object) = self.objects.get_mut(handle) else {
                    break;
                };
                object.active_in_hierarchy = active;
                child = object.next_sibling;
                stack.push(handle);
            }
        }
    }

    // ========== Updates ==========

    /// Run [`update_recursively`](Self::update_recursively) from every root.
    ///
    /// Each call covers the root, its later siblings and the first-child
    /// chain below the root. Children of non-head siblings are not visited.
    pub fn update(&mut self, time: GameTime) -> Result<()> {
        #[cfg(feature = "profiling")]
        let span = info_span!(
            "scene.update",
            roots = self.roots.len(),
            objects = self.objects.len()
        );
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        // Hooks may spawn or destroy roots; index rather than iterate.
        let mut index = 0;
        while let Some(&root) = self.roots.get(index) {
            self.update_recursively(root, time)?;
            index += 1;
        }
        Ok(())
    }

    /// Update `id` and each of its following siblings, then descend into
    /// `id`'s first child and repeat from there.
    pub fn update_recursively(&mut self, id: GameObjectId, time: GameTime) -> Result<()> {
        self.get_object(id)?;

        let mut head = Some(id);
        while let Some(start) = head {
            let mut current = Some(start);
            while let Some(handle) = current {
                self.update_self(handle, time)?;
                current = self.objects.get(handle).and_then(|object| object.next_sibling);
            }
            // Read after the hooks ran; they may have restructured the children.
            head = self.objects.get(start).and_then(|object| object.first_child);
        }
        Ok(())
    }

    /// Run the self-updating components of `id` in registration order.
    /// Inactive objects and disabled components are skipped.
    pub fn update_self(&mut self, id: GameObjectId, time: GameTime) -> Result<()> {
        if !self.get_object(id)?.is_active() {
            return Ok(());
        }

        let mut index = 0;
        while let Some(key) = self
            .objects
            .get(id)
            .and_then(|object| object.self_updating.get(index).copied())
        {
            index += 1;
            self.run_detached(id, key, time, |boxed, ctx| {
                match boxed.as_self_updating() {
                    Some(updating) => updating.update(ctx),
                    None => Ok(()),
                }
            })?;
        }
        Ok(())
    }

    /// Run `f` on the `T` held by `id` with the component lifted out of the
    /// scene. Returns false when nothing ran.
    pub(crate) fn update_component<T, F>(
        &mut self,
        id: GameObjectId,
        time: GameTime,
        f: F,
    ) -> Result<bool>
    where
        T: Component,
        F: FnOnce(&mut T, &mut UpdateContext<'_>) -> Result<()>,
    {
        self.run_detached(id, ComponentKey::of::<T>(), time, |boxed, ctx| {
            match component::downcast_mut::<T>(boxed) {
                Some(typed) => f(typed, ctx),
                None => Ok(()),
            }
        })
    }

    /// Detach the component under `key`, hand it to `f` together with the
    /// scene, then put it back. Skipped when the owner or the component is
    /// inactive.
    fn run_detached<F>(
        &mut self,
        id: GameObjectId,
        key: ComponentKey,
        time: GameTime,
        f: F,
    ) -> Result<bool>
    where
        F: FnOnce(&mut dyn Component, &mut UpdateContext<'_>) -> Result<()>,
    {
        let Some(object) = self.objects.get_mut(id) else {
            return Ok(false);
        };
        if !object.is_active() {
            return Ok(false);
        }
        let Some(mut boxed) = object.detach_component(&key) else {
            return Ok(false);
        };
        if !boxed.as_ref().is_enabled() {
            object.reattach_component(key, boxed);
            return Ok(false);
        }

        let result = {
            let mut ctx = UpdateContext::new(self, id, time);
            f(boxed.as_mut(), &mut ctx)
        };

        match self.objects.get_mut(id) {
            Some(object) if !object.contains_key(&key) => object.reattach_component(key, boxed),
            // Owner destroyed mid-update, or the hook installed a replacement.
            _ => component::dispose(boxed.as_mut()),
        }
        result.map(|()| true)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        for (_, object) in self.objects.iter_mut() {
            object.dispose();
        }
    }
}
