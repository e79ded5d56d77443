//! Game object: a scene node aggregating components.
//!
//! Game objects live inside a [`Scene`](crate::scene::Scene) arena and link
//! to each other through generational handles. Children form a singly
//! linked list threaded through `first_child` / `next_sibling`; new
//! children are inserted at the head.
//!
//! Structural mutation (adding components, reparenting, toggling active)
//! goes through the scene because it can touch other nodes. The read side
//! lives here.

use std::fmt;

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::component::{self, Component, ComponentKey};
use crate::entity::{GameObjectId, ObjectGuid};
use crate::error::{Result, SceneError};
use crate::transform::TransformComponent;

/// Default number of component slots reserved per game object.
pub const INITIAL_COMPONENT_CAPACITY: usize = 7;

pub struct GameObject {
    pub(crate) handle: GameObjectId,
    pub(crate) guid: ObjectGuid,
    pub(crate) name: String,

    pub(crate) parent: Option<GameObjectId>,
    pub(crate) first_child: Option<GameObjectId>,
    pub(crate) next_sibling: Option<GameObjectId>,

    pub(crate) active_self: bool,
    pub(crate) active_in_hierarchy: bool,

    /// Component bag, at most one entry per type
    components: AHashMap<ComponentKey, Box<dyn Component>>,

    /// Self-updating components in registration order
    pub(crate) self_updating: SmallVec<[ComponentKey; 4]>,

    disposed: bool,
}

impl GameObject {
    /// New object holding only its transform.
    pub(crate) fn new(handle: GameObjectId, name: String, capacity: usize) -> Self {
        let mut object = Self {
            handle,
            guid: ObjectGuid::new(),
            name,
            parent: None,
            first_child: None,
            next_sibling: None,
            active_self: true,
            active_in_hierarchy: true,
            components: AHashMap::with_capacity(capacity),
            self_updating: SmallVec::new(),
            disposed: false,
        };
        object.insert_component(
            ComponentKey::of::<TransformComponent>(),
            Box::new(TransformComponent::owned_by(handle)),
        );
        object
    }

    /// Arena handle of this object.
    pub fn handle(&self) -> GameObjectId {
        self.handle
    }

    /// Globally unique identity. Nil once disposed.
    pub fn guid(&self) -> ObjectGuid {
        self.guid
    }

    /// Display name. Not required to be unique.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<GameObjectId> {
        self.parent
    }

    pub fn first_child(&self) -> Option<GameObjectId> {
        self.first_child
    }

    pub fn next_sibling(&self) -> Option<GameObjectId> {
        self.next_sibling
    }

    /// Local active flag, regardless of ancestors.
    pub fn active_self(&self) -> bool {
        self.active_self
    }

    /// False when any ancestor is inactive.
    pub fn active_in_hierarchy(&self) -> bool {
        self.active_in_hierarchy
    }

    pub fn is_active(&self) -> bool {
        self.active_self && self.active_in_hierarchy
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn contains<T: Component>(&self) -> bool {
        self.contains_key(&ComponentKey::of::<T>())
    }

    pub fn contains_key(&self, key: &ComponentKey) -> bool {
        self.components.contains_key(key)
    }

    /// Get a component, failing with `ComponentNotFound` when absent.
    pub fn get<T: Component>(&self) -> Result<&T> {
        self.try_get::<T>().ok_or_else(|| self.not_found::<T>())
    }

    pub fn get_mut<T: Component>(&mut self) -> Result<&mut T> {
        let err = self.not_found::<T>();
        self.try_get_mut::<T>().ok_or(err)
    }

    /// Get a component, or `None` when absent.
    pub fn try_get<T: Component>(&self) -> Option<&T> {
        self.components
            .get(&ComponentKey::of::<T>())
            .and_then(|boxed| component::downcast_ref::<T>(boxed.as_ref()))
    }

    pub fn try_get_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.components
            .get_mut(&ComponentKey::of::<T>())
            .and_then(|boxed| component::downcast_mut::<T>(boxed.as_mut()))
    }

    /// Type-erased lookup.
    pub fn get_dyn(&self, key: &ComponentKey) -> Option<&dyn Component> {
        self.components.get(key).map(|boxed| boxed.as_ref())
    }

    /// The transform, unless it was removed.
    pub fn transform(&self) -> Option<&TransformComponent> {
        self.try_get::<TransformComponent>()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn component_keys(&self) -> impl Iterator<Item = &ComponentKey> {
        self.components.keys()
    }

    pub fn self_updating_count(&self) -> usize {
        self.self_updating.len()
    }

    fn not_found<T: Component>(&self) -> SceneError {
        SceneError::ComponentNotFound {
            object: self.handle,
            component: ComponentKey::of::<T>().name(),
        }
    }

    /// Insert into the bag. The caller has already validated the key and owner.
    pub(crate) fn insert_component(&mut self, key: ComponentKey, mut boxed: Box<dyn Component>) {
        if boxed.as_mut().as_self_updating().is_some() && !self.self_updating.contains(&key) {
            // Tail insertion keeps registration order.
            self.self_updating.push(key);
        }
        self.components.insert(key, boxed);
    }

    /// Remove from the bag and the self-update list without disposing.
    pub(crate) fn remove_component(&mut self, key: &ComponentKey) -> Option<Box<dyn Component>> {
        let boxed = self.components.remove(key)?;
        if let Some(pos) = self.self_updating.iter().position(|k| k == key) {
            self.self_updating.remove(pos);
        }
        Some(boxed)
    }

    /// Detach for the duration of an update hook. The self-update list is left alone.
    pub(crate) fn detach_component(&mut self, key: &ComponentKey) -> Option<Box<dyn Component>> {
        self.components.remove(key)
    }

    pub(crate) fn reattach_component(&mut self, key: ComponentKey, boxed: Box<dyn Component>) {
        self.components.insert(key, boxed);
    }

    pub(crate) fn transform_mut(&mut self) -> Option<&mut TransformComponent> {
        self.try_get_mut::<TransformComponent>()
    }

    /// Dispose every component once, then clear identity. Idempotent.
    pub(crate) fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        for (_, mut boxed) in self.components.drain() {
            component::dispose(boxed.as_mut());
        }
        self.self_updating.clear();
        self.guid = ObjectGuid::NIL;
        self.name.clear();
        self.disposed = true;
    }
}

impl fmt::Display for GameObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.transform() {
            Some(transform) => write!(f, "{} ({})", self.name, transform),
            None => write!(f, "{} (no transform)", self.name),
        }
    }
}

impl fmt::Debug for GameObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameObject")
            .field("handle", &self.handle)
            .field("guid", &self.guid)
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("active_self", &self.active_self)
            .field("active_in_hierarchy", &self.active_in_hierarchy)
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .finish()
    }
}
