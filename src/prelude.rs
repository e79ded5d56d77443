//! Convenient re-exports of commonly used types.
//!
//! The prelude can be imported with:
//! ```
//! use scene_graph::prelude::*;
//! ```

pub use crate::component::{
    Component, ComponentKey, ComponentState, Recyclable, SelfUpdatingComponent, UpdateContext,
};
pub use crate::config::SceneConfig;
pub use crate::debug::{Diagnostics, SceneInspector};
pub use crate::entity::{GameObjectId, ObjectGuid};
pub use crate::error::{Result, SceneError};
pub use crate::game_object::GameObject;
pub use crate::impl_component;
pub use crate::pool::InstancePool;
pub use crate::pooled_processor::PooledComponentProcessor;
pub use crate::processor::{ComponentProcessor, ComponentUpdater};
pub use crate::scene::Scene;
pub use crate::time::{GameTime, Time};
pub use crate::transform::TransformComponent;
pub use glam::Vec2;
