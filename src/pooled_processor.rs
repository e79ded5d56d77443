//! Processor backed by an instance pool
//!
//! Components are drawn from an [`InstancePool`] when added and handed back
//! when removed, so steady-state churn performs no allocation.

use ahash::AHashMap;
use serde::Serialize;
#[cfg(feature = "profiling")]
use tracing::info_span;
use tracing::{debug, error};

use crate::component::{ComponentKey, Recyclable};
use crate::config::SceneConfig;
use crate::entity::GameObjectId;
use crate::error::{Result, SceneError};
use crate::pool::{InstancePool, PoolStats, PoolTicket};
use crate::processor::{update_tracked, ComponentUpdater};
use crate::scene::Scene;
use crate::time::GameTime;

/// Snapshot of a pooled processor
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProcessorStats {
    pub component: &'static str,
    pub active_instances: usize,
    pub free_instances: usize,
    pub total_instances: usize,
    pub grow_count: usize,
}

#[derive(Serialize)]
struct ProcessorDump {
    #[serde(flatten)]
    stats: ProcessorStats,
    instances: Vec<String>,
}

pub struct PooledComponentProcessor<T, U>
where
    T: Recyclable,
    U: ComponentUpdater<T>,
{
    pool: InstancePool<T>,
    /// Owners of live pooled instances, in insertion order
    active: Vec<GameObjectId>,
    /// Ticket of the instance each owner borrowed
    tickets: AHashMap<GameObjectId, PoolTicket>,
    updater: U,
}

impl<T, U> PooledComponentProcessor<T, U>
where
    T: Recyclable,
    U: ComponentUpdater<T>,
{
    pub fn new(updater: U) -> Self {
        Self::from_config(updater, &SceneConfig::default())
    }

    pub fn with_pool(updater: U, pool: InstancePool<T>) -> Self {
        Self {
            pool,
            active: Vec::new(),
            tickets: AHashMap::new(),
            updater,
        }
    }

    pub fn from_config(updater: U, config: &SceneConfig) -> Self {
        let mut processor = Self::with_pool(updater, InstancePool::from_config(config));
        processor.active.reserve(config.processor_capacity);
        processor.tickets.reserve(config.processor_capacity);
        processor
    }

    /// Attach a pooled instance to `owner`.
    pub fn add<'s>(&mut self, scene: &'s mut Scene, owner: GameObjectId) -> Result<&'s mut T> {
        self.reclaim_lost(scene);

        // Validate first so a failed add never strands a pooled instance.
        if scene.get_object(owner)?.contains::<T>() {
            error!(?owner, component = self.name(), "component type already present");
            return Err(SceneError::ComponentAlreadyAdded {
                object: owner,
                component: self.name(),
            });
        }

        let instance = self.pool.take();
        let Some(ticket) = instance.state().pool_ticket() else {
            return Err(SceneError::PoolError(format!(
                "{} instance left the pool without a ticket",
                self.name()
            )));
        };
        let component = match scene.add_boxed(owner, instance) {
            Ok(component) => component,
            Err(err) => {
                self.pool.reclaim(ticket);
                return Err(err);
            }
        };
        self.updater.on_component_created(component, owner);
        self.active.push(owner);
        self.tickets.insert(owner, ticket);
        Ok(component)
    }

    /// Detach the `T` on `owner` and return it to the pool. The instance is
    /// recycled rather than disposed.
    ///
    /// A `T` that was not drawn from this processor's pool stays attached
    /// and yields `PoolError`.
    pub fn remove(&mut self, scene: &mut Scene, owner: GameObjectId) -> Result<()> {
        self.reclaim_lost(scene);

        let pooled = match scene.get_object(owner)?.try_get::<T>() {
            Some(component) => self.pool.owns(component),
            None => {
                return Err(SceneError::ComponentNotFound {
                    object: owner,
                    component: self.name(),
                })
            }
        };
        if !pooled {
            error!(?owner, component = self.name(), "component was not drawn from this pool");
            return Err(SceneError::PoolError(format!(
                "{} on {:?} was not drawn from this pool",
                self.name(),
                owner
            )));
        }

        if let Some(component) = scene.try_get_mut::<T>(owner) {
            self.updater.on_component_destroyed(component, owner);
        }
        let instance = scene.take::<T>(owner)?;
        self.active.retain(|&o| o != owner);
        self.tickets.remove(&owner);
        self.pool.release(instance)?;
        debug!(?owner, component = self.name(), "returned instance to pool");
        Ok(())
    }

    /// Update the live instances whose owner and enabled flag are both active.
    pub fn update(&mut self, scene: &mut Scene, time: GameTime) -> Result<()> {
        #[cfg(feature = "profiling")]
        let span = info_span!(
            "pooled_processor.update",
            component = self.name(),
            active = self.active.len()
        );
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        self.reclaim_lost(scene);
        update_tracked::<T, U>(scene, &self.active, &mut self.updater, time)
    }

    /// Forget owners whose pooled instance is no longer attached, because
    /// the owner was destroyed or the component was removed through the
    /// scene, and give their slots back to the pool.
    fn reclaim_lost(&mut self, scene: &Scene) {
        let Self {
            active,
            tickets,
            pool,
            ..
        } = self;
        active.retain(|&owner| {
            let Some(&ticket) = tickets.get(&owner) else {
                return false;
            };
            let attached = scene
                .try_get::<T>(owner)
                .and_then(|component| component.state().pool_ticket())
                == Some(ticket);
            if !attached {
                tickets.remove(&owner);
                pool.reclaim(ticket);
                debug!(?owner, "reclaimed pooled slot of a detached instance");
            }
            attached
        });
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn contains(&self, owner: GameObjectId) -> bool {
        self.active.contains(&owner)
    }

    pub fn owners(&self) -> &[GameObjectId] {
        &self.active
    }

    pub fn pool(&self) -> &InstancePool<T> {
        &self.pool
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

    pub fn stats(&self) -> ProcessorStats {
        let PoolStats {
            total,
            available,
            grow_count,
            ..
        } = self.pool.stats();
        ProcessorStats {
            component: self.name(),
            active_instances: self.active.len(),
            free_instances: available,
            total_instances: total,
            grow_count,
        }
    }

    /// Stats plus one line per live instance, as pretty JSON.
    pub fn dump_debug_info(&self, scene: &Scene) -> Result<String> {
        let instances = self
            .active
            .iter()
            .filter_map(|&owner| scene.object(owner))
            .map(|object| object.to_string())
            .collect();
        let dump = ProcessorDump {
            stats: self.stats(),
            instances,
        };
        Ok(serde_json::to_string_pretty(&dump)?)
    }
}
