//! Instance pool for recyclable components

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use slotmap::{new_key_type, SlotMap};
use tracing::debug;

use crate::component::{self, Recyclable};
use crate::config::{growth_step, SceneConfig};
use crate::error::{Result, SceneError};

new_key_type! {
    /// Slot of an instance while it is out of its pool
    pub struct PoolSlot;
}

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// Identity stamped on an instance each time a pool hands it out.
///
/// Slots are generational, so a ticket never matches a later loan even
/// after the instance it was stamped on has been dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolTicket {
    pool: u64,
    slot: PoolSlot,
}

/// Pool usage counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Instances created over the pool's lifetime
    pub total: usize,
    /// Instances waiting in the pool
    pub available: usize,
    /// Instances handed out and not yet returned
    pub outstanding: usize,
    /// Number of times the pool ran dry and grew
    pub grow_count: usize,
}

/// Pre-allocated store of component instances.
///
/// Every instance handed out carries a [`PoolTicket`] in its
/// [`ComponentState`](crate::component::ComponentState); returning an
/// instance without a live ticket from this pool is an error.
pub struct InstancePool<T: Recyclable> {
    id: u64,
    free: VecDeque<Box<T>>,
    outstanding: SlotMap<PoolSlot, ()>,
    total: usize,
    grow_count: usize,
    /// Slots added per growth; 0 doubles the pool
    growth: usize,
}

impl<T: Recyclable> InstancePool<T> {
    /// Pool with `capacity` instances that doubles when it runs dry.
    pub fn new(capacity: usize) -> Self {
        Self::with_growth(capacity, 0)
    }

    pub fn with_growth(capacity: usize, growth: usize) -> Self {
        let mut pool = Self {
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            free: VecDeque::with_capacity(capacity),
            outstanding: SlotMap::with_capacity_and_key(capacity),
            total: 0,
            grow_count: 0,
            growth,
        };
        pool.allocate(capacity);
        pool
    }

    pub fn from_config(config: &SceneConfig) -> Self {
        Self::with_growth(config.pool_capacity, config.pool_growth)
    }

    /// Hand out an instance in its freshly constructed state. Grows the
    /// pool when it is empty.
    pub fn take(&mut self) -> Box<T> {
        let mut instance = match self.free.pop_front() {
            Some(instance) => instance,
            None => {
                self.grow();
                // grow() always allocates at least one instance
                self.free.pop_front().unwrap_or_default()
            }
        };
        instance.recycle();
        instance.state_mut().reset();
        let slot = self.outstanding.insert(());
        instance.state_mut().set_pool_ticket(PoolTicket { pool: self.id, slot });
        instance
    }

    /// True when `instance` is currently on loan from this pool.
    pub fn owns(&self, instance: &T) -> bool {
        instance
            .state()
            .pool_ticket()
            .map_or(false, |ticket| self.is_outstanding(ticket))
    }

    pub fn is_outstanding(&self, ticket: PoolTicket) -> bool {
        ticket.pool == self.id && self.outstanding.contains_key(ticket.slot)
    }

    /// Give an instance back. Fails for instances this pool does not have
    /// out, in which case the instance is disposed and dropped.
    pub fn release(&mut self, mut instance: Box<T>) -> Result<()> {
        let returned = match instance.state().pool_ticket() {
            Some(ticket) if ticket.pool == self.id => {
                self.outstanding.remove(ticket.slot).is_some()
            }
            _ => false,
        };
        if !returned {
            component::dispose(&mut *instance);
            return Err(SceneError::PoolError(format!(
                "{} instance was not handed out by this pool",
                std::any::type_name::<T>()
            )));
        }
        self.free.push_back(instance);
        Ok(())
    }

    /// Write off a loaned instance that was dropped without being released
    /// and put a fresh instance in its place. Returns false when `ticket`
    /// is not outstanding.
    pub fn reclaim(&mut self, ticket: PoolTicket) -> bool {
        if !self.is_outstanding(ticket) {
            return false;
        }
        self.outstanding.remove(ticket.slot);
        self.free.push_back(Box::default());
        debug!(
            component = std::any::type_name::<T>(),
            "replaced lost pooled instance"
        );
        true
    }

    pub fn available(&self) -> usize {
        self.free.len()
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            total: self.total,
            available: self.free.len(),
            outstanding: self.outstanding.len(),
            grow_count: self.grow_count,
        }
    }

    fn grow(&mut self) {
        let extra = growth_step(self.growth, self.total);
        self.allocate(extra);
        self.grow_count += 1;
        debug!(
            component = std::any::type_name::<T>(),
            extra,
            total = self.total,
            "instance pool grew"
        );
    }

    fn allocate(&mut self, count: usize) {
        self.free.reserve(count);
        for _ in 0..count {
            self.free.push_back(Box::default());
        }
        self.total += count;
    }
}
