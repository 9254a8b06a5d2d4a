//! Worker budget shared by every traversal of a run
//!
//! A counting semaphore sized to the concurrency ceiling. A traversal
//! holds one permit while it lists and stats; dropping the permit
//! returns the slot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

/// A held worker slot, released on drop
#[derive(Debug)]
pub struct WorkerPermit {
    _permit: OwnedSemaphorePermit,
}

/// Statistics for the worker budget
#[derive(Debug, Default)]
pub struct BudgetStats {
    /// Subdirectories handed to a new task
    pub spawned: AtomicU64,

    /// Subdirectories traversed inline because the budget was exhausted
    pub inline: AtomicU64,

    /// Acquisitions that had to wait for a slot
    pub waited: AtomicU64,
}

impl BudgetStats {
    pub fn record_spawn(&self) {
        self.spawned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_inline(&self) {
        self.inline.fetch_add(1, Ordering::Relaxed);
    }

    pub fn spawned_count(&self) -> u64 {
        self.spawned.load(Ordering::Relaxed)
    }

    pub fn inline_count(&self) -> u64 {
        self.inline.load(Ordering::Relaxed)
    }

    pub fn wait_count(&self) -> u64 {
        self.waited.load(Ordering::Relaxed)
    }
}

/// Counting budget limiting concurrent traversals
#[derive(Debug)]
pub struct WorkerBudget {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    stats: BudgetStats,
}

impl WorkerBudget {
    /// Create a budget with `capacity` slots, at least one
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            stats: BudgetStats::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently free
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn stats(&self) -> &BudgetStats {
        &self.stats
    }

    /// Take a slot if one is free, without waiting
    pub fn try_acquire(&self) -> Option<WorkerPermit> {
        Arc::clone(&self.semaphore)
            .try_acquire_owned()
            .ok()
            .map(|permit| WorkerPermit { _permit: permit })
    }

    /// Wait for a slot
    ///
    /// Returns `None` if `cancel` fires first.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Option<WorkerPermit> {
        if let Some(permit) = self.try_acquire() {
            return Some(permit);
        }

        self.stats.waited.fetch_add(1, Ordering::Relaxed);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            permit = Arc::clone(&self.semaphore).acquire_owned() => {
                // The semaphore is never closed
                permit.ok().map(|permit| WorkerPermit { _permit: permit })
            }
        }
    }
}
