//! # Active display list: fired alarms that are still live.
//!
//! [`ActiveDisplayList`] holds creates keyed and ordered by id. Besides the
//! live entries it remembers which ids are *in transit* (popped by the
//! scheduler, not yet received by the consumer) so a cancel arriving in that
//! window is not lost:
//!
//! ```text
//! scheduler: mark_in_transit(7) ──► channel ──► consumer: materialize(#7)
//!                       ▲                                   │
//! cancel(7) ────────────┘ Deferred (tombstone)              └─► Dropped
//! ```
//!
//! [`ActiveDisplay`] puts the list behind its single lock. Callers copy out
//! with [`snapshot_for_display`](ActiveDisplayList::snapshot_for_display) and
//! render without holding it.

use std::collections::{BTreeMap, HashMap};

use tokio::sync::{Mutex, MutexGuard};

use crate::alarms::{AlarmId, AlarmRequest};

/// Where a cancel took effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The live entry was removed.
    Removed(AlarmRequest),
    /// The create is in transit; it will be dropped on arrival.
    Deferred,
    /// Nothing with that id is live or in transit.
    NotFound,
}

/// What happened to a create handed over by the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Materialized {
    /// New live entry.
    Inserted,
    /// Replaced the live entry with the same id.
    Replaced(AlarmRequest),
    /// A cancel arrived while in transit; the create is discarded.
    Dropped,
}

/// Live creates sorted by id, plus in-transit bookkeeping.
///
/// The channel is FIFO, so the copies in transit when a cancel lands are
/// exactly the next ones to arrive for that id; counting them is enough.
#[derive(Debug, Default)]
pub struct ActiveDisplayList {
    entries: BTreeMap<AlarmId, AlarmRequest>,
    in_transit: HashMap<AlarmId, usize>,
    cancelled_in_transit: HashMap<AlarmId, usize>,
}

impl ActiveDisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `req` in id order; returns the entry it replaced.
    pub fn upsert(&mut self, req: AlarmRequest) -> Option<AlarmRequest> {
        self.entries.insert(req.id(), req)
    }

    /// Removes the live entry with `id`. Absence is not an error.
    pub fn remove_by_id(&mut self, id: AlarmId) -> Option<AlarmRequest> {
        self.entries.remove(&id)
    }

    /// Ascending-id copy of the live entries.
    pub fn snapshot_for_display(&self) -> Vec<AlarmRequest> {
        self.entries.values().cloned().collect()
    }

    /// Records that a create for `id` has left the pending registry.
    pub fn mark_in_transit(&mut self, id: AlarmId) {
        *self.in_transit.entry(id).or_default() += 1;
    }

    /// Cancels `id` wherever it lives in this list.
    ///
    /// Copies still in transit are tombstoned even when a live entry was
    /// removed as well.
    pub fn cancel(&mut self, id: AlarmId) -> CancelOutcome {
        let travelling = self.in_transit.get(&id).copied().unwrap_or(0);
        if travelling > 0 {
            self.cancelled_in_transit.insert(id, travelling);
        }
        match self.entries.remove(&id) {
            Some(removed) => CancelOutcome::Removed(removed),
            None if travelling > 0 => CancelOutcome::Deferred,
            None => CancelOutcome::NotFound,
        }
    }

    /// Accepts a create received from the channel.
    pub fn materialize(&mut self, req: AlarmRequest) -> Materialized {
        let id = req.id();
        decrement(&mut self.in_transit, id);
        if decrement(&mut self.cancelled_in_transit, id) {
            return Materialized::Dropped;
        }
        match self.upsert(req) {
            Some(prev) => Materialized::Replaced(prev),
            None => Materialized::Inserted,
        }
    }

    #[inline]
    pub fn contains(&self, id: AlarmId) -> bool {
        self.entries.contains_key(&id)
    }

    #[inline]
    pub fn is_in_transit(&self, id: AlarmId) -> bool {
        self.in_transit.contains_key(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Decrements a per-id counter, dropping it at zero. `false` if absent.
fn decrement(counts: &mut HashMap<AlarmId, usize>, id: AlarmId) -> bool {
    let Some(n) = counts.get_mut(&id) else {
        return false;
    };
    *n -= 1;
    if *n == 0 {
        counts.remove(&id);
    }
    true
}

/// The active display list behind its lock.
#[derive(Debug, Default)]
pub struct ActiveDisplay {
    list: Mutex<ActiveDisplayList>,
}

impl ActiveDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self) -> MutexGuard<'_, ActiveDisplayList> {
        self.list.lock().await
    }

    pub async fn mark_in_transit(&self, id: AlarmId) {
        self.list.lock().await.mark_in_transit(id);
    }

    pub async fn cancel(&self, id: AlarmId) -> CancelOutcome {
        self.list.lock().await.cancel(id)
    }

    pub async fn materialize(&self, req: AlarmRequest) -> Materialized {
        self.list.lock().await.materialize(req)
    }

    /// Consistent copy for rendering; the lock is released on return.
    pub async fn snapshot(&self) -> Vec<AlarmRequest> {
        self.list.lock().await.snapshot_for_display()
    }
}
