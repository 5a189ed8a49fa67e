//! # Pending registry: not-yet-fired requests ordered by due instant.
//!
//! [`PendingRegistry`] is the plain ordered collection; it never locks.
//! [`PendingQueue`] pairs it with the single lock that guards it and with the
//! wake primitive the scheduler waits on (the condition variable of the
//! classic alarm loop).
//!
//! ## Ordering
//! ```text
//! head ─► [due 10:00:01 #2] [due 10:00:05 #1] [due 10:00:05 #7] [due 10:01:00 #3]
//!          earliest          └── equal due: insertion order ──┘
//! ```
//!
//! ## Rules
//! - Every mutation happens under the `PendingQueue` lock.
//! - The scheduler is woken whenever the head's due instant changes.
//! - A create whose id is already pending replaces the pending entry.

use std::collections::VecDeque;

use tokio::sync::{Mutex, MutexGuard, Notify, futures::Notified};
use tokio::time::Instant;

use crate::alarms::{AlarmId, AlarmRequest};

/// A request together with the order in which the registry admitted it.
#[derive(Debug)]
pub struct Admitted {
    /// Admission number; strictly increasing across inserts.
    pub order: u64,
    pub request: AlarmRequest,
}

/// Requests sorted ascending by due instant, ties in insertion order.
#[derive(Debug, Default)]
pub struct PendingRegistry {
    entries: VecDeque<Admitted>,
    admissions: u64,
}

impl PendingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `req` after every entry due at or before it.
    ///
    /// Returns `true` when `req` is now the head and is strictly earlier than
    /// the previous head (or the registry was empty).
    pub fn insert_sorted(&mut self, req: AlarmRequest) -> bool {
        let previous = self.earliest_deadline();
        let due = req.due();
        let idx = self.entries.partition_point(|e| e.request.due() <= due);
        let order = self.admissions;
        self.admissions += 1;
        self.entries.insert(idx, Admitted { order, request: req });

        match previous {
            None => true,
            Some(prev) => due < prev,
        }
    }

    /// Removes and returns the head iff it is due at `now`.
    pub fn pop_if_due(&mut self, now: Instant) -> Option<Admitted> {
        if self.entries.front()?.request.due() <= now {
            self.entries.pop_front()
        } else {
            None
        }
    }

    /// Due instant of the head, if any.
    #[inline]
    pub fn earliest_deadline(&self) -> Option<Instant> {
        self.entries.front().map(|e| e.request.due())
    }

    /// The head entry, if any.
    #[inline]
    pub fn peek(&self) -> Option<&AlarmRequest> {
        self.entries.front().map(|e| &e.request)
    }

    /// Removes the pending create with `id`; cancels are never matched.
    pub fn remove_by_id(&mut self, id: AlarmId) -> Option<AlarmRequest> {
        self.remove_where(|e| e.request.id() == id && e.request.is_create())
    }

    /// Removes the pending create with `id` admitted before `order`.
    ///
    /// A create admitted after a cancel is a resubmission and outlives it.
    pub fn remove_by_id_before(&mut self, id: AlarmId, order: u64) -> Option<AlarmRequest> {
        self.remove_where(|e| e.order < order && e.request.id() == id && e.request.is_create())
    }

    fn remove_where(&mut self, pred: impl Fn(&Admitted) -> bool) -> Option<AlarmRequest> {
        let idx = self.entries.iter().position(pred)?;
        self.entries.remove(idx).map(|e| e.request)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ordered copy of the pending entries.
    pub fn snapshot(&self) -> Vec<AlarmRequest> {
        self.entries.iter().map(|e| e.request.clone()).collect()
    }
}

/// Result of [`PendingQueue::submit`].
#[derive(Debug)]
pub struct Insertion {
    /// The request became the strictly earliest pending entry.
    pub new_earliest: bool,
    /// Pending create with the same id that was replaced.
    pub replaced: Option<AlarmRequest>,
}

/// The pending registry behind its lock, plus the scheduler's wake signal.
#[derive(Debug, Default)]
pub struct PendingQueue {
    registry: Mutex<PendingRegistry>,
    wake: Notify,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the registry.
    pub async fn lock(&self) -> MutexGuard<'_, PendingRegistry> {
        self.registry.lock().await
    }

    /// Future resolving at the next wake.
    ///
    /// Wakes are stored while nobody waits, so a wake sent between a check and
    /// the wait is never lost.
    pub fn notified(&self) -> Notified<'_> {
        self.wake.notified()
    }

    /// Wakes the scheduler without changing the registry.
    pub fn wake(&self) {
        self.wake.notify_one();
    }

    /// Inserts a request and wakes the scheduler if the head changed.
    pub async fn submit(&self, req: AlarmRequest) -> Insertion {
        let mut registry = self.registry.lock().await;
        let before = registry.earliest_deadline();

        let replaced = if req.is_create() {
            registry.remove_by_id(req.id())
        } else {
            None
        };
        let new_earliest = registry.insert_sorted(req);

        if new_earliest || registry.earliest_deadline() != before {
            self.wake.notify_one();
        }
        Insertion {
            new_earliest,
            replaced,
        }
    }

    /// Ordered copy of the pending entries.
    pub async fn snapshot(&self) -> Vec<AlarmRequest> {
        self.registry.lock().await.snapshot()
    }

    pub async fn len(&self) -> usize {
        self.registry.lock().await.len()
    }
}
