//! # Scheduler: waits for the earliest pending deadline and processes it.
//!
//! One scheduler runs per runtime. Its state is published on a
//! `tokio::sync::watch` channel so callers and tests can observe it.
//!
//! ## State machine
//! ```text
//!            ┌────────── registry empty ──────────┐
//!            ▼                                    │
//!          Idle ── wake ──► re-evaluate ◄─────────┤
//!                               │                 │
//!                     head not due yet            │
//!                               ▼                 │
//!        Waiting{alarm, deadline} ── timeout ──► Processing{alarm}
//!            │    ▲                               │
//!            │    └── wake: same head (spurious)  ├─ create: mark in transit, send
//!            └── wake: earlier head → Preempted   └─ cancel: pending, then active
//!
//!   token cancelled (any state) ──► Stopped
//! ```
//!
//! ## Rules
//! - The head stays in the registry while waited on; only a due head is popped.
//! - A cancel removes the pending create inside the critical section that
//!   popped it; the active list is touched only after that lock is released.
//! - A cancel only matches creates admitted before it; a later resubmission
//!   of the same id survives.
//! - The pending lock is never held across a channel send.
//! - Equal deadlines fire in insertion order.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::alarms::{AlarmId, AlarmRequest};
use crate::clock::Clock;
use crate::core::channel::BoundedChannel;
use crate::core::display::{ActiveDisplay, CancelOutcome};
use crate::core::pending::PendingQueue;
use crate::events::{Bus, Event, EventKind};

/// Observable scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Registry empty; waiting for any insert.
    Idle,
    /// Waiting for `alarm` to become due at `deadline`, or for an earlier insert.
    Waiting { alarm: AlarmId, deadline: Instant },
    /// Handling the due request `alarm`.
    Processing { alarm: AlarmId },
    /// Cancelled; the loop has exited.
    Stopped,
}

/// Outcome of one look at the registry.
enum Step {
    Idle,
    Wait { alarm: AlarmId, deadline: Instant },
    Fire(AlarmRequest),
    Cancel {
        id: AlarmId,
        from_pending: bool,
    },
}

/// The wait/fire loop.
pub struct Scheduler {
    pending: Arc<PendingQueue>,
    active: Arc<ActiveDisplay>,
    channel: Arc<BoundedChannel<AlarmRequest>>,
    bus: Bus,
    state: watch::Sender<SchedulerState>,
}

impl Scheduler {
    pub fn new(
        pending: Arc<PendingQueue>,
        active: Arc<ActiveDisplay>,
        channel: Arc<BoundedChannel<AlarmRequest>>,
        bus: Bus,
    ) -> Self {
        let (state, _) = watch::channel(SchedulerState::Idle);
        Self {
            pending,
            active,
            channel,
            bus,
            state,
        }
    }

    /// Receiver observing the state transitions.
    pub fn state(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }

    /// Runs until `token` is cancelled or the channel closes.
    pub async fn run(self, token: CancellationToken) {
        let mut waiting_on: Option<(AlarmId, Instant)> = None;

        while !token.is_cancelled() {
            match self.next_step().await {
                Step::Idle => {
                    waiting_on = None;
                    self.set_state(SchedulerState::Idle);
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = self.pending.notified() => {}
                    }
                }
                Step::Wait { alarm, deadline } => {
                    match waiting_on {
                        Some((prev, prev_deadline)) if prev != alarm && deadline < prev_deadline => {
                            self.bus.publish(
                                Event::new(EventKind::SchedulerPreempted)
                                    .with_alarm(prev)
                                    .with_delay(
                                        prev_deadline.saturating_duration_since(Clock::now()),
                                    ),
                            );
                        }
                        _ => {}
                    }
                    waiting_on = Some((alarm, deadline));
                    self.set_state(SchedulerState::Waiting { alarm, deadline });
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = tokio::time::sleep_until(deadline) => {}
                        _ = self.pending.notified() => {}
                    }
                }
                Step::Fire(req) => {
                    waiting_on = None;
                    self.set_state(SchedulerState::Processing { alarm: req.id() });
                    if !self.fire(req, &token).await {
                        break;
                    }
                }
                Step::Cancel { id, from_pending } => {
                    waiting_on = None;
                    self.set_state(SchedulerState::Processing { alarm: id });
                    self.cancel(id, from_pending).await;
                }
            }
        }
        self.set_state(SchedulerState::Stopped);
    }

    /// Inspects the registry under its lock; pops the head only if due.
    async fn next_step(&self) -> Step {
        let mut registry = self.pending.lock().await;
        match registry.pop_if_due(Clock::now()) {
            Some(due) if due.request.is_cancel() => {
                let id = due.request.id();
                let from_pending = registry.remove_by_id_before(id, due.order).is_some();
                Step::Cancel { id, from_pending }
            }
            Some(due) => Step::Fire(due.request),
            None => match registry.peek() {
                Some(head) => Step::Wait {
                    alarm: head.id(),
                    deadline: head.due(),
                },
                None => Step::Idle,
            },
        }
    }

    /// Hands a due create to the consumer. `false` when the loop must stop.
    async fn fire(&self, req: AlarmRequest, token: &CancellationToken) -> bool {
        let id = req.id();
        self.active.mark_in_transit(id).await;

        let mut ev = Event::new(EventKind::AlarmFired)
            .with_alarm(id)
            .with_delay(Duration::from_secs(req.delay_secs()));
        if let Some(msg) = req.message() {
            ev = ev.with_message(msg.as_str());
        }
        self.bus.publish(ev);

        tokio::select! {
            _ = token.cancelled() => false,
            sent = self.channel.send(req) => sent.is_ok(),
        }
    }

    /// Removes `id` from the active list and reports where the cancel landed.
    async fn cancel(&self, id: AlarmId, from_pending: bool) {
        let mut places = Vec::with_capacity(2);
        if from_pending {
            places.push("pending");
        }
        match self.active.cancel(id).await {
            CancelOutcome::Removed(_) => places.push("active"),
            CancelOutcome::Deferred => places.push("in_transit"),
            CancelOutcome::NotFound => {}
        }

        let ev = if places.is_empty() {
            Event::new(EventKind::CancelIgnored).with_alarm(id)
        } else {
            Event::new(EventKind::AlarmCancelled)
                .with_alarm(id)
                .with_reason(places.join(","))
        };
        self.bus.publish(ev);
    }

    fn set_state(&self, next: SchedulerState) {
        self.state.send_if_modified(|cur| {
            if *cur == next {
                return false;
            }
            *cur = next;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Harness {
        pending: Arc<PendingQueue>,
        active: Arc<ActiveDisplay>,
        channel: Arc<BoundedChannel<AlarmRequest>>,
        bus: Bus,
        token: CancellationToken,
    }

    impl Harness {
        fn new(capacity: usize) -> Self {
            Self {
                pending: Arc::new(PendingQueue::new()),
                active: Arc::new(ActiveDisplay::new()),
                channel: Arc::new(BoundedChannel::new(capacity)),
                bus: Bus::new(64),
                token: CancellationToken::new(),
            }
        }

        fn spawn(&self) -> (watch::Receiver<SchedulerState>, tokio::task::JoinHandle<()>) {
            let sched = Scheduler::new(
                Arc::clone(&self.pending),
                Arc::clone(&self.active),
                Arc::clone(&self.channel),
                self.bus.clone(),
            );
            let state = sched.state();
            let handle = tokio::spawn(sched.run(self.token.clone()));
            (state, handle)
        }
    }

    async fn wait_for_head(state: &mut watch::Receiver<SchedulerState>, id: u64) {
        state
            .wait_for(|s| matches!(s, SchedulerState::Waiting { alarm, .. } if alarm.0 == id))
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_in_deadline_order() {
        let h = Harness::new(4);
        let (_state, _handle) = h.spawn();
        let start = Clock::now();

        h.pending.submit(AlarmRequest::create(1, 2, "a")).await;
        h.pending.submit(AlarmRequest::create(2, 1, "b")).await;

        let first = h.channel.recv().await.unwrap();
        assert_eq!(first.id(), AlarmId(2));
        assert!(Clock::now() - start >= Duration::from_secs(1));
        let second = h.channel.recv().await.unwrap();
        assert_eq!(second.id(), AlarmId(1));
        assert!(Clock::now() - start >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_earlier_insert_preempts_wait() {
        let h = Harness::new(4);
        let mut events = h.bus.subscribe();
        let (mut state, _handle) = h.spawn();
        let start = Clock::now();

        h.pending.submit(AlarmRequest::create(1, 10, "late")).await;
        wait_for_head(&mut state, 1).await;

        h.pending.submit(AlarmRequest::create(2, 2, "early")).await;
        wait_for_head(&mut state, 2).await;

        let first = h.channel.recv().await.unwrap();
        assert_eq!(first.id(), AlarmId(2));
        let elapsed = Clock::now() - start;
        assert!(elapsed >= Duration::from_secs(2) && elapsed < Duration::from_secs(10));

        let preempted = loop {
            let ev = events.recv().await.unwrap();
            if ev.kind == EventKind::SchedulerPreempted {
                break ev;
            }
        };
        assert_eq!(preempted.alarm, Some(AlarmId(1)));

        let second = h.channel.recv().await.unwrap();
        assert_eq!(second.id(), AlarmId(1));
        assert!(Clock::now() - start >= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_fires_early() {
        let h = Harness::new(1);
        let (mut state, _handle) = h.spawn();

        h.pending.submit(AlarmRequest::create(1, 5, "x")).await;
        wait_for_head(&mut state, 1).await;
        // spurious wake: nothing changed
        h.pending.wake();

        let early = tokio::time::timeout(Duration::from_millis(4_900), h.channel.recv()).await;
        assert!(early.is_err());
        assert_eq!(h.channel.recv().await.unwrap().id(), AlarmId(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_pending_never_fires() {
        let h = Harness::new(4);
        let mut events = h.bus.subscribe();
        let (_state, _handle) = h.spawn();

        h.pending.submit(AlarmRequest::create(1, 5, "hello")).await;
        h.pending.submit(AlarmRequest::cancel(1)).await;

        let ev = loop {
            let ev = events.recv().await.unwrap();
            if ev.kind == EventKind::AlarmCancelled {
                break ev;
            }
        };
        assert_eq!(ev.reason.as_deref(), Some("pending"));
        assert!(h.pending.snapshot().await.is_empty());

        let fired = tokio::time::timeout(Duration::from_secs(10), h.channel.recv()).await;
        assert!(fired.is_err(), "cancelled alarm must never reach the channel");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_unknown_is_ignored() {
        let h = Harness::new(4);
        let mut events = h.bus.subscribe();
        let (_state, _handle) = h.spawn();

        h.pending.submit(AlarmRequest::create(2, 30, "keep")).await;
        h.pending.submit(AlarmRequest::cancel(99)).await;

        let ev = loop {
            let ev = events.recv().await.unwrap();
            if ev.kind == EventKind::CancelIgnored {
                break ev;
            }
        };
        assert_eq!(ev.alarm, Some(AlarmId(99)));
        assert_eq!(h.pending.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_in_transit_is_deferred() {
        // capacity 1 and nobody receiving: the second create stays in transit
        let h = Harness::new(1);
        let mut events = h.bus.subscribe();
        let (mut state, _handle) = h.spawn();

        h.pending.submit(AlarmRequest::create(1, 0, "fills")).await;
        h.pending.submit(AlarmRequest::create(2, 0, "blocked")).await;
        state
            .wait_for(|s| *s == SchedulerState::Processing { alarm: AlarmId(2) })
            .await
            .unwrap();
        h.pending.submit(AlarmRequest::cancel(2)).await;

        // the cancel is processed after the blocked send completes
        let first = h.channel.recv().await.unwrap();
        assert_eq!(first.id(), AlarmId(1));
        let ev = loop {
            let ev = events.recv().await.unwrap();
            if ev.kind == EventKind::AlarmCancelled {
                break ev;
            }
        };
        assert_eq!(ev.reason.as_deref(), Some("in_transit"));
        let second = h.channel.recv().await.unwrap();
        assert_eq!(
            h.active.materialize(second).await,
            crate::core::display::Materialized::Dropped
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_spares_create_submitted_after_it() {
        // capacity 1 and nobody receiving: the scheduler blocks on 11
        let h = Harness::new(1);
        let mut events = h.bus.subscribe();
        let (mut state, _handle) = h.spawn();

        h.pending.submit(AlarmRequest::create(10, 0, "fills")).await;
        h.pending.submit(AlarmRequest::create(11, 0, "blocked")).await;
        state
            .wait_for(|s| *s == SchedulerState::Processing { alarm: AlarmId(11) })
            .await
            .unwrap();

        h.pending.submit(AlarmRequest::cancel(1)).await;
        tokio::time::advance(Duration::from_millis(10)).await;
        h.pending
            .submit(AlarmRequest::create(1, 2, "submitted after cancel"))
            .await;

        let mut received = Vec::new();
        while received.len() < 3 {
            match tokio::time::timeout(Duration::from_secs(10), h.channel.recv()).await {
                Ok(Ok(req)) => received.push(req.id().0),
                _ => break,
            }
        }
        assert_eq!(received, vec![10, 11, 1]);
        assert!(h.pending.snapshot().await.is_empty());

        let ev = loop {
            let ev = events.recv().await.unwrap();
            if ev.alarm == Some(AlarmId(1))
                && matches!(ev.kind, EventKind::CancelIgnored | EventKind::AlarmCancelled)
            {
                break ev;
            }
        };
        assert_eq!(ev.kind, EventKind::CancelIgnored);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_on_cancel() {
        let h = Harness::new(1);
        let (mut state, handle) = h.spawn();
        state.wait_for(|s| *s == SchedulerState::Idle).await.unwrap();

        h.token.cancel();
        handle.await.unwrap();
        assert_eq!(*state.borrow(), SchedulerState::Stopped);
    }
}
