//! # AlarmRuntime: owns the shared state, the workers and graceful shutdown.
//!
//! The [`AlarmRuntime`] owns the event bus, a [`SubscriberSet`], the pending
//! queue, the hand-off channel and the active display list. It spawns the
//! three pipeline workers, accepts requests, and stops everything within
//! [`Config::grace`].
//!
//! ## High-level architecture
//! ```text
//! Intake:
//!   submit_line(&str) ─► Command::from_str ─► submit(AlarmRequest)
//!                             └─ Err ─► Bus.publish(AlarmRejected)
//!   submit(req) ─► PendingQueue::submit ─► Bus.publish(Accepted | Rescheduled | CancelAccepted)
//!
//! Workers (JoinSet<WorkerExit>, child tokens of runtime_token):
//!   "scheduler"  Scheduler::run        PendingQueue ─► BoundedChannel
//!   "consumer"   DisplayConsumer::run  BoundedChannel ─► ActiveDisplay
//!   "presenter"  PeriodicPresenter::run ActiveDisplay ─► Render
//!
//! Event flow:
//!   workers ── publish(Event) ──► Bus ──► subscriber_listener ──► SubscriberSet::emit
//!
//! Shutdown path:
//!   shutdown()
//!       └─► Bus.publish(ShutdownRequested)
//!       └─► runtime_token.cancel(), channel.close()
//!       └─► wait_all_with_grace(cfg.grace):
//!              ├─ all joined   → Bus.publish(AllStoppedWithin)
//!              └─ timeout      → Bus.publish(GraceExceeded)
//!                                (AliveTracker.snapshot() names stuck workers)
//!
//! Worker panic:
//!   catch_unwind ─► runtime_token.cancel() ─► Bus.publish(WorkerDead)
//!                ─► RuntimeError::WorkerPanicked from run_until / shutdown
//! ```
//!
//! ## Example
//! ```no_run
//! use alarmvisor::{AlarmRuntime, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let rt = AlarmRuntime::builder(Config::default()).build();
//!     rt.start().await?;
//!
//!     rt.submit_line("2 Message(1) tea is ready").await?;
//!     tokio::time::sleep(std::time::Duration::from_secs(3)).await;
//!     assert_eq!(rt.active_snapshot().await.len(), 1);
//!
//!     rt.shutdown().await?;
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::{Mutex, watch};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::alarms::{AlarmId, AlarmKind, AlarmRequest, Command};
use crate::core::{
    alive::AliveTracker,
    builder::RuntimeBuilder,
    channel::BoundedChannel,
    config::Config,
    consumer::DisplayConsumer,
    display::ActiveDisplay,
    pending::PendingQueue,
    presenter::PeriodicPresenter,
    scheduler::{Scheduler, SchedulerState},
};
use crate::error::{RuntimeError, SubmitError};
use crate::events::{Bus, Event, EventKind};
use crate::render::Render;
use crate::subscribers::{SubscriberSet, panic_info};

/// How a worker future ended.
struct WorkerExit {
    name: &'static str,
    panic: Option<String>,
}

/// Coordinates the alarm pipeline, event delivery and graceful shutdown.
pub struct AlarmRuntime {
    cfg: Config,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    pending: Arc<PendingQueue>,
    active: Arc<ActiveDisplay>,
    channel: Arc<BoundedChannel<AlarmRequest>>,
    render: Arc<dyn Render>,
    alive: Arc<AliveTracker>,
    runtime_token: CancellationToken,
    state: watch::Receiver<SchedulerState>,
    scheduler: Mutex<Option<Scheduler>>,
    workers: Mutex<JoinSet<WorkerExit>>,
    closed: AtomicBool,
}

impl AlarmRuntime {
    /// Starts building a runtime with the given configuration.
    pub fn builder(cfg: Config) -> RuntimeBuilder {
        RuntimeBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        bus: Bus,
        subs: Arc<SubscriberSet>,
        render: Arc<dyn Render>,
    ) -> Self {
        let pending = Arc::new(PendingQueue::new());
        let active = Arc::new(ActiveDisplay::new());
        let channel = Arc::new(BoundedChannel::new(cfg.channel_capacity_clamped()));
        let scheduler = Scheduler::new(
            Arc::clone(&pending),
            Arc::clone(&active),
            Arc::clone(&channel),
            bus.clone(),
        );
        let state = scheduler.state();

        Self {
            cfg,
            bus,
            subs,
            pending,
            active,
            channel,
            render,
            alive: Arc::new(AliveTracker::new()),
            runtime_token: CancellationToken::new(),
            state,
            scheduler: Mutex::new(Some(scheduler)),
            workers: Mutex::new(JoinSet::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Spawns the scheduler, consumer and presenter.
    ///
    /// Returns [`RuntimeError::AlreadyStarted`] on a second call.
    pub async fn start(&self) -> Result<(), RuntimeError> {
        let scheduler = self
            .scheduler
            .lock()
            .await
            .take()
            .ok_or(RuntimeError::AlreadyStarted)?;

        let consumer = DisplayConsumer::new(
            Arc::clone(&self.channel),
            Arc::clone(&self.active),
            self.bus.clone(),
        );
        let presenter = PeriodicPresenter::new(
            Arc::clone(&self.active),
            Arc::clone(&self.render),
            self.bus.clone(),
            self.cfg.display_interval_clamped(),
        );

        let mut set = self.workers.lock().await;
        let token = &self.runtime_token;
        self.spawn_worker(&mut set, "scheduler", scheduler.run(token.child_token()))
            .await;
        self.spawn_worker(&mut set, "consumer", consumer.run(token.child_token()))
            .await;
        self.spawn_worker(&mut set, "presenter", presenter.run(token.child_token()))
            .await;
        Ok(())
    }

    /// Queues a create or cancel.
    ///
    /// Fails with [`SubmitError::Closed`] once shutdown has begun.
    pub async fn submit(&self, req: AlarmRequest) -> Result<(), SubmitError> {
        if self.is_closed() {
            return Err(SubmitError::Closed);
        }
        let id = req.id();
        let accepted = match req.kind() {
            AlarmKind::Create {
                delay_secs,
                message,
                ..
            } => Some((Duration::from_secs(*delay_secs), message.to_string())),
            AlarmKind::Cancel => None,
        };

        let insertion = self.pending.submit(req).await;

        let ev = match accepted {
            Some((delay, message)) => {
                let kind = if insertion.replaced.is_some() {
                    EventKind::AlarmRescheduled
                } else {
                    EventKind::AlarmAccepted
                };
                Event::new(kind).with_delay(delay).with_message(message)
            }
            None => Event::new(EventKind::CancelAccepted),
        };
        self.bus.publish(ev.with_alarm(id));
        Ok(())
    }

    /// Parses one intake line and submits it.
    ///
    /// A malformed line is published as [`EventKind::AlarmRejected`] and
    /// changes nothing.
    pub async fn submit_line(&self, line: &str) -> Result<AlarmId, SubmitError> {
        let cmd = match line.parse::<Command>() {
            Ok(cmd) => cmd,
            Err(err) => {
                self.bus.publish(
                    Event::new(EventKind::AlarmRejected)
                        .with_reason(format!("{}: {err}", err.as_label())),
                );
                return Err(err.into());
            }
        };
        let id = cmd.id();
        self.submit(cmd.into_request()).await?;
        Ok(id)
    }

    /// New receiver on the event bus.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Pending requests in due order.
    pub async fn pending_snapshot(&self) -> Vec<AlarmRequest> {
        self.pending.snapshot().await
    }

    /// Live alarms in ascending id order.
    pub async fn active_snapshot(&self) -> Vec<AlarmRequest> {
        self.active.snapshot().await
    }

    /// Observer of the scheduler state.
    pub fn scheduler_state(&self) -> watch::Receiver<SchedulerState> {
        self.state.clone()
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// True once shutdown has begun.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Token cancelled when the runtime stops (shutdown or worker panic).
    pub fn cancellation_token(&self) -> CancellationToken {
        self.runtime_token.clone()
    }

    /// Starts the workers and runs until `stop` resolves, the runtime is
    /// cancelled, or a worker panics; then shuts down gracefully.
    pub async fn run_until<F>(&self, stop: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = ()>,
    {
        self.start().await?;

        let failure = tokio::select! {
            _ = stop => None,
            _ = self.runtime_token.cancelled() => None,
            failure = self.watch_workers() => failure,
        };
        let stopped = self.shutdown().await;
        match failure {
            Some(err) => Err(err),
            None => stopped,
        }
    }

    /// Stops intake, cancels the workers and waits for them within the grace
    /// period.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.bus.publish(Event::new(EventKind::ShutdownRequested));
        }
        self.runtime_token.cancel();
        self.channel.close();
        self.wait_all_with_grace().await
    }

    /// Subscribes to the bus and forwards events to the subscriber set (fire-and-forget).
    pub(crate) fn subscriber_listener(&self) {
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.subs);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    /// Spawns `fut` as a named worker whose panic cancels the runtime.
    async fn spawn_worker<F>(&self, set: &mut JoinSet<WorkerExit>, name: &'static str, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.alive.started(name).await;
        let alive = Arc::clone(&self.alive);
        let runtime_token = self.runtime_token.clone();

        set.spawn(async move {
            let panic = AssertUnwindSafe(fut)
                .catch_unwind()
                .await
                .err()
                .map(|payload| panic_info(payload.as_ref()));
            if panic.is_some() {
                runtime_token.cancel();
            }
            alive.stopped(name).await;
            WorkerExit { name, panic }
        });
    }

    /// Resolves with the first worker panic, or `None` once every worker ended.
    async fn watch_workers(&self) -> Option<RuntimeError> {
        let mut set = self.workers.lock().await;
        while let Some(joined) = set.join_next().await {
            if let Some(err) = self.on_worker_exit(joined) {
                return Some(err);
            }
        }
        None
    }

    /// Waits for all workers within the configured grace period.
    ///
    /// Publishes [`EventKind::AllStoppedWithin`] on success, or
    /// [`EventKind::GraceExceeded`] on timeout and returns
    /// [`RuntimeError::GraceExceeded`] with the stuck workers.
    async fn wait_all_with_grace(&self) -> Result<(), RuntimeError> {
        let grace = self.cfg.grace;
        let mut set = self.workers.lock().await;

        let mut failure = None;
        let done = async {
            while let Some(joined) = set.join_next().await {
                if let Some(err) = self.on_worker_exit(joined) {
                    failure.get_or_insert(err);
                }
            }
        };
        let timed = tokio::time::timeout(grace, done).await;

        match timed {
            Ok(()) => {
                self.bus.publish(Event::new(EventKind::AllStoppedWithin));
                failure.map_or(Ok(()), Err)
            }
            Err(_) => {
                self.bus.publish(Event::new(EventKind::GraceExceeded));
                let stuck = self.alive.snapshot().await;
                set.abort_all();
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        }
    }

    fn on_worker_exit(&self, joined: Result<WorkerExit, JoinError>) -> Option<RuntimeError> {
        let exit = match joined {
            Ok(exit) => exit,
            Err(err) if err.is_cancelled() => return None,
            Err(err) => WorkerExit {
                name: "unknown",
                panic: Some(err.to_string()),
            },
        };
        let info = exit.panic?;
        self.bus.publish(
            Event::new(EventKind::WorkerDead)
                .with_worker(exit.name)
                .with_reason(info.clone()),
        );
        Some(RuntimeError::WorkerPanicked {
            worker: exit.name.to_string(),
            info,
        })
    }
}
